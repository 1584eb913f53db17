pub mod auth;
pub mod types;

use std::env;
use std::sync::Arc;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;

use auth::{CognitoIdentityResolver, IdentityResolver};
use tasknest_atoms::tasks::store::{DynamoTaskStore, TaskStore};

/// Shared clients handed to every request handler
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, identity: Arc<dyn IdentityResolver>) -> Self {
        Self { store, identity }
    }

    /// Production wiring: DynamoDB store and Cognito resolver from the
    /// Lambda environment
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        let dynamo_client = DynamoClient::new(&config);
        let cognito_client = CognitoClient::new(&config);
        let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "tasknest".to_string());

        Self::new(
            Arc::new(DynamoTaskStore::new(dynamo_client, table_name)),
            Arc::new(CognitoIdentityResolver::new(cognito_client)),
        )
    }
}
