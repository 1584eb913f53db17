use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use lambda_http::Request;

use tasknest_atoms::error::ApiError;

/// External identity contract: resolve a bearer token to an owner id.
/// Token issuance lives with the identity provider, not here.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_identity(&self, token: &str) -> Result<String, ApiError>;
}

/// Cognito-backed resolver: exchanges the access token for the user's
/// `sub` attribute via GetUser
pub struct CognitoIdentityResolver {
    client: CognitoClient,
}

impl CognitoIdentityResolver {
    pub fn new(client: CognitoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityResolver for CognitoIdentityResolver {
    async fn resolve_identity(&self, token: &str) -> Result<String, ApiError> {
        let result = self
            .client
            .get_user()
            .access_token(token)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!("Cognito rejected access token: {}", err);
                ApiError::Unauthorized
            })?;

        result
            .user_attributes()
            .iter()
            .find(|attr| attr.name() == "sub")
            .and_then(|attr| attr.value())
            .map(|sub| sub.to_string())
            .ok_or(ApiError::Unauthorized)
    }
}

/// Raw token from the Authorization header; a `Bearer ` prefix is tolerated
pub fn bearer_token(event: &Request) -> Option<&str> {
    let value = event.headers().get("Authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authenticate a request: extract the bearer token and resolve it to an
/// owner id before any business logic runs
pub async fn authenticate_request(
    resolver: &dyn IdentityResolver,
    event: &Request,
) -> Result<String, ApiError> {
    let token = bearer_token(event).ok_or(ApiError::Unauthorized)?;
    resolver.resolve_identity(token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::Body;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = lambda_http::http::Request::builder()
            .method("GET")
            .uri("/tasks");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::Empty).unwrap()
    }

    #[test]
    fn missing_header_yields_no_token() {
        assert_eq!(bearer_token(&request_with_auth(None)), None);
    }

    #[test]
    fn raw_token_is_accepted() {
        let req = request_with_auth(Some("tok-123"));
        assert_eq!(bearer_token(&req), Some("tok-123"));
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        let req = request_with_auth(Some("Bearer tok-123"));
        assert_eq!(bearer_token(&req), Some("tok-123"));
    }

    #[test]
    fn blank_header_yields_no_token() {
        let req = request_with_auth(Some("Bearer   "));
        assert_eq!(bearer_token(&req), None);
    }
}
