use std::sync::Arc;

use lambda_http::{run, service_fn, Error};
use tasknest_api_lambda::http_handler::function_handler;
use tasknest_shared::AppState;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .json()
        .init();

    let state = Arc::new(AppState::from_env().await);

    run(service_fn(move |event| {
        let state = state.clone();
        async move { function_handler(event, state).await }
    }))
    .await
}
