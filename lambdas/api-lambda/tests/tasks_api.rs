use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lambda_http::{http::StatusCode, Body, Request, Response};
use tasknest_api_lambda::http_handler::function_handler;
use tasknest_atoms::error::ApiError;
use tasknest_atoms::tasks::{MemoryTaskStore, TaskStore};
use tasknest_shared::auth::IdentityResolver;
use tasknest_shared::AppState;

/// Fixed token table standing in for the external identity provider
struct FixedTokenResolver {
    tokens: HashMap<String, String>,
}

impl FixedTokenResolver {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            tokens: pairs
                .iter()
                .map(|(token, user)| (token.to_string(), user.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityResolver for FixedTokenResolver {
    async fn resolve_identity(&self, token: &str) -> Result<String, ApiError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

fn test_state() -> (Arc<AppState>, Arc<MemoryTaskStore>) {
    let store = Arc::new(MemoryTaskStore::new());
    let resolver = FixedTokenResolver::new(&[("alice-token", "alice"), ("bob-token", "bob")]);
    let state = AppState::new(store.clone(), Arc::new(resolver));
    (Arc::new(state), store)
}

fn request(method: &str, path: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request {
    let mut builder = lambda_http::http::Request::builder()
        .method(method)
        .uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    let body = match body {
        Some(value) => Body::Text(value.to_string()),
        None => Body::Empty,
    };
    builder.body(body).unwrap()
}

fn json_body(resp: &Response<Body>) -> serde_json::Value {
    match resp.body() {
        Body::Text(text) => serde_json::from_str(text).unwrap(),
        Body::Binary(bytes) => serde_json::from_slice(bytes).unwrap(),
        Body::Empty => panic!("expected a response body"),
    }
}

#[tokio::test]
async fn preflight_answers_ok_with_cors_headers() {
    let (state, _) = test_state();
    let resp = function_handler(request("OPTIONS", "/tasks", None, None), state)
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("Access-Control-Allow-Origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn missing_token_is_unauthorized_and_store_untouched() {
    let (state, store) = test_state();
    let body = serde_json::json!({"description": "should not land"});
    let resp = function_handler(request("POST", "/tasks", None, Some(body)), state)
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&resp)["error"], "Unauthorized");
    assert!(store.list_for_owner("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let (state, _) = test_state();
    let resp = function_handler(request("GET", "/tasks", Some("stale-token"), None), state)
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_for_fresh_user_is_empty_array() {
    let (state, _) = test_state();
    let resp = function_handler(request("GET", "/tasks", Some("alice-token"), None), state)
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(&resp)["tasks"], serde_json::json!([]));
}

#[tokio::test]
async fn task_lifecycle_create_update_delete() {
    let (state, _) = test_state();

    // Create without a due date
    let resp = function_handler(
        request(
            "POST",
            "/tasks",
            Some("alice-token"),
            Some(serde_json::json!({"description": "Buy milk"})),
        ),
        state.clone(),
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(&resp);
    assert_eq!(created["description"], "Buy milk");
    assert!(created["dueDate"].is_null());
    let id = created["id"].as_str().unwrap().to_string();

    // Set a due date; description must survive untouched
    let resp = function_handler(
        request(
            "PUT",
            &format!("/tasks/{}", id),
            Some("alice-token"),
            Some(serde_json::json!({"dueDate": "2025-01-01T09:00:00Z"})),
        ),
        state.clone(),
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(&resp);
    assert_eq!(updated["description"], "Buy milk");
    assert_eq!(updated["dueDate"], "2025-01-01T09:00:00Z");

    // Delete, then the task is gone for good
    let resp = function_handler(
        request("DELETE", &format!("/tasks/{}", id), Some("alice-token"), None),
        state.clone(),
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = function_handler(
        request("GET", &format!("/tasks/{}", id), Some("alice-token"), None),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn due_date_round_trips_through_create_and_get() {
    let (state, _) = test_state();

    let resp = function_handler(
        request(
            "POST",
            "/tasks",
            Some("alice-token"),
            Some(serde_json::json!({
                "description": "Dentist",
                "dueDate": "2025-03-01T10:00:00Z"
            })),
        ),
        state.clone(),
    )
    .await
    .unwrap();
    let id = json_body(&resp)["id"].as_str().unwrap().to_string();

    let resp = function_handler(
        request("GET", &format!("/tasks/{}", id), Some("alice-token"), None),
        state,
    )
    .await
    .unwrap();
    assert_eq!(json_body(&resp)["dueDate"], "2025-03-01T10:00:00Z");
}

#[tokio::test]
async fn cross_user_access_is_forbidden() {
    let (state, _) = test_state();

    let resp = function_handler(
        request(
            "POST",
            "/tasks",
            Some("alice-token"),
            Some(serde_json::json!({"description": "private"})),
        ),
        state.clone(),
    )
    .await
    .unwrap();
    let id = json_body(&resp)["id"].as_str().unwrap().to_string();

    for (method, body) in [
        ("GET", None),
        ("PUT", Some(serde_json::json!({"description": "stolen"}))),
        ("DELETE", None),
    ] {
        let resp = function_handler(
            request(method, &format!("/tasks/{}", id), Some("bob-token"), body),
            state.clone(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "method {}", method);
        assert_eq!(json_body(&resp)["error"], "Forbidden");
    }

    // Owner still sees the untouched task
    let resp = function_handler(
        request("GET", &format!("/tasks/{}", id), Some("alice-token"), None),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(&resp)["description"], "private");
}

#[tokio::test]
async fn empty_description_is_a_validation_error() {
    let (state, store) = test_state();

    let resp = function_handler(
        request(
            "POST",
            "/tasks",
            Some("alice-token"),
            Some(serde_json::json!({"description": "  "})),
        ),
        state,
    )
    .await
    .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&resp)["error"], "ValidationError");
    assert!(store.list_for_owner("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_due_date_is_a_validation_error() {
    let (state, _) = test_state();

    let resp = function_handler(
        request(
            "POST",
            "/tasks",
            Some("alice-token"),
            Some(serde_json::json!({"description": "x", "dueDate": "tomorrow"})),
        ),
        state,
    )
    .await
    .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&resp)["error"], "ValidationError");
}

#[tokio::test]
async fn missing_task_is_not_found() {
    let (state, _) = test_state();
    let resp = function_handler(
        request("GET", "/tasks/no-such-id", Some("alice-token"), None),
        state,
    )
    .await
    .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(&resp)["error"], "NotFound");
}

#[tokio::test]
async fn unknown_route_and_method_fall_through() {
    let (state, _) = test_state();

    let resp = function_handler(request("GET", "/profile", Some("alice-token"), None), state.clone())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = function_handler(
        request("PATCH", "/tasks/some-id", Some("alice-token"), None),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
