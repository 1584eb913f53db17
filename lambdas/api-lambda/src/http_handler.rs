use std::sync::Arc;

use lambda_http::http::header::{HeaderValue, VARY};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use tasknest_atoms::tasks;
use tasknest_shared::{auth, AppState};

fn with_cors_headers(mut resp: Response<Body>) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(resp: Result<Response<Body>, Error>) -> Result<Response<Body>, Error> {
    resp.map(with_cors_headers)
}

/// Main Lambda handler - authenticates the caller and routes task requests
pub async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();
    tracing::info!("API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp));
    }

    // Task routes: identity is resolved before any business logic
    if path == "/tasks" || path.starts_with("/tasks/") {
        let owner_id = match auth::authenticate_request(state.identity.as_ref(), &event).await {
            Ok(owner_id) => owner_id,
            Err(err) => return finalize_response(err.to_response()),
        };

        let store = state.store.as_ref();
        let body = event.body();
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (&method, parts.as_slice()) {
            // GET /tasks - list all tasks for the caller
            (&Method::GET, ["tasks"]) => tasks::list_tasks_handler(store, &owner_id).await,
            // POST /tasks - create task
            (&Method::POST, ["tasks"]) => {
                tasks::create_task_handler(store, &owner_id, body).await
            }
            // GET /tasks/{id} - get specific task
            (&Method::GET, ["tasks", task_id]) => {
                tasks::get_task_handler(store, &owner_id, task_id).await
            }
            // PUT /tasks/{id} - update description and/or due date
            (&Method::PUT, ["tasks", task_id]) => {
                tasks::update_task_handler(store, &owner_id, task_id, body).await
            }
            // DELETE /tasks/{id} - delete task
            (&Method::DELETE, ["tasks", task_id]) => {
                tasks::delete_task_handler(store, &owner_id, task_id).await
            }
            (_, ["tasks"]) | (_, ["tasks", _]) => method_not_allowed(),
            _ => not_found(),
        };

        return finalize_response(resp);
    }

    // No matching route
    tracing::warn!("No route matched - Method: {} Path: {}", method, path);
    finalize_response(not_found())
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"error": "Method not allowed"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}
