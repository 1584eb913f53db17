use lambda_http::{http::StatusCode, Body, Error, Response};
use thiserror::Error as ThisError;

/// Service error taxonomy. Each variant maps 1:1 to an HTTP status code.
#[derive(Debug, ThisError)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("missing or invalid credentials")]
    Unauthorized,

    /// Valid caller, but the task belongs to another user
    #[error("task belongs to another user")]
    Forbidden,

    /// No task with the requested id
    #[error("task not found")]
    NotFound,

    /// Rejected input (empty description, malformed date, unparseable body)
    #[error("{0}")]
    Validation(String),

    /// Storage failure; the detail never reaches the client
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code used in the response body
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::Forbidden => "Forbidden",
            ApiError::NotFound => "NotFound",
            ApiError::Validation(_) => "ValidationError",
            ApiError::Storage(_) => "InternalError",
        }
    }

    /// Render the error as its HTTP response
    pub fn to_response(&self) -> Result<Response<Body>, Error> {
        let message = match self {
            ApiError::Storage(detail) => {
                tracing::error!("storage failure: {}", detail);
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": self.code(),
            "message": message,
        });

        Ok(Response::builder()
            .status(self.status())
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(body.to_string().into())
            .map_err(Box::new)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_one_to_one() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Validation("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_detail_does_not_leak() {
        let resp = ApiError::Storage("connection refused at 10.0.0.7".to_string())
            .to_response()
            .unwrap();
        let body = match resp.body() {
            Body::Text(text) => text.clone(),
            _ => panic!("expected text body"),
        };
        assert!(!body.contains("10.0.0.7"));
        assert!(body.contains("InternalError"));
    }
}
