use astra::{Body, Response, ResponseBuilder};

use crate::errors::ServerError;

/// Convert a ServerError into a JSON error response. Store failures
/// are logged in full but reach the client as a generic 500.
pub fn error_to_response(err: ServerError) -> Response {
    let (status, message) = match &err {
        ServerError::NotFound => (404, "not found".to_string()),
        ServerError::BadRequest(msg) => (400, msg.clone()),
        ServerError::Unauthorized(msg) => (401, msg.clone()),
        ServerError::InvalidRange(msg) => (422, msg.clone()),
        ServerError::DbError(_) => (500, "storage error".to_string()),
        ServerError::InternalError => (500, "internal server error".to_string()),
    };

    if status >= 500 {
        tracing::error!(error = %err, "request failed");
    }

    let body = serde_json::json!({ "error": message }).to_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(body))
        .unwrap()
}
