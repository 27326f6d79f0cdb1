use axum::body::Body;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    SessionNotFound,
    SessionExpired,
    MissingSignature,
    BadSignature,
    TooManyRequests,
    Internal,
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::SessionNotFound =>
                (StatusCode::NOT_FOUND, "Game session not found".to_string()),
            ApiError::SessionExpired =>
                (StatusCode::GONE, "Game session has expired".to_string()),
            ApiError::MissingSignature =>
                (StatusCode::UNAUTHORIZED, "Missing session signature".to_string()),
            ApiError::BadSignature =>
                (StatusCode::FORBIDDEN, "Invalid session signature".to_string()),
            ApiError::TooManyRequests =>
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests, please try again later".to_string()),
            ApiError::Internal =>
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json!({
                "error": message
            })).unwrap()))
            .unwrap()
    }
}
