use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    Forbidden(String),
    BadRequest(String),
    NotFound,
    /// Caller asked for nothing we can serve; answered with an empty body.
    NoContent,
    Internal(String),
}

impl From<backend_application::AppError> for HttpError {
    fn from(value: backend_application::AppError) -> Self {
        match value {
            backend_application::AppError::Unauthorized => HttpError::Unauthorized,
            backend_application::AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            backend_application::AppError::MissingSlot => HttpError::NoContent,
            backend_application::AppError::BotTraffic => {
                HttpError::Forbidden("bot traffic blocked".to_string())
            }
            backend_application::AppError::Internal(err) => HttpError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::NoContent => return StatusCode::NO_CONTENT.into_response(),
            HttpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            HttpError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            HttpError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, format!("bad request: {}", msg))
            }
            HttpError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            HttpError::Internal(msg) => {
                error!("request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
