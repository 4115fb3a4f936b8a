use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => {
                tracing::warn!("Bad request: {}", message);
                (StatusCode::BAD_REQUEST, message.clone())
            }
            ApiError::Database(e) => {
                // Database internals stay in the log
                tracing::error!("Database error, changes rolled back: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Bad request".to_string())
            }
        };

        (status, Json(json!({ "status": "ERROR", "error": message }))).into_response()
    }
}
