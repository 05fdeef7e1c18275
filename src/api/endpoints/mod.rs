//! HTTP endpoint handlers.
//!
//! Handlers open a fresh SQLite connection per request through
//! `ApiContext::open_db` and map domain errors to `ApiError`.

pub mod forms;
pub mod health;
pub mod patients;
pub mod predictions;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;

/// Parse a path identifier, rejecting malformed ones with 400.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest(format!("Invalid ID format: {raw}")))
}

/// Unwrap a JSON body, turning extractor rejections into JSON 400s.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
