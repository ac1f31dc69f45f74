//! Request extractors whose rejections use the API's JSON error shape

use crate::core::AppError;
use axum::extract::rejection::JsonRejection;
use axum_macros::FromRequest;
use tracing::warn;
use uuid::Uuid;

/// `axum::Json` that rejects with `400 {error: "Invalid request body"}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        AppError::bad_request("Invalid request body").with_details(rejection.body_text())
    }
}

/// Parses a path or query identifier, answering 400 with `message` otherwise
pub fn parse_id(raw: &str, message: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::bad_request(message))
}

/// Treats `Some("")` as absent, like an HTML form that left a filter blank
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
