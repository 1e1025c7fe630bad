// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers. They parse bodies, call the services and shape responses;
//! no authentication logic lives here.

pub mod account;
pub mod health;

use axum::{extract::rejection::JsonRejection, Json};

use crate::error::AppError;

/// Unwrap a JSON body, turning extractor rejections into [`AppError::InvalidInput`]
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// Every listed field must be non-empty
pub(crate) fn require_fields(fields: &[(&str, &str)]) -> Result<(), AppError> {
    match fields.iter().find(|(_, value)| value.is_empty()) {
        Some((name, _)) => Err(AppError::InvalidInput(format!("{name} is required"))),
        None => Ok(()),
    }
}
