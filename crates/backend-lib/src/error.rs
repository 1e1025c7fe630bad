// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// Errors surfaced by the HTTP layer
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(err) => match err {
                AuthError::PolicyViolation | AuthError::Mismatch => StatusCode::BAD_REQUEST,
                AuthError::BadCredential
                | AuthError::Unauthorized
                | AuthError::InvalidToken
                | AuthError::Malformed
                | AuthError::Signature
                | AuthError::Expired
                | AuthError::WrongKind => StatusCode::UNAUTHORIZED,
                AuthError::NotFound => StatusCode::NOT_FOUND,
                AuthError::Duplicate => StatusCode::CONFLICT,
                AuthError::Storage(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(err) => match err {
                AuthError::PolicyViolation => "PWD_001",
                AuthError::Mismatch => "PWD_002",
                AuthError::BadCredential => "AUTH_001",
                AuthError::Unauthorized
                | AuthError::Malformed
                | AuthError::Signature
                | AuthError::Expired
                | AuthError::WrongKind => "AUTH_002",
                AuthError::InvalidToken => "AUTH_003",
                AuthError::NotFound => "NF_001",
                AuthError::Duplicate => "USER_001",
                AuthError::Storage(_) => "STORE_001",
                AuthError::Internal(_) => "INT_001",
            },
            AppError::InvalidInput(_) => "VAL_001",
        }
    }

    /// Get a message that is safe to show to any client
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Auth(err) => match err {
                AuthError::PolicyViolation => "Please enter a valid password".to_string(),
                AuthError::Mismatch => "Please enter same passwords".to_string(),
                AuthError::BadCredential => "username or password is incorrect.".to_string(),
                AuthError::Unauthorized
                | AuthError::Malformed
                | AuthError::Signature
                | AuthError::Expired
                | AuthError::WrongKind => "Unauthorized".to_string(),
                AuthError::InvalidToken => "Invalid or expired reset token".to_string(),
                AuthError::NotFound => "User not found".to_string(),
                AuthError::Duplicate => "Username already taken".to_string(),
                AuthError::Storage(_) | AuthError::Internal(_) => {
                    "An internal server error occurred".to_string()
                },
            },
            AppError::InvalidInput(msg) => format!("Invalid input: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            error!(error = %self, code = error_code, "request failed");
        }

        // Create a JSON response with error details
        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.sanitized_message(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
