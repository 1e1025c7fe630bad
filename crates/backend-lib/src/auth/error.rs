// ============================
// crates/backend-lib/src/auth/error.rs
// ============================
//! Closed set of outcomes the authentication core can report.
use crate::storage::StorageError;
use thiserror::Error;

/// Authentication error kinds. The transport layer decides how each is rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("password does not meet the policy requirements")]
    PolicyViolation,

    #[error("passwords do not match")]
    Mismatch,

    #[error("username or password is incorrect")]
    BadCredential,

    #[error("user not found")]
    NotFound,

    #[error("username already taken")]
    Duplicate,

    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    Signature,

    #[error("token expired")]
    Expired,

    #[error("token kind mismatch")]
    WrongKind,

    #[error("invalid or expired reset token")]
    InvalidToken,

    #[error("unauthorized")]
    Unauthorized,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for the errors produced by token verification.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::Malformed | AuthError::Signature | AuthError::Expired | AuthError::WrongKind
        )
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => AuthError::NotFound,
            StorageError::Conflict => AuthError::Duplicate,
            StorageError::Backend(msg) => AuthError::Storage(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_auth_errors() {
        assert_eq!(AuthError::from(StorageError::NotFound), AuthError::NotFound);
        assert_eq!(AuthError::from(StorageError::Conflict), AuthError::Duplicate);
        assert_eq!(
            AuthError::from(StorageError::Backend("disk full".to_string())),
            AuthError::Storage("disk full".to_string())
        );
    }

    #[test]
    fn test_token_error_classification() {
        assert!(AuthError::Expired.is_token_error());
        assert!(AuthError::WrongKind.is_token_error());
        assert!(!AuthError::InvalidToken.is_token_error());
        assert!(!AuthError::BadCredential.is_token_error());
    }
}
