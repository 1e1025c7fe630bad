// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod authenticator;
pub mod error;
pub mod password;
pub mod reset;
pub mod token;
mod service;
mod service_impl;

pub use authenticator::{bearer_token, AuthenticatedUser, RequestAuthenticator};
pub use error::AuthError;
pub use password::{is_valid, verify_password, CredentialVerifier, PasswordRequirements, MIN_PASSWORD_LENGTH};
pub use reset::PasswordResetService;
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{Claims, TokenCodec, TokenKind, TokenLifetimes, RESET_TTL, SESSION_TTL};
