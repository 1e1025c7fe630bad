// =============
// crates/backend-lib/src/auth/service.rs
// =============
//! This module defines the `AuthService` trait, the login and registration
//! surface the HTTP layer talks to.
use async_trait::async_trait;
use keyward_common::{RegisterRequest, UserId, UserRecord};

use super::AuthError;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check a username/password pair and issue a session token.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// [`AuthError::BadCredential`].
    async fn login(&self, username: &str, password: &str) -> Result<String, AuthError>;

    /// Validate and persist a new user
    async fn register(&self, request: &RegisterRequest) -> Result<UserId, AuthError>;

    /// Resolve the owner of a session token
    async fn current_user(&self, session_token: &str) -> Result<UserRecord, AuthError>;

    /// Look up an already authenticated user
    async fn user(&self, id: UserId) -> Result<UserRecord, AuthError>;
}
