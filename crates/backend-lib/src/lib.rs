// ============================
// keyward-backend-lib/src/lib.rs
// ============================
//! Core of the `keyward` credential service: password policy and hashing,
//! signed session/reset tokens, and the services and HTTP routes built on them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, PasswordResetService, RequestAuthenticator, TokenCodec};
use crate::config::{ConfigError, Settings};
use crate::storage::UserStore;

/// Application state shared across all handlers
pub struct AppState<S> {
    /// Login, registration and current-user lookups
    pub auth: Arc<dyn AuthService>,
    /// Password reset flow
    pub resets: Arc<PasswordResetService<S>>,
    /// Session token check for protected routes
    pub authenticator: RequestAuthenticator,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
}

impl<S: UserStore + 'static> AppState<S> {
    /// Create a new application state
    pub fn new(storage: S, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let storage = Arc::new(storage);
        let tokens = Arc::new(TokenCodec::new(
            settings.signing_secret.as_bytes(),
            settings.token_lifetimes(),
        ));
        let credentials = settings.hashing.verifier()?;
        let requirements = settings.password_requirements.clone();

        let auth = Arc::new(DefaultAuth::new(
            storage.clone(),
            tokens.clone(),
            credentials,
            requirements.clone(),
        ));
        let resets = Arc::new(PasswordResetService::new(
            storage,
            tokens.clone(),
            credentials,
            requirements,
        ));

        Ok(Self {
            auth,
            resets,
            authenticator: RequestAuthenticator::new(tokens),
            settings: Arc::new(settings),
        })
    }
}
