// ============================
// crates/backend-lib/src/auth/authenticator.rs
// ============================
//! Resolves the caller of a protected request from its session token.
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, Uri};
use keyward_common::UserId;
use metrics::counter;
use serde::Deserialize;
use tracing::debug;

use super::{AuthError, TokenCodec, TokenKind};
use crate::metrics::REQUEST_REJECTED;

const BEARER_SCHEME: &str = "Bearer";

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Identity attached to a request once its session token checked out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

/// Accepts only session-kind tokens; every failure is a terminal `Unauthorized`.
#[derive(Debug, Clone)]
pub struct RequestAuthenticator {
    tokens: Arc<TokenCodec>,
}

impl RequestAuthenticator {
    pub fn new(tokens: Arc<TokenCodec>) -> Self {
        Self { tokens }
    }

    /// Validate a raw session token
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        self.tokens
            .verify(token, TokenKind::Session)
            .map_err(|err| {
                debug!(reason = %err, "session token rejected");
                counter!(REQUEST_REJECTED).increment(1);
                AuthError::Unauthorized
            })
    }

    /// Extract the token from the request and validate it.
    ///
    /// The `Authorization: Bearer` header wins; a `token` query parameter is
    /// accepted when no header is present.
    pub fn authenticate_request(&self, headers: &HeaderMap, uri: &Uri) -> Result<UserId, AuthError> {
        let token = match headers.get(AUTHORIZATION) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(bearer_token)
                .map(str::to_owned),
            None => query_token(uri),
        };

        match token {
            Some(token) => self.authenticate(&token),
            None => {
                debug!("request carries no bearer token");
                counter!(REQUEST_REJECTED).increment(1);
                Err(AuthError::Unauthorized)
            },
        }
    }
}

/// Token part of a `Bearer <token>` header value. The scheme is matched
/// case-insensitively.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        None
    } else {
        Some(token)
    }
}

fn query_token(uri: &Uri) -> Option<String> {
    let query = axum::extract::Query::<TokenQuery>::try_from_uri(uri).ok()?;
    query.0.token.filter(|t| !t.is_empty())
}
