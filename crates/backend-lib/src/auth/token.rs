// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed bearer tokens.
//!
//! Session and reset tokens share one claim schema and one signing key. The
//! `kind` claim is the only thing that keeps a reset token from being accepted
//! as a session token and the other way round, so every verification names
//! the kind it expects.
use std::fmt;
use std::time::Duration;

use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use keyward_common::UserId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AuthError;

/// Default session lifetime (24 hours)
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Default reset lifetime (15 minutes)
pub const RESET_TTL: Duration = Duration::from_secs(15 * 60);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Session,
    Reset,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Session => f.write_str("session"),
            TokenKind::Reset => f.write_str("reset"),
        }
    }
}

/// Claims carried by every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user id
    pub sub: UserId,
    /// Expiry as unix seconds
    pub exp: i64,
    pub kind: TokenKind,
}

/// Lifetimes per token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub session: Duration,
    pub reset: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            session: SESSION_TTL,
            reset: RESET_TTL,
        }
    }
}

impl TokenLifetimes {
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Session => self.session,
            TokenKind::Reset => self.reset,
        }
    }
}

/// Current time as unix seconds
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Signs and verifies tokens with one process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetimes: TokenLifetimes,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("lifetimes", &self.lifetimes)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against our own clock reading in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetimes,
        }
    }

    /// Issue a token of `kind` using the configured lifetime for that kind.
    pub fn issue(&self, kind: TokenKind, subject: UserId) -> Result<String, AuthError> {
        self.create(kind, subject, self.lifetimes.ttl(kind))
    }

    pub fn create(&self, kind: TokenKind, subject: UserId, ttl: Duration) -> Result<String, AuthError> {
        self.create_at(kind, subject, ttl, unix_now())
    }

    /// Build and sign a token as if issued at `now`.
    pub fn create_at(
        &self,
        kind: TokenKind,
        subject: UserId,
        ttl: Duration,
        now: i64,
    ) -> Result<String, AuthError> {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: subject,
            exp: now.saturating_add(ttl),
            kind,
        };
        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))
    }

    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<UserId, AuthError> {
        self.verify_at(token, expected, unix_now())
    }

    /// Verify a token against a single clock reading.
    ///
    /// Checks run in order: structure, signature, expiry, kind.
    pub fn verify_at(&self, token: &str, expected: TokenKind, now: i64) -> Result<UserId, AuthError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                let err = classify(e.kind());
                debug!(error = %e, "token rejected");
                err
            })?
            .claims;

        if now >= claims.exp {
            return Err(AuthError::Expired);
        }
        if claims.kind != expected {
            debug!(expected = %expected, actual = %claims.kind, "token kind mismatch");
            return Err(AuthError::WrongKind);
        }
        Ok(claims.sub)
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::Signature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed,
    }
}
