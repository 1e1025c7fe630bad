// ============================
// crates/backend-lib/src/auth/reset.rs
// ============================
//! Password reset via short-lived, reset-kind tokens.
//!
//! Reset tokens are stateless: a token stays usable until it expires, even
//! after it has been used once.
use std::sync::Arc;

use keyward_common::UserId;
use metrics::counter;
use tracing::{debug, info, instrument};

use super::{AuthError, CredentialVerifier, PasswordRequirements, TokenCodec, TokenKind};
use crate::metrics::{RESET_CONFIRMED, RESET_REJECTED, RESET_REQUESTED};
use crate::storage::UserStore;

pub struct PasswordResetService<S> {
    store: Arc<S>,
    tokens: Arc<TokenCodec>,
    credentials: CredentialVerifier,
    requirements: PasswordRequirements,
}

impl<S: UserStore> PasswordResetService<S> {
    pub fn new(
        store: Arc<S>,
        tokens: Arc<TokenCodec>,
        credentials: CredentialVerifier,
        requirements: PasswordRequirements,
    ) -> Self {
        Self {
            store,
            tokens,
            credentials,
            requirements,
        }
    }

    /// Issue a reset token for a known username.
    ///
    /// Delivering the token to its owner is the caller's business.
    #[instrument(skip(self))]
    pub async fn request_reset(&self, username: &str) -> Result<String, AuthError> {
        let user = self.store.find_by_username(username).await?;
        let token = self.tokens.issue(TokenKind::Reset, user.id)?;

        counter!(RESET_REQUESTED).increment(1);
        info!(user_id = %user.id, "reset token issued");
        Ok(token)
    }

    /// Consume a reset token and replace the user's password.
    #[instrument(skip_all)]
    pub async fn confirm_reset(
        &self,
        reset_token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<UserId, AuthError> {
        let id = self.tokens.verify(reset_token, TokenKind::Reset).map_err(|err| {
            if err.is_token_error() {
                self.rejected(&err);
                AuthError::InvalidToken
            } else {
                err
            }
        })?;

        let user = self.store.find_by_id(id).await?;

        if !self.requirements.is_valid(new_password) {
            self.rejected(&AuthError::PolicyViolation);
            return Err(AuthError::PolicyViolation);
        }
        if new_password != confirm_password {
            self.rejected(&AuthError::Mismatch);
            return Err(AuthError::Mismatch);
        }

        let password_hash = self.credentials.hash_blocking(new_password).await?;
        self.store.update_password_hash(user.id, &password_hash).await?;

        counter!(RESET_CONFIRMED).increment(1);
        info!(user_id = %user.id, "password updated");
        Ok(user.id)
    }

    fn rejected(&self, reason: &AuthError) {
        counter!(RESET_REJECTED).increment(1);
        debug!(reason = %reason, "password reset rejected");
    }
}
