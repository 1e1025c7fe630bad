use std::sync::Arc;

use async_trait::async_trait;
use keyward_common::{RegisterRequest, UserId, UserRecord};
use metrics::counter;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{
    AuthError, AuthService, CredentialVerifier, PasswordRequirements, RequestAuthenticator,
    TokenCodec, TokenKind,
};
use crate::metrics::{LOGIN_FAILED, LOGIN_SUCCEEDED, REGISTRATION_REJECTED, USER_REGISTERED};
use crate::storage::{StorageError, UserStore};

pub struct DefaultAuth<S> {
    store: Arc<S>,
    tokens: Arc<TokenCodec>,
    authenticator: RequestAuthenticator,
    credentials: CredentialVerifier,
    requirements: PasswordRequirements,
    /// Hash checked against when the username is unknown
    dummy_hash: OnceCell<String>,
}

const DUMMY_PASSWORD: &str = "keyward-dummy-password";

impl<S: UserStore> DefaultAuth<S> {
    pub fn new(
        store: Arc<S>,
        tokens: Arc<TokenCodec>,
        credentials: CredentialVerifier,
        requirements: PasswordRequirements,
    ) -> Self {
        Self {
            store,
            authenticator: RequestAuthenticator::new(tokens.clone()),
            tokens,
            credentials,
            requirements,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Unknown usernames cost the same scrypt work as a wrong password.
    async fn verify_dummy(&self, password: &str) -> Result<(), AuthError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.credentials.hash_blocking(DUMMY_PASSWORD))
            .await?;
        self.credentials.verify_blocking(hash.clone(), password).await?;
        Ok(())
    }

    fn reject_registration(&self, err: AuthError) -> Result<UserId, AuthError> {
        counter!(REGISTRATION_REJECTED).increment(1);
        debug!(reason = %err, "registration rejected");
        Err(err)
    }
}

#[async_trait]
impl<S: UserStore + 'static> AuthService for DefaultAuth<S> {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = match self.store.find_by_username(username).await {
            Ok(user) => user,
            Err(StorageError::NotFound) => {
                self.verify_dummy(password).await?;
                counter!(LOGIN_FAILED).increment(1);
                debug!("unknown username");
                return Err(AuthError::BadCredential);
            },
            Err(e) => return Err(e.into()),
        };

        if !self
            .credentials
            .verify_blocking(user.password_hash, password)
            .await?
        {
            counter!(LOGIN_FAILED).increment(1);
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::BadCredential);
        }

        let token = self.tokens.issue(TokenKind::Session, user.id)?;
        counter!(LOGIN_SUCCEEDED).increment(1);
        info!(user_id = %user.id, "login succeeded");
        Ok(token)
    }

    #[instrument(skip_all, fields(username = %request.username))]
    async fn register(&self, request: &RegisterRequest) -> Result<UserId, AuthError> {
        if !self.requirements.is_valid(&request.password) {
            return self.reject_registration(AuthError::PolicyViolation);
        }
        if request.password != request.confirm_password {
            return self.reject_registration(AuthError::Mismatch);
        }

        let password_hash = self.credentials.hash_blocking(&request.password).await?;
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: request.username.clone(),
            password_hash,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
        };

        match self.store.insert(record).await {
            Ok(id) => {
                counter!(USER_REGISTERED).increment(1);
                info!(user_id = %id, "user registered");
                Ok(id)
            },
            Err(StorageError::Conflict) => self.reject_registration(AuthError::Duplicate),
            Err(e) => {
                warn!(error = %e, "failed to persist user");
                Err(e.into())
            },
        }
    }

    #[instrument(skip_all)]
    async fn current_user(&self, session_token: &str) -> Result<UserRecord, AuthError> {
        let id = self.authenticator.authenticate(session_token)?;
        self.user(id).await
    }

    async fn user(&self, id: UserId) -> Result<UserRecord, AuthError> {
        self.store.find_by_id(id).await.map_err(|e| {
            if matches!(e, StorageError::NotFound) {
                debug!(user_id = %id, "token subject no longer exists");
            }
            AuthError::from(e)
        })
    }
}
