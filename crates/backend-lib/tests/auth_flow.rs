// crates/backend-lib/tests/auth_flow.rs
use std::sync::Arc;

use keyward_backend_lib::auth::{
    AuthError, AuthService, CredentialVerifier, DefaultAuth, PasswordRequirements,
    PasswordResetService, RequestAuthenticator, TokenCodec, TokenKind, TokenLifetimes,
};
use keyward_backend_lib::storage::{FlatFileStorage, MemoryUserStore, UserStore};
use keyward_common::RegisterRequest;
use scrypt::Params;
use tempfile::TempDir;

const SECRET: &[u8] = b"integration-secret-integration-secret";

struct Harness<S> {
    store: Arc<S>,
    tokens: Arc<TokenCodec>,
    auth: DefaultAuth<S>,
    resets: PasswordResetService<S>,
    authenticator: RequestAuthenticator,
}

fn harness<S: UserStore + 'static>(store: S) -> Harness<S> {
    let store = Arc::new(store);
    let tokens = Arc::new(TokenCodec::new(SECRET, TokenLifetimes::default()));
    let credentials = CredentialVerifier::new(Params::new(4, 8, 1, 32).unwrap());
    let requirements = PasswordRequirements::default();

    Harness {
        auth: DefaultAuth::new(store.clone(), tokens.clone(), credentials, requirements.clone()),
        resets: PasswordResetService::new(store.clone(), tokens.clone(), credentials, requirements),
        authenticator: RequestAuthenticator::new(tokens.clone()),
        tokens,
        store,
    }
}

fn registration(username: &str, password: &str, confirm: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: password.to_string(),
        confirm_password: confirm.to_string(),
        first_name: "Alice".to_string(),
        last_name: "Liddell".to_string(),
    }
}

#[tokio::test]
async fn test_login_issues_session_token_for_user() {
    let h = harness(MemoryUserStore::new());
    let id = h
        .auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();

    let token = h.auth.login("alice", "Abcdef1!").await.unwrap();
    assert_eq!(h.tokens.verify(&token, TokenKind::Session), Ok(id));
    assert_eq!(h.tokens.verify(&token, TokenKind::Reset), Err(AuthError::WrongKind));

    // The stored hash is not the password
    let stored = h.store.find_by_id(id).await.unwrap();
    assert_ne!(stored.password_hash, "Abcdef1!");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness(MemoryUserStore::new());
    h.auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();

    let wrong_password = h.auth.login("alice", "Wrong123!").await.unwrap_err();
    let unknown_user = h.auth.login("mallory", "Abcdef1!").await.unwrap_err();

    assert_eq!(wrong_password, AuthError::BadCredential);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_register_rejections() {
    let store = MemoryUserStore::new();
    let h = harness(store.clone());

    assert_eq!(
        h.auth.register(&registration("alice", "Abcdef1!", "Abcdef1?")).await,
        Err(AuthError::Mismatch)
    );
    assert!(store.is_empty());

    assert_eq!(
        h.auth.register(&registration("alice", "weak", "weak")).await,
        Err(AuthError::PolicyViolation)
    );
    // Policy is checked before the confirmation
    assert_eq!(
        h.auth.register(&registration("alice", "weak", "other")).await,
        Err(AuthError::PolicyViolation)
    );
    assert!(store.is_empty());

    h.auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();
    assert_eq!(
        h.auth.register(&registration("alice", "Zyxwvu9#", "Zyxwvu9#")).await,
        Err(AuthError::Duplicate)
    );
    assert_eq!(store.len(), 1);

    // The original password still works
    assert!(h.auth.login("alice", "Abcdef1!").await.is_ok());
}

#[tokio::test]
async fn test_current_user() {
    let h = harness(MemoryUserStore::new());
    let id = h
        .auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();
    let token = h.auth.login("alice", "Abcdef1!").await.unwrap();

    let user = h.auth.current_user(&token).await.unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.username, "alice");
    assert_eq!(user.first_name, "Alice");

    assert_eq!(h.auth.current_user("junk").await, Err(AuthError::Unauthorized));

    // A valid token whose subject does not exist
    let orphan = h.tokens.issue(TokenKind::Session, uuid::Uuid::new_v4()).unwrap();
    assert_eq!(h.auth.current_user(&orphan).await, Err(AuthError::NotFound));
}

#[tokio::test]
async fn test_reset_flow_end_to_end() {
    let h = harness(MemoryUserStore::new());
    let id = h
        .auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();

    let reset_token = h.resets.request_reset("alice").await.unwrap();
    assert_eq!(h.tokens.verify(&reset_token, TokenKind::Reset), Ok(id));

    assert_eq!(
        h.resets.confirm_reset(&reset_token, "NewPass1!", "NewPass1!").await,
        Ok(id)
    );

    assert!(h.auth.login("alice", "NewPass1!").await.is_ok());
    assert_eq!(
        h.auth.login("alice", "Abcdef1!").await,
        Err(AuthError::BadCredential)
    );
}

#[tokio::test]
async fn test_reset_token_is_reusable_until_expiry() {
    let h = harness(MemoryUserStore::new());
    h.auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();
    let reset_token = h.resets.request_reset("alice").await.unwrap();

    h.resets
        .confirm_reset(&reset_token, "NewPass1!", "NewPass1!")
        .await
        .unwrap();
    h.resets
        .confirm_reset(&reset_token, "Again123!", "Again123!")
        .await
        .unwrap();

    assert!(h.auth.login("alice", "Again123!").await.is_ok());
}

#[tokio::test]
async fn test_reset_rejections() {
    let h = harness(MemoryUserStore::new());
    let id = h
        .auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();

    assert_eq!(h.resets.request_reset("nobody").await, Err(AuthError::NotFound));

    // Session tokens cannot authorise a reset
    let session = h.auth.login("alice", "Abcdef1!").await.unwrap();
    assert_eq!(
        h.resets.confirm_reset(&session, "NewPass1!", "NewPass1!").await,
        Err(AuthError::InvalidToken)
    );

    // Expired and foreign tokens collapse to the same error
    let expired = h
        .tokens
        .create_at(
            TokenKind::Reset,
            id,
            std::time::Duration::from_secs(60),
            chrono::Utc::now().timestamp() - 120,
        )
        .unwrap();
    assert_eq!(
        h.resets.confirm_reset(&expired, "NewPass1!", "NewPass1!").await,
        Err(AuthError::InvalidToken)
    );
    assert_eq!(
        h.resets.confirm_reset("not.a.token", "NewPass1!", "NewPass1!").await,
        Err(AuthError::InvalidToken)
    );

    let reset_token = h.resets.request_reset("alice").await.unwrap();
    assert_eq!(
        h.resets.confirm_reset(&reset_token, "weak", "weak").await,
        Err(AuthError::PolicyViolation)
    );
    assert_eq!(
        h.resets.confirm_reset(&reset_token, "NewPass1!", "NewPass2!").await,
        Err(AuthError::Mismatch)
    );

    // Subject vanished
    let orphan = h.tokens.issue(TokenKind::Reset, uuid::Uuid::new_v4()).unwrap();
    assert_eq!(
        h.resets.confirm_reset(&orphan, "NewPass1!", "NewPass1!").await,
        Err(AuthError::NotFound)
    );

    // Nothing above changed the password
    assert!(h.auth.login("alice", "Abcdef1!").await.is_ok());
}

#[tokio::test]
async fn test_reset_token_replayed_as_session_is_unauthorized() {
    let h = harness(MemoryUserStore::new());
    h.auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();

    let reset_token = h.resets.request_reset("alice").await.unwrap();
    assert_eq!(
        h.authenticator.authenticate(&reset_token),
        Err(AuthError::Unauthorized)
    );
    assert_eq!(
        h.auth.current_user(&reset_token).await,
        Err(AuthError::Unauthorized)
    );
}

#[tokio::test]
async fn test_flows_over_flat_file_storage() {
    let temp_dir = TempDir::new().unwrap();
    let h = harness(FlatFileStorage::new(temp_dir.path()).unwrap());

    let id = h
        .auth
        .register(&registration("alice", "Abcdef1!", "Abcdef1!"))
        .await
        .unwrap();
    assert_eq!(
        h.auth.register(&registration("alice", "Abcdef1!", "Abcdef1!")).await,
        Err(AuthError::Duplicate)
    );

    let reset_token = h.resets.request_reset("alice").await.unwrap();
    h.resets
        .confirm_reset(&reset_token, "NewPass1!", "NewPass1!")
        .await
        .unwrap();

    let token = h.auth.login("alice", "NewPass1!").await.unwrap();
    assert_eq!(h.auth.current_user(&token).await.unwrap().id, id);
}

#[tokio::test]
async fn test_concurrent_registrations_surface_duplicate() {
    let h = Arc::new(harness(MemoryUserStore::new()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            h.auth
                .register(&registration("zoe", "Abcdef1!", "Abcdef1!"))
                .await
        }));
    }

    let mut ok = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AuthError::Duplicate) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(duplicates, 7);
}
