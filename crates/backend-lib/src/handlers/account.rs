// ============================
// crates/backend-lib/src/handlers/account.rs
// ============================
//! Account endpoints: registration, login, password reset and current user.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use keyward_common::{
    ConfirmResetRequest, CurrentUserResponse, LoginRequest, MessageResponse, RegisterRequest,
    ResetRequest, ResetTokenResponse, TokenResponse, UserProfile,
};

use super::{json_body, require_fields};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::storage::UserStore;
use crate::AppState;

/// `POST /api/register`
pub async fn register<S: UserStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let request = json_body(payload)?;
    require_fields(&[
        ("username", request.username.as_str()),
        ("password", request.password.as_str()),
        ("confirmPassword", request.confirm_password.as_str()),
        ("firstName", request.first_name.as_str()),
        ("lastName", request.last_name.as_str()),
    ])?;

    state.auth.register(&request).await?;
    Ok(Json(MessageResponse::new("registration success")))
}

/// `POST /api/login`
pub async fn login<S: UserStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let request = json_body(payload)?;
    require_fields(&[
        ("username", request.username.as_str()),
        ("password", request.password.as_str()),
    ])?;

    let token = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// `POST /api/check-username`, issues a reset token for a known username
pub async fn request_reset<S: UserStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<ResetTokenResponse>, AppError> {
    let request = json_body(payload)?;
    require_fields(&[("username", request.username.as_str())])?;

    let reset_token = state.resets.request_reset(&request.username).await?;
    Ok(Json(ResetTokenResponse { reset_token }))
}

/// `POST /api/update-password`
pub async fn confirm_reset<S: UserStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ConfirmResetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let request = json_body(payload)?;
    require_fields(&[
        ("resetToken", request.reset_token.as_str()),
        ("newPassword", request.new_password.as_str()),
        ("confirmPassword", request.confirm_password.as_str()),
    ])?;

    state
        .resets
        .confirm_reset(&request.reset_token, &request.new_password, &request.confirm_password)
        .await?;
    Ok(Json(MessageResponse::new("password updated")))
}

/// `GET /api/admin/user`, behind [`crate::middleware::require_session`]
pub async fn current_user<S: UserStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let user = state.auth.user(user_id).await?;
    Ok(Json(CurrentUserResponse {
        message: "success".to_string(),
        data: UserProfile::from(&user),
    }))
}
