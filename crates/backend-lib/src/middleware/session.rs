use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::storage::UserStore;
use crate::AppState;

/// Reject requests without a valid session token; otherwise attach
/// [`AuthenticatedUser`] to the request extensions.
pub async fn require_session<S: UserStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = state
        .authenticator
        .authenticate_request(request.headers(), request.uri())?;

    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}
