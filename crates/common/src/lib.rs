// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the `keyward` credential service and its clients.
//! This module defines the HTTP request/response bodies and the stored user record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a user
pub type UserId = Uuid;

/// A user row as owned by the persistence layer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique, stable identifier
    pub id: UserId,
    /// Unique login name
    pub username: String,
    /// Salted one-way hash in PHC string format
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Public view of a user, never carries the password hash
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&UserRecord> for UserProfile {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
        }
    }
}

/// Body of `POST /api/register`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `POST /api/login`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/check-username`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResetRequest {
    pub username: String,
}

/// Body of `POST /api/update-password`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResetRequest {
    /// Token previously returned by the reset request
    pub reset_token: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Session token issued by a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub token: String,
}

/// Reset token issued for a known username
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenResponse {
    pub reset_token: String,
}

/// Plain acknowledgement
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response of `GET /api/admin/user`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CurrentUserResponse {
    pub message: String,
    pub data: UserProfile,
}
