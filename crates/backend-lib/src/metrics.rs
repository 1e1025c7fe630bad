// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const USER_REGISTERED: &str = "auth.user.registered";
pub const REGISTRATION_REJECTED: &str = "auth.registration.rejected";
pub const RESET_REQUESTED: &str = "auth.reset.requested";
pub const RESET_CONFIRMED: &str = "auth.reset.confirmed";
pub const RESET_REJECTED: &str = "auth.reset.rejected";
pub const REQUEST_REJECTED: &str = "auth.request.rejected";
