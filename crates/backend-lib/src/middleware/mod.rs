// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `keyward` HTTP server.

pub mod session;

pub use session::require_session;
