//! Middleware for the HTTP API.

pub mod session;

pub use session::require_session;
