//! HTTP API for filevault.
//!
//! Public routes handle registration and login; everything else sits behind
//! the signed session cookie.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{ApiError, ErrorCode};
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
