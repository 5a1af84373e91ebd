//! API handlers.

pub mod auth;
pub mod file;

pub use auth::*;
pub use file::*;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::auth::SessionCodec;
use crate::db::CredentialStore;
use crate::storage::ObjectGateway;

/// Application state shared across handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// User accounts.
    pub credentials: CredentialStore,
    /// File operations.
    pub files: ObjectGateway,
    /// Session cookie codec.
    pub sessions: SessionCodec,
}

impl AppState {
    /// Create a new application state.
    pub fn new(credentials: CredentialStore, files: ObjectGateway, sessions: SessionCodec) -> Self {
        Self {
            credentials,
            files,
            sessions,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.key().clone()
    }
}
