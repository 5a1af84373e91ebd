//! Request DTOs for the HTTP API.

use serde::Deserialize;

/// Body of `POST /register` and `POST /login`.
///
/// Missing fields decode as empty strings; handlers decide what empty
/// means.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `?filename=` query for download and delete.
#[derive(Debug, Default, Deserialize)]
pub struct FilenameQuery {
    /// Object key.
    #[serde(default)]
    pub filename: Option<String>,
}

impl FilenameQuery {
    /// The filename, if present and non-empty.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|f| !f.is_empty())
    }
}
