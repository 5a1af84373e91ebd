//! Repository trait for raw `users` row access.

use async_trait::async_trait;

use super::user::User;
use crate::{Result, VaultError};

/// Row-level operations on the `users` table.
///
/// Implementations store whatever hash they are given; hashing and the
/// higher-level rules live in [`CredentialStore`](super::CredentialStore).
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Short backend name, used in logs.
    fn backend_name(&self) -> &'static str;

    /// Create the `users` table if it does not exist.
    async fn create_tables(&self) -> Result<()>;

    /// Insert a user row.
    ///
    /// Fails with [`VaultError::AlreadyExists`] when the unique constraint
    /// on `username` rejects the row.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<User>;

    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Overwrite the stored hash. Returns the number of rows changed.
    async fn update_password(&self, username: &str, password_hash: &str) -> Result<u64>;

    /// Count all users.
    async fn count(&self) -> Result<i64>;
}

/// Map an insert failure, turning unique violations into `AlreadyExists`.
pub(crate) fn map_insert_error(err: sqlx::Error, username: &str) -> VaultError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            VaultError::AlreadyExists(format!("user '{username}'"))
        }
        _ => VaultError::Database(err.to_string()),
    }
}
