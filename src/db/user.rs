//! User model.

use std::fmt;

/// Username of the bootstrap administrator.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Built-in password the administrator is reset to unless configured otherwise.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Longest username the `users` table accepts, in characters.
pub const MAX_USERNAME_LEN: usize = 50;

/// A registered user account.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Identifier assigned by the database.
    pub id: i32,
    /// Login username (unique).
    pub username: String,
    /// Argon2id PHC hash. Never the plaintext.
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
