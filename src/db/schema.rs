//! Table definitions and shared SQL.
//!
//! Statements use `$N` placeholders, which both PostgreSQL and SQLite
//! accept, so the two repositories share everything except the DDL.

/// PostgreSQL `users` table.
pub const POSTGRES_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          SERIAL PRIMARY KEY,
    username    VARCHAR(50) UNIQUE NOT NULL,
    password    VARCHAR(255) NOT NULL      -- Argon2id hash
)
"#;

/// SQLite `users` table, used for in-memory and local databases.
pub const SQLITE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL
)
"#;

pub(crate) const INSERT_USER: &str =
    "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING id, username, password";

pub(crate) const SELECT_USER_BY_USERNAME: &str =
    "SELECT id, username, password FROM users WHERE username = $1";

pub(crate) const UPDATE_USER_PASSWORD: &str = "UPDATE users SET password = $1 WHERE username = $2";

pub(crate) const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";
