//! Database module for filevault.
//!
//! User accounts live in a single `users` table. PostgreSQL is the
//! production backend; SQLite backs tests and local runs. Both sit behind
//! [`UserRepository`], and [`CredentialStore`] adds hashing and the
//! account rules on top.

mod postgres;
mod repository;
mod schema;
mod sqlite;
mod store;
mod user;

pub use postgres::{connect as connect_postgres, connect_options, PgUserRepository};
pub use repository::UserRepository;
pub use schema::{POSTGRES_USERS_TABLE, SQLITE_USERS_TABLE};
pub use sqlite::SqliteUserRepository;
pub use store::{AdminBootstrap, CredentialStore};
pub use user::{User, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, MAX_USERNAME_LEN};
