//! filevault - authenticated file storage over S3-compatible object storage.
//!
//! Users register and log in against a PostgreSQL-backed credential store;
//! a signed session cookie then grants access to upload, list, download and
//! delete files kept in a MinIO bucket.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod storage;
pub mod web;

pub use auth::{hash_password, verify_password, PasswordError, Session, SessionCodec};
pub use config::Config;
pub use db::{CredentialStore, User, UserRepository};
pub use error::{Result, VaultError};
pub use storage::{ObjectGateway, ObjectStore};
pub use web::{create_router, AppState, WebServer};
