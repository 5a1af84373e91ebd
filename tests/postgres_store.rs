//! PostgreSQL credential store tests.
//!
//! These need a running server and are skipped unless
//! `FILEVAULT_PG_TESTS=1` is set. Connection settings come from the usual
//! `DB_*` variables.

use std::sync::Arc;

use filevault::config::Config;
use filevault::db::{connect_postgres, AdminBootstrap, CredentialStore, PgUserRepository};
use filevault::VaultError;

async fn store() -> Option<CredentialStore> {
    if std::env::var("FILEVAULT_PG_TESTS").ok().as_deref() != Some("1") {
        eprintln!("FILEVAULT_PG_TESTS not set, skipping");
        return None;
    }

    let mut config = Config::default();
    config.apply_env_overrides();

    let pool = connect_postgres(&config.database)
        .await
        .expect("Failed to connect to PostgreSQL");
    let store = CredentialStore::new(Arc::new(PgUserRepository::new(pool)));
    store.create_tables().await.expect("Failed to create tables");
    Some(store)
}

fn unique_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{prefix}_{}_{nanos}", std::process::id())
}

#[tokio::test]
async fn test_pg_create_and_verify() {
    let Some(store) = store().await else { return };
    let username = unique_name("pg_user");

    let user = store.create_user(&username, "pw").await.unwrap();
    assert!(user.id > 0);

    let err = store.create_user(&username, "other").await.unwrap_err();
    assert!(matches!(err, VaultError::AlreadyExists(_)));

    assert!(store
        .verify_credentials(&username, "pw")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_pg_update_missing_user() {
    let Some(store) = store().await else { return };

    let err = store
        .update_user_password(&unique_name("pg_ghost"), "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NotFound(_)));
}

#[tokio::test]
async fn test_pg_ensure_default_admin_is_idempotent() {
    let Some(store) = store().await else { return };

    store.ensure_default_admin("admin123").await.unwrap();
    let second = store.ensure_default_admin("admin123").await.unwrap();

    assert_eq!(second, AdminBootstrap::Reset);
    assert!(store
        .verify_credentials("admin", "admin123")
        .await
        .unwrap()
        .is_some());
}
