//! PostgreSQL backend.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgSslMode};
use sqlx::Connection;
use tracing::{debug, info};

use super::repository::{map_insert_error, UserRepository};
use super::schema::{
    COUNT_USERS, INSERT_USER, POSTGRES_USERS_TABLE, SELECT_USER_BY_USERNAME,
    UPDATE_USER_PASSWORD,
};
use super::user::User;
use crate::config::DatabaseConfig;
use crate::{Result, VaultError};

/// Maintenance database used to create the application database.
const MAINTENANCE_DATABASE: &str = "postgres";

/// Build connection options from configuration.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions> {
    let ssl_mode = PgSslMode::from_str(&config.sslmode).map_err(|e| {
        VaultError::Config(format!("invalid database sslmode '{}': {e}", config.sslmode))
    })?;

    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.dbname)
        .ssl_mode(ssl_mode))
}

/// Connect to PostgreSQL, creating the configured database if it is missing.
///
/// The returned pool has been pinged once.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let options = connect_options(config)?;

    info!(
        host = %config.host,
        port = config.port,
        database = %config.dbname,
        "Connecting to PostgreSQL"
    );

    ensure_database(&options, &config.dbname).await?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| VaultError::Database(format!("failed to connect: {e}")))?;

    // Ping
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| VaultError::Database(format!("ping failed: {e}")))?;

    info!(database = %config.dbname, "Connected to PostgreSQL");
    Ok(pool)
}

/// Create `dbname` through the maintenance database if it does not exist.
///
/// Returns `true` when the database was created.
async fn ensure_database(options: &PgConnectOptions, dbname: &str) -> Result<bool> {
    let maintenance = options.clone().database(MAINTENANCE_DATABASE);
    let mut conn = PgConnection::connect_with(&maintenance).await.map_err(|e| {
        VaultError::Database(format!(
            "failed to connect to '{MAINTENANCE_DATABASE}' database: {e}"
        ))
    })?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(dbname)
            .fetch_one(&mut conn)
            .await?;

    if exists {
        debug!(database = dbname, "Database already exists");
    } else {
        info!(database = dbname, "Database does not exist, creating it");
        let statement = format!("CREATE DATABASE {}", quote_identifier(dbname));
        sqlx::query(&statement).execute(&mut conn).await?;
    }

    conn.close().await?;
    Ok(!exists)
}

/// Quote a PostgreSQL identifier.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// User repository backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create_tables(&self) -> Result<()> {
        sqlx::query(POSTGRES_USERS_TABLE)
            .execute(&self.pool)
            .await?;
        debug!("Ensured users table");
        Ok(())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User> {
        sqlx::query_as::<_, User>(INSERT_USER)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, username))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(SELECT_USER_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<u64> {
        let result = sqlx::query(UPDATE_USER_PASSWORD)
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(COUNT_USERS)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
