//! Configuration module for filevault.
//!
//! Settings are read from a TOML file and then selectively overridden by a
//! fixed set of environment variables.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Target database; created on startup if missing.
    #[serde(default = "default_db_name")]
    pub dbname: String,
    /// libpq-style SSL mode (disable, prefer, require, ...).
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "filevault".to_string()
}

fn default_sslmode() -> String {
    "disable".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            dbname: default_db_name(),
            sslmode: default_sslmode(),
            max_connections: default_max_connections(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MinioConfig {
    /// Endpoint as `host:port`, or a full URL.
    #[serde(default = "default_minio_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Use HTTPS when the endpoint carries no scheme.
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,
    /// Signing region. MinIO accepts any value.
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_minio_endpoint() -> String {
    "localhost:9000".to_string()
}

fn default_bucket_name() -> String {
    "filevault".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            endpoint: default_minio_endpoint(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            use_ssl: false,
            bucket_name: default_bucket_name(),
            region: default_region(),
        }
    }
}

impl MinioConfig {
    /// Endpoint URL with a scheme, derived from `use_ssl` when absent.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.use_ssl {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret the cookie signing key is derived from (must be set).
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Only send the cookie over HTTPS.
    #[serde(default)]
    pub secure: bool,
    /// SameSite policy: strict, lax or none.
    #[serde(default = "default_same_site")]
    pub same_site: String,
}

fn default_cookie_name() -> String {
    "filevault_session".to_string()
}

fn default_same_site() -> String {
    "lax".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            cookie_name: default_cookie_name(),
            secure: false,
            same_site: default_same_site(),
        }
    }
}

/// Bootstrap administrator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Password the `admin` account is reset to on every start.
    #[serde(default = "default_admin_password")]
    pub default_password: String,
}

fn default_admin_password() -> String {
    crate::db::DEFAULT_ADMIN_PASSWORD.to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            default_password: default_admin_password(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty means console only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filevault.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub minio: MinioConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SERVER_HOST`, `SERVER_PORT`
    /// - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `DB_SSLMODE`
    /// - `MINIO_ENDPOINT`, `MINIO_ACCESS_KEY_ID`, `MINIO_SECRET_ACCESS_KEY`,
    ///   `MINIO_USE_SSL`, `MINIO_BUCKET_NAME`
    /// - `SESSION_SECRET`, `SESSION_SECURE`, `SESSION_SAME_SITE`
    /// - `ADMIN_DEFAULT_PASSWORD`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values never override. Values that fail to parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = get("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(port) = get("SERVER_PORT").and_then(|v| v.trim_start_matches(':').parse().ok())
        {
            self.server.port = port;
        }

        if let Some(v) = get("DB_HOST") {
            self.database.host = v;
        }
        if let Some(port) = get("DB_PORT").and_then(|v| v.parse().ok()) {
            self.database.port = port;
        }
        if let Some(v) = get("DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = get("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = get("DB_NAME") {
            self.database.dbname = v;
        }
        if let Some(v) = get("DB_SSLMODE") {
            self.database.sslmode = v;
        }

        if let Some(v) = get("MINIO_ENDPOINT") {
            self.minio.endpoint = v;
        }
        if let Some(v) = get("MINIO_ACCESS_KEY_ID") {
            self.minio.access_key_id = v;
        }
        if let Some(v) = get("MINIO_SECRET_ACCESS_KEY") {
            self.minio.secret_access_key = v;
        }
        if let Some(v) = get("MINIO_USE_SSL") {
            self.minio.use_ssl = v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = get("MINIO_BUCKET_NAME") {
            self.minio.bucket_name = v;
        }

        if let Some(v) = get("SESSION_SECRET") {
            self.session.secret = v;
        }
        if let Some(v) = get("SESSION_SECURE") {
            self.session.secure = v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = get("SESSION_SAME_SITE") {
            self.session.same_site = v;
        }

        if let Some(v) = get("ADMIN_DEFAULT_PASSWORD") {
            self.admin.default_password = v;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the session secret is empty
    /// - the bucket name is empty
    /// - the default admin password is empty
    pub fn validate(&self) -> Result<()> {
        if self.session.secret.is_empty() {
            return Err(VaultError::Config(
                "session secret is not set. \
                 Set [session] secret in config.toml or the SESSION_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.minio.bucket_name.is_empty() {
            return Err(VaultError::Config("minio bucket_name is empty".to_string()));
        }
        if self.admin.default_password.is_empty() {
            return Err(VaultError::Config(
                "admin default_password is empty".to_string(),
            ));
        }
        Ok(())
    }
}
