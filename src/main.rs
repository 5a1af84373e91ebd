use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use filevault::db::{connect_postgres, PgUserRepository};
use filevault::storage::S3ObjectStore;
use filevault::{
    AppState, Config, CredentialStore, ObjectGateway, SessionCodec, VaultError, WebServer,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

const EXIT_CONFIG: u8 = 2;
const EXIT_DATABASE: u8 = 3;
const EXIT_STORAGE: u8 = 4;
const EXIT_BIND: u8 = 5;

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration
    let (config, config_note) = match Config::load_with_env(&config_path) {
        Ok(config) => (config, None),
        Err(VaultError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            let mut config = Config::default();
            config.apply_env_overrides();
            (config, Some(format!("{config_path} not found, using defaults")))
        }
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // Initialize logging
    if let Err(e) = filevault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        filevault::logging::init_console_only(&config.logging.level);
    }

    info!("filevault starting");
    if let Some(note) = config_note {
        warn!("{}", note);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::from(EXIT_CONFIG);
    }

    let sessions = match SessionCodec::from_config(&config.session) {
        Ok(sessions) => sessions,
        Err(e) => {
            error!("Invalid session configuration: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let credentials = match init_credentials(&config).await {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Database initialization failed: {}", e);
            return ExitCode::from(EXIT_DATABASE);
        }
    };

    let files = match init_storage(&config).await {
        Ok(files) => files,
        Err(e) => {
            error!("Object storage initialization failed: {}", e);
            return ExitCode::from(EXIT_STORAGE);
        }
    };

    let state = AppState::new(credentials, files, sessions);
    let server = match WebServer::new(&config.server, state) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let listener = match server.bind().await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", server.addr(), e);
            return ExitCode::from(EXIT_BIND);
        }
    };

    if let Err(e) = server.serve(listener).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("filevault stopped");
    ExitCode::SUCCESS
}

async fn init_credentials(config: &Config) -> filevault::Result<CredentialStore> {
    let pool = connect_postgres(&config.database).await?;
    let credentials = CredentialStore::new(Arc::new(PgUserRepository::new(pool)));

    credentials.create_tables().await?;
    credentials
        .ensure_default_admin(&config.admin.default_password)
        .await?;

    Ok(credentials)
}

async fn init_storage(config: &Config) -> filevault::Result<ObjectGateway> {
    let store = S3ObjectStore::connect(&config.minio).await;
    let files = ObjectGateway::new(Arc::new(store));
    files.ensure_bucket().await?;
    Ok(files)
}
