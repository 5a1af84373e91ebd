//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download_file, list_files, login, logout, register, root, upload_file, AppState,
};
use super::middleware::require_session;
use crate::storage::MAX_UPLOAD_SIZE;

/// Room for multipart boundaries and part headers above the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/register", post(register))
        .route("/login", post(login));

    let upload_limit = DefaultBodyLimit::max(MAX_UPLOAD_SIZE as usize + MULTIPART_OVERHEAD);

    // Session required
    let protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/api/upload", post(upload_file).layer(upload_limit))
        .route("/api/files", get(list_files))
        .route("/api/download", get(download_file))
        .route("/api/delete", delete(delete_file))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(create_health_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create a health check router.
pub fn create_health_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
