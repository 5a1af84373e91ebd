//! Test helpers for the HTTP API tests.
//!
//! Builds the full router over an in-memory SQLite credential store and the
//! in-memory object store.

#![allow(dead_code)]

use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use serde_json::json;

use filevault::auth::{SessionCodec, DEFAULT_COOKIE_NAME};
use filevault::db::{CredentialStore, SqliteUserRepository};
use filevault::storage::{MemoryObjectStore, ObjectGateway};
use filevault::web::{create_router, AppState};

/// Session signing secret used by every test server.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryObjectStore>,
    pub credentials: CredentialStore,
}

impl TestApp {
    /// Create a test application with empty stores.
    pub async fn new() -> Self {
        let repo = SqliteUserRepository::open_in_memory()
            .await
            .expect("Failed to create test database");
        let credentials = CredentialStore::new(Arc::new(repo));

        let store = Arc::new(MemoryObjectStore::new("test-bucket"));
        let files = ObjectGateway::new(store.clone());

        let state = AppState::new(credentials.clone(), files, SessionCodec::new(TEST_SECRET));
        let server = TestServer::new(create_router(state)).expect("Failed to create test server");

        Self {
            server,
            store,
            credentials,
        }
    }

    /// POST /register.
    pub async fn register(&self, username: &str, password: &str) -> TestResponse {
        self.server
            .post("/register")
            .json(&json!({ "username": username, "password": password }))
            .await
    }

    /// POST /login.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.server
            .post("/login")
            .json(&json!({ "username": username, "password": password }))
            .await
    }

    /// Register a user, log in and return the session cookie.
    pub async fn session_cookie(&self, username: &str, password: &str) -> Cookie<'static> {
        self.register(username, password).await;
        let response = self.login(username, password).await;
        response.assert_status_ok();
        response.cookie(DEFAULT_COOKIE_NAME)
    }
}

/// Location header of a response, if any.
pub fn location(response: &TestResponse) -> Option<String> {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
