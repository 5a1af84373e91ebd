//! Authentication handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::SignedCookieJar;

use super::AppState;
use crate::auth::Session;
use crate::db::MAX_USERNAME_LEN;
use crate::web::dto::{CredentialsRequest, MessageResponse};
use crate::web::error::ApiError;

/// Message for every failed login, whatever the cause.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed, please check your username and password";

/// `302 Found` to the login page.
pub fn redirect_to_login() -> Response {
    (StatusCode::FOUND, [(LOCATION, "/login")]).into_response()
}

fn decode_credentials(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, ApiError> {
    payload.map(|Json(req)| req).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::bad_request("Invalid request body")
    })
}

/// GET / - Send visitors to the login page.
pub async fn root() -> Response {
    redirect_to_login()
}

/// POST /register - Create an account.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let req = decode_credentials(payload)?;

    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }
    if req.username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }

    state
        .credentials
        .create_user(&req.username, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /login - Check credentials and issue the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, Json<MessageResponse>), ApiError> {
    let req = decode_credentials(payload)?;

    let Some(user) = state
        .credentials
        .verify_credentials(&req.username, &req.password)
        .await?
    else {
        tracing::info!(username = %req.username, "Login failed");
        return Err(ApiError::unauthorized(LOGIN_FAILED_MESSAGE));
    };

    let jar = state
        .sessions
        .store(jar, &Session::authenticated(&user.username))?;

    tracing::info!(user_id = user.id, username = %user.username, "Login successful");
    Ok((jar, Json(MessageResponse::new("Login successful"))))
}

/// POST /logout - Clear the session and return to the login page.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Response), ApiError> {
    let jar = state.sessions.store(jar, &Session::cleared())?;
    tracing::info!(username = %session.username, "Logged out");
    Ok((jar, redirect_to_login()))
}
