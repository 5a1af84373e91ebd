//! Session gate for protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::web::handlers::{redirect_to_login, AppState};

/// Let authenticated requests through; redirect everything else to `/login`.
///
/// The decoded [`Session`](crate::auth::Session) is added to the request
/// extensions for downstream handlers.
pub async fn require_session(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = state.sessions.load(&jar);
    if !session.is_authenticated() {
        tracing::debug!(path = %request.uri().path(), "Unauthenticated request redirected");
        return redirect_to_login();
    }

    request.extensions_mut().insert(session);
    next.run(request).await
}
