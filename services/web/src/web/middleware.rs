//! services/web/src/web/middleware.rs
//!
//! Session middleware: every request gets a `SessionContext`, and the API routes
//! that need an account additionally get the `User`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use recraftr_core::SessionContext;
use std::sync::Arc;

use crate::web::state::AppState;

/// Name of the cookie carrying the login session token.
pub const SESSION_COOKIE: &str = "session";

/// Parses the session token out of the `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok())?;

    cookie_header.split(';').find_map(|c| {
        let (name, value) = c.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

/// Resolves the session cookie and inserts the `SessionContext` into request extensions.
///
/// Never rejects: screens decide for themselves whether an absent session redirects.
pub async fn load_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = session_token(req.headers());
    let session = state.session.resolve(token.as_deref()).await;
    req.extensions_mut().insert(session);
    next.run(req).await
}

/// Middleware for API routes that require a signed-in user.
///
/// If present, inserts the `User` into request extensions for handlers to use.
/// If absent, returns 401 Unauthorized.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user = req
        .extensions()
        .get::<SessionContext>()
        .and_then(|session| session.user().cloned())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
