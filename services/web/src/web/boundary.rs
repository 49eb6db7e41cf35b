//! The rendering fault boundary: a panic anywhere below the router, or a screen
//! that fails to render, becomes the full-page "Something went wrong." view.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::any::Any;
use tracing::error;

/// Static so that showing it can never fail in turn.
pub const FALLBACK_PAGE: &str = include_str!("../../templates/error.html");

pub fn fallback_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(FALLBACK_PAGE)).into_response()
}

/// Response factory for `tower_http::catch_panic::CatchPanicLayer`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("Boundary caught an error: {}", detail);
    fallback_response()
}

/// Renders a screen, falling back to the error page if the template fails.
pub fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render screen: {:?}", e);
            fallback_response()
        }
    }
}
