//! services/web/src/web/router.rs
//!
//! Assembles the screens, the auth endpoints and the JSON API into one router.

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    auth::{google_login_handler, login_handler, logout_handler, me_handler, signup_handler},
    boundary::handle_panic,
    content::restructure_handler,
    middleware::{load_session, require_auth},
    pages::{health_check, index_page, login_page, payment_page, profile_page},
    payment::{bypass_handler, subscribe_handler},
    profile::{buy_credits_handler, history_handler},
    rest::ApiDoc,
    state::AppState,
};

pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Screens and endpoints that work with or without a user
    let public_routes = Router::new()
        .route("/", get(index_page))
        .route("/login", get(login_page))
        .route("/payment", get(payment_page))
        .route("/profile", get(profile_page))
        .route("/health", get(health_check))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/google", post(google_login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/api/me", get(me_handler))
        .route("/api/restructure", post(restructure_handler));

    // Endpoints that only make sense for a signed-in user
    let protected_routes = Router::new()
        .route("/api/payments/subscribe", post(subscribe_handler))
        .route("/api/payments/bypass", post(bypass_handler))
        .route("/api/history", get(history_handler))
        .route("/api/credits", post(buy_credits_handler))
        .layer(axum_middleware::from_fn(require_auth));

    let app_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            load_session,
        ))
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .with_state(app_state);

    Router::new()
        .merge(app_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}
