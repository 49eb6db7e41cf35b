//! services/web/src/web/auth.rs
//!
//! Authentication endpoints for signup, email/password login, Google login,
//! logout, and the current-session lookup.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Duration;
use recraftr_core::domain::{AuthSession, SessionContext, User};
use recraftr_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::adapters::auth::SESSION_DAYS;
use crate::web::middleware::{session_token, SESSION_COOKIE};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub redirect: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_premium: bool,
    pub credits: Option<i64>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            is_premium: user.is_premium,
            credits: user.credits,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: Option<UserResponse>,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn session_cookie(state: &AppState, token: &str, max_age_secs: i64) -> String {
    let secure = if state.config.cookie_secure { " Secure;" } else { "" };
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, secure, max_age_secs
    )
}

fn signed_in(
    state: &AppState,
    status: StatusCode,
    session: AuthSession,
) -> (StatusCode, [(header::HeaderName, String); 1], Json<AuthResponse>) {
    let cookie = session_cookie(state, &session.token, Duration::days(SESSION_DAYS).num_seconds());
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user_id: session.user_id,
            redirect: "/".to_string(),
        }),
    )
}

fn require_credentials(req: &CredentialsRequest) -> Result<(String, &str), (StatusCode, String)> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please enter both email and password.".to_string(),
        ));
    }
    Ok((email, req.password.as_str()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new account and sign in
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (email, password) = require_credentials(&req)?;

    let session = state.auth.register(&email, password).await.map_err(|e| match e {
        PortError::Conflict(_) => (
            StatusCode::CONFLICT,
            "An account with this email already exists. Try signing in.".to_string(),
        ),
        e => {
            error!("Failed to create user: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed.".to_string())
        }
    })?;

    Ok(signed_in(&state, StatusCode::CREATED, session))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (email, password) = require_credentials(&req)?;

    let session = state.auth.login(&email, password).await.map_err(|e| match e {
        PortError::InvalidCredentials | PortError::NotFound(_) => (
            StatusCode::UNAUTHORIZED,
            "User not found or incorrect password. Did you mean to Sign Up?".to_string(),
        ),
        e => {
            error!("Failed to log in: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed.".to_string())
        }
    })?;

    Ok(signed_in(&state, StatusCode::OK, session))
}

/// POST /auth/google - Login with a Google ID token
#[utoipa::path(
    post,
    path = "/auth/google",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Token rejected"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn google_login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session = state
        .auth
        .login_with_google(&req.id_token)
        .await
        .map_err(|e| {
            error!("Google sign in failed: {:?}", e);
            match e {
                PortError::Unauthorized | PortError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "Google sign in failed.".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Google sign in failed.".to_string(),
                ),
            }
        })?;

    Ok(signed_in(&state, StatusCode::OK, session))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = session_token(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.auth.logout(&token).await.map_err(|e| {
        error!("Failed to delete auth session: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
    })?;
    info!("Session closed");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&state, "", 0))],
    ))
}

/// GET /api/me - The identity attached to this request, if any
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current session", body = SessionResponse)
    )
)]
pub async fn me_handler(Extension(session): Extension<SessionContext>) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: session.user().map(UserResponse::from),
    })
}
