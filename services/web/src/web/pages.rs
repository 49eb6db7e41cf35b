//! services/web/src/web/pages.rs
//!
//! The four server-rendered screens. Each one bootstraps from the request's
//! `SessionContext` and redirects with a full-page navigation when it needs a
//! different identity state.

use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use recraftr_core::domain::{SessionContext, UsageHistoryEntry, User};
use recraftr_core::payment::SUBSCRIPTION_AMOUNT_CENTS;
use recraftr_core::quota::DAILY_FREE_LIMIT;
use std::sync::Arc;

use crate::web::boundary::render;
use crate::web::state::AppState;

fn display_name(user: &User) -> String {
    user.name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| user.email.clone())
}

fn plan_label(user: &User) -> &'static str {
    if user.is_premium {
        "Creator Plan"
    } else {
        "Free Plan"
    }
}

fn price_label() -> String {
    format!(
        "${}.{:02}",
        SUBSCRIPTION_AMOUNT_CENTS / 100,
        SUBSCRIPTION_AMOUNT_CENTS % 100
    )
}

//=========================================================================================
// Landing page
//=========================================================================================

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub signed_in: bool,
    pub display_name: String,
    pub is_premium: bool,
    pub daily_limit: u32,
    pub price_label: String,
}

pub async fn index_page(Extension(session): Extension<SessionContext>) -> Response {
    let template = IndexTemplate {
        signed_in: session.is_present(),
        display_name: session.user().map(display_name).unwrap_or_default(),
        is_premium: session.user().map_or(false, |u| u.is_premium),
        daily_limit: DAILY_FREE_LIMIT,
        price_label: price_label(),
    };
    render(&template)
}

//=========================================================================================
// Login
//=========================================================================================

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub google_enabled: bool,
    pub google_client_id: String,
}

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    if session.is_present() {
        return Redirect::to("/").into_response();
    }

    let template = LoginTemplate {
        google_enabled: state.config.google_client_id.is_some(),
        google_client_id: state.config.google_client_id.clone().unwrap_or_default(),
    };
    render(&template)
}

//=========================================================================================
// Payment
//=========================================================================================

#[derive(Template)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub display_name: String,
    pub email: String,
    pub already_premium: bool,
    pub publishable_key: String,
    pub bypass_enabled: bool,
    pub price_label: String,
}

pub async fn payment_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    let Some(user) = session.user() else {
        return Redirect::to("/login?redirect=/payment").into_response();
    };

    let template = PaymentTemplate {
        display_name: display_name(user),
        email: user.email.clone(),
        already_premium: user.is_premium,
        publishable_key: state.config.stripe_publishable_key.clone().unwrap_or_default(),
        bypass_enabled: state.payments.bypass_enabled(),
        price_label: price_label(),
    };
    render(&template)
}

//=========================================================================================
// Profile
//=========================================================================================

pub struct HistoryRow {
    pub action: String,
    pub amount: i64,
    pub details: String,
    pub created_at: String,
}

impl From<&UsageHistoryEntry> for HistoryRow {
    fn from(entry: &UsageHistoryEntry) -> Self {
        Self {
            action: entry.action.as_str().replace('_', " "),
            amount: entry.amount,
            details: entry.details.clone(),
            created_at: entry.created_at.format("%b %e, %Y %H:%M").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
    pub is_premium: bool,
    pub plan_label: String,
    pub usage_label: String,
    pub credits: i64,
    pub history: Vec<HistoryRow>,
}

pub async fn profile_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    let Some(user) = session.user() else {
        return Redirect::to("/login").into_response();
    };

    let profile = state.profiles.load(user).await;
    let template = ProfileTemplate {
        display_name: display_name(&profile.user),
        email: profile.user.email.clone(),
        avatar_url: profile
            .user
            .avatar_url
            .clone()
            .unwrap_or_else(|| "https://via.placeholder.com/150".to_string()),
        is_premium: profile.user.is_premium,
        plan_label: plan_label(&profile.user).to_string(),
        usage_label: if profile.user.is_premium {
            "Unlimited".to_string()
        } else {
            format!("Limited ({}/day)", DAILY_FREE_LIMIT)
        },
        credits: profile.user.credits.unwrap_or(0),
        history: profile.history.iter().map(HistoryRow::from).collect(),
    };
    render(&template)
}

pub async fn health_check() -> &'static str {
    "OK"
}
