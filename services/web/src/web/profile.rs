//! services/web/src/web/profile.rs
//!
//! Usage history and credit top-up endpoints used by the profile screen.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use recraftr_core::domain::{UsageHistoryEntry, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::auth::UserResponse;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    pub action: String,
    pub amount: i64,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl From<UsageHistoryEntry> for HistoryEntryResponse {
    fn from(entry: UsageHistoryEntry) -> Self {
        Self {
            id: entry.id,
            action: entry.action.as_str().to_string(),
            amount: entry.amount,
            details: entry.details,
            created_at: entry.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct BuyCreditsRequest {
    pub amount: i64,
}

/// The signed-in user's most recent usage history.
#[utoipa::path(
    get,
    path = "/api/history",
    responses(
        (status = 200, description = "Newest entries first", body = [HistoryEntryResponse]),
        (status = 401, description = "Sign in required")
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<Vec<HistoryEntryResponse>> {
    let profile = state.profiles.load(&user).await;
    Json(
        profile
            .history
            .into_iter()
            .map(HistoryEntryResponse::from)
            .collect(),
    )
}

/// Add credits to the signed-in user's balance.
#[utoipa::path(
    post,
    path = "/api/credits",
    request_body = BuyCreditsRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Amount must be positive"),
        (status = 401, description = "Sign in required"),
        (status = 500, description = "Purchase failed")
    )
)]
pub async fn buy_credits_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<BuyCreditsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.amount <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Amount must be positive".to_string(),
        ));
    }

    let updated = state
        .profiles
        .buy_credits(&user, req.amount)
        .await
        .map_err(|e| {
            error!("Purchase failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Purchase failed. Please try again.".to_string(),
            )
        })?;

    Ok(Json(UserResponse::from(&updated)))
}
