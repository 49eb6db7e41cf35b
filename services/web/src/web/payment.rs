//! services/web/src/web/payment.rs
//!
//! Checkout endpoints for the Creator plan.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use recraftr_core::domain::User;
use recraftr_core::ports::PaymentErrorKind;
use recraftr_core::{SubscriptionError, SubscriptionOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct SubscribeRequest {
    /// Payment method created by the card element on the payment screen.
    pub payment_method_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubscribeResponse {
    Activated { tx_id: String, redirect: String },
    Incomplete { payment_status: String },
}

impl From<SubscriptionOutcome> for SubscribeResponse {
    fn from(outcome: SubscriptionOutcome) -> Self {
        match outcome {
            SubscriptionOutcome::Activated { tx_id } => SubscribeResponse::Activated {
                tx_id,
                redirect: "/".to_string(),
            },
            SubscriptionOutcome::Incomplete { status } => SubscribeResponse::Incomplete {
                payment_status: status.as_str().to_string(),
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaymentErrorResponse {
    pub error: String,
    pub kind: String,
    /// True when the deployment allows the developer bypass and the failure was
    /// a configuration error.
    pub bypass_available: bool,
}

fn kind_label(kind: &PaymentErrorKind) -> &'static str {
    match kind {
        PaymentErrorKind::Configuration => "configuration",
        PaymentErrorKind::Declined => "declined",
        PaymentErrorKind::Backend { .. } => "backend",
        PaymentErrorKind::Transport => "transport",
        PaymentErrorKind::InvalidResponse => "invalid_response",
    }
}

fn error_response(state: &AppState, err: SubscriptionError) -> Response {
    error!("Subscription failed: {:?}", err);
    let (status, kind, bypass_available) = match &err {
        SubscriptionError::Payment(e) => {
            let status = match e.kind {
                PaymentErrorKind::Declined => StatusCode::PAYMENT_REQUIRED,
                _ => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                kind_label(&e.kind),
                state.payments.bypass_enabled() && e.is_configuration(),
            )
        }
        SubscriptionError::Activation(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "activation", false)
        }
        SubscriptionError::BypassDisabled => (StatusCode::FORBIDDEN, "bypass_disabled", false),
    };

    let message = match &err {
        SubscriptionError::Payment(e) if e.message.is_empty() => {
            "Connection error. Please try again.".to_string()
        }
        other => other.to_string(),
    };

    (
        status,
        Json(PaymentErrorResponse {
            error: message,
            kind: kind.to_string(),
            bypass_available,
        }),
    )
        .into_response()
}

/// Pay for the Creator plan and activate it.
#[utoipa::path(
    post,
    path = "/api/payments/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Charge processed", body = SubscribeResponse),
        (status = 401, description = "Sign in required"),
        (status = 402, description = "Card declined", body = PaymentErrorResponse),
        (status = 502, description = "Payment backend failure", body = PaymentErrorResponse),
        (status = 500, description = "Plan could not be activated", body = PaymentErrorResponse)
    )
)]
pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<SubscribeRequest>,
) -> Response {
    if req.payment_method_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "A payment method is required".to_string(),
        )
            .into_response();
    }

    match state
        .payments
        .subscribe(&user, req.payment_method_id.trim())
        .await
    {
        Ok(outcome) => Json(SubscribeResponse::from(outcome)).into_response(),
        Err(e) => error_response(&state, e),
    }
}

/// Developer-only: activate the plan without paying.
#[utoipa::path(
    post,
    path = "/api/payments/bypass",
    responses(
        (status = 200, description = "Plan activated", body = SubscribeResponse),
        (status = 401, description = "Sign in required"),
        (status = 403, description = "Bypass disabled in this deployment", body = PaymentErrorResponse)
    )
)]
pub async fn bypass_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Response {
    match state.payments.activate_without_payment(&user).await {
        Ok(outcome) => Json(SubscribeResponse::from(outcome)).into_response(),
        Err(e) => error_response(&state, e),
    }
}
