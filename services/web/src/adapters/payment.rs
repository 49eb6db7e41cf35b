//! services/web/src/adapters/payment.rs
//!
//! The payment collaborator: the payment backend creates a fixed-amount intent
//! and returns its client secret, then the intent is confirmed against the card
//! processor with the publishable key, exactly as the browser SDK would.
//! It implements the `PaymentGateway` port from the `core` crate.

use async_trait::async_trait;
use recraftr_core::domain::{BillingDetails, PaymentConfirmation, PaymentIntent, PaymentStatus};
use recraftr_core::ports::{PaymentError, PaymentErrorKind, PaymentGateway};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

/// The `code` the payment backend sends when its processor keys are missing.
pub const CONFIGURATION_ERROR_CODE: &str = "configuration_error";

#[derive(Clone)]
pub struct HttpPaymentGateway {
    http: reqwest::Client,
    backend_url: String,
    processor_url: String,
    publishable_key: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(
        http: reqwest::Client,
        backend_url: String,
        processor_url: String,
        publishable_key: Option<String>,
    ) -> Self {
        Self {
            http,
            backend_url,
            processor_url,
            publishable_key,
        }
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct CreateIntentRequest {
    amount: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIntentResponse {
    client_secret: String,
}

/// Error body of the payment backend.
#[derive(Debug, Default, Deserialize)]
pub struct BackendErrorBody {
    pub error: Option<String>,
    pub code: Option<String>,
}

#[derive(Deserialize)]
struct ConfirmResponse {
    id: String,
    status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessorErrorBody {
    pub error: Option<ProcessorError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessorError {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

//=========================================================================================
// Error Classification
//=========================================================================================

pub fn classify_backend_error(status: StatusCode, body: BackendErrorBody) -> PaymentError {
    let message = body
        .error
        .unwrap_or_else(|| format!("Backend Error ({})", status.as_u16()));
    let kind = match body.code.as_deref() {
        Some(CONFIGURATION_ERROR_CODE) => PaymentErrorKind::Configuration,
        _ => PaymentErrorKind::Backend {
            status: status.as_u16(),
        },
    };
    PaymentError::new(kind, message)
}

pub fn classify_processor_error(status: StatusCode, body: ProcessorErrorBody) -> PaymentError {
    let error = body.error.unwrap_or_default();
    let message = format!(
        "Stripe: {}",
        error
            .message
            .unwrap_or_else(|| format!("request failed ({})", status.as_u16()))
    );
    let kind = match (error.kind.as_deref(), status) {
        (Some("card_error"), _) => PaymentErrorKind::Declined,
        (_, StatusCode::UNAUTHORIZED) => PaymentErrorKind::Configuration,
        _ => PaymentErrorKind::Backend {
            status: status.as_u16(),
        },
    };
    PaymentError::new(kind, message)
}

/// The intent id is the client secret's prefix before `_secret_`.
pub fn intent_id_from_secret(client_secret: &str) -> Result<String, PaymentError> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id.to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            PaymentError::new(
                PaymentErrorKind::InvalidResponse,
                "Payment backend returned a malformed client secret",
            )
        })
}

fn transport(e: reqwest::Error) -> PaymentError {
    PaymentError::new(PaymentErrorKind::Transport, e.to_string())
}

//=========================================================================================
// `PaymentGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_intent(&self, amount_cents: i64) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .http
            .post(format!("{}/api/create-payment-intent", self.backend_url))
            .json(&CreateIntentRequest {
                amount: amount_cents,
            })
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<BackendErrorBody>().await.unwrap_or_default();
            return Err(classify_backend_error(status, body));
        }

        let body = response.json::<CreateIntentResponse>().await.map_err(|e| {
            PaymentError::new(PaymentErrorKind::InvalidResponse, e.to_string())
        })?;
        let id = intent_id_from_secret(&body.client_secret)?;
        Ok(PaymentIntent {
            id,
            client_secret: body.client_secret,
        })
    }

    async fn confirm(
        &self,
        intent: &PaymentIntent,
        payment_method_id: &str,
        billing: &BillingDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let publishable_key = self.publishable_key.as_deref().ok_or_else(|| {
            PaymentError::new(
                PaymentErrorKind::Configuration,
                "Payment processor key is not configured",
            )
        })?;

        let response = self
            .http
            .post(format!(
                "{}/v1/payment_intents/{}/confirm",
                self.processor_url, intent.id
            ))
            .basic_auth(publishable_key, None::<&str>)
            .form(&[
                ("client_secret", intent.client_secret.as_str()),
                ("payment_method", payment_method_id),
                ("receipt_email", billing.email.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .json::<ProcessorErrorBody>()
                .await
                .unwrap_or_default();
            return Err(classify_processor_error(status, body));
        }

        let body = response.json::<ConfirmResponse>().await.map_err(|e| {
            PaymentError::new(PaymentErrorKind::InvalidResponse, e.to_string())
        })?;
        info!("Payment intent {} is {}", body.id, body.status);
        Ok(PaymentConfirmation {
            intent_id: body.id,
            status: PaymentStatus::parse(&body.status),
        })
    }
}
