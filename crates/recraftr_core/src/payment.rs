//! crates/recraftr_core/src/payment.rs
//!
//! The Creator plan checkout: intent creation, card confirmation and the
//! entitlement update that follows a successful charge.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::{BillingDetails, NewUsageEntry, PaymentStatus, UsageAction, User};
use crate::ports::{HistoryRepository, PaymentError, PaymentGateway, PortError, UserRepository};

/// Price of the Creator plan in cents.
pub const SUBSCRIPTION_AMOUNT_CENTS: i64 = 1500;

/// Transaction id recorded when the developer bypass activates a plan.
pub const BYPASS_TX_ID: &str = "test_bypass_tx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionOutcome {
    Activated { tx_id: String },
    /// The processor accepted the request but the charge has not settled.
    Incomplete { status: PaymentStatus },
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("{0}")]
    Payment(#[from] PaymentError),
    #[error("Failed to update user record.")]
    Activation(#[source] PortError),
    #[error("Payment bypass is disabled")]
    BypassDisabled,
}

#[derive(Clone)]
pub struct PaymentOrchestrator {
    gateway: Arc<dyn PaymentGateway>,
    users: Arc<dyn UserRepository>,
    history: Arc<dyn HistoryRepository>,
    bypass_enabled: bool,
}

impl PaymentOrchestrator {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        users: Arc<dyn UserRepository>,
        history: Arc<dyn HistoryRepository>,
        bypass_enabled: bool,
    ) -> Self {
        Self {
            gateway,
            users,
            history,
            bypass_enabled,
        }
    }

    pub fn bypass_enabled(&self) -> bool {
        self.bypass_enabled
    }

    pub async fn subscribe(
        &self,
        user: &User,
        payment_method_id: &str,
    ) -> Result<SubscriptionOutcome, SubscriptionError> {
        let intent = self
            .gateway
            .create_intent(SUBSCRIPTION_AMOUNT_CENTS)
            .await
            .map_err(|e| {
                error!("Failed to create payment intent: {:?}", e);
                e
            })?;

        let confirmation = self
            .gateway
            .confirm(&intent, payment_method_id, &BillingDetails::from(user))
            .await
            .map_err(|e| {
                error!("Card confirmation failed: {:?}", e);
                e
            })?;

        if confirmation.status != PaymentStatus::Succeeded {
            warn!(
                "Payment {} ended with status {}",
                confirmation.intent_id,
                confirmation.status.as_str()
            );
            return Ok(SubscriptionOutcome::Incomplete {
                status: confirmation.status,
            });
        }

        self.activate(user, &confirmation.intent_id).await?;
        Ok(SubscriptionOutcome::Activated {
            tx_id: confirmation.intent_id,
        })
    }

    /// Grants the plan without charging. Only available when the deployment opts in.
    pub async fn activate_without_payment(
        &self,
        user: &User,
    ) -> Result<SubscriptionOutcome, SubscriptionError> {
        if !self.bypass_enabled {
            return Err(SubscriptionError::BypassDisabled);
        }
        warn!("Activating Creator plan for user {} without payment", user.id);
        self.activate(user, BYPASS_TX_ID).await?;
        Ok(SubscriptionOutcome::Activated {
            tx_id: BYPASS_TX_ID.to_string(),
        })
    }

    async fn activate(&self, user: &User, tx_id: &str) -> Result<(), SubscriptionError> {
        let result = async {
            self.users.set_premium(user.id, true).await?;
            self.history
                .append(NewUsageEntry {
                    user_id: user.id,
                    action: UsageAction::SubscriptionStarted,
                    amount: SUBSCRIPTION_AMOUNT_CENTS / 100,
                    details: format!(
                        "Creator Plan (${}.{:02}) - TxID: {}",
                        SUBSCRIPTION_AMOUNT_CENTS / 100,
                        SUBSCRIPTION_AMOUNT_CENTS % 100,
                        tx_id
                    ),
                })
                .await
        }
        .await;

        match result {
            Ok(_) => {
                info!("Creator plan activated for user {} ({})", user.id, tx_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to update user record: {:?}", e);
                Err(SubscriptionError::Activation(e))
            }
        }
    }
}
