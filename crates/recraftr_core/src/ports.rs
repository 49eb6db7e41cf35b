//! crates/recraftr_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the auth provider, the document store, the payment
//! processor, the content extractor and the generation engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AuthSession, BatchResult, BillingDetails, NewUsageEntry, PaymentConfirmation, PaymentIntent,
    UsageHistoryEntry, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Classification of payment failures, decoded from the backend's `code` field
/// and the processor's error `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentErrorKind {
    /// The deployment is missing processor credentials.
    Configuration,
    /// The card was refused.
    Declined,
    /// The payment backend answered with a non-success status.
    Backend { status: u16 },
    /// The request never produced a response.
    Transport,
    /// A response arrived but did not match the contract.
    InvalidResponse,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct PaymentError {
    pub kind: PaymentErrorKind,
    pub message: String,
}

impl PaymentError {
    pub fn new(kind: PaymentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == PaymentErrorKind::Configuration
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolves a session token. `Ok(None)` means no live session.
    async fn current_user(&self, token: &str) -> PortResult<Option<User>>;

    async fn register(&self, email: &str, password: &str) -> PortResult<AuthSession>;

    async fn login(&self, email: &str, password: &str) -> PortResult<AuthSession>;

    /// Signs in (creating the account on first use) from a Google ID token.
    async fn login_with_google(&self, id_token: &str) -> PortResult<AuthSession>;

    async fn logout(&self, token: &str) -> PortResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn set_premium(&self, user_id: Uuid, is_premium: bool) -> PortResult<()>;

    async fn set_credits(&self, user_id: Uuid, credits: i64) -> PortResult<()>;
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append(&self, entry: NewUsageEntry) -> PortResult<UsageHistoryEntry>;

    /// Counts the user's entries of any action created at or after `since`.
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> PortResult<u32>;

    /// Returns at most `limit` entries of the user, newest first.
    async fn list_recent(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<UsageHistoryEntry>>;
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Fetches a link and returns its readable text.
    async fn extract(&self, url: &str) -> PortResult<String>;
}

#[async_trait]
pub trait BatchGenerator: Send + Sync {
    /// Produces content for every target platform in a single call.
    async fn generate(&self, text: &str, targets: &[String], tone: &str)
        -> PortResult<BatchResult>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount_cents: i64) -> Result<PaymentIntent, PaymentError>;

    async fn confirm(
        &self,
        intent: &PaymentIntent,
        payment_method_id: &str,
        billing: &BillingDetails,
    ) -> Result<PaymentConfirmation, PaymentError>;
}
