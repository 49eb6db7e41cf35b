//! crates/recraftr_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Separator placed between the parts of a list-valued generation result.
pub const PART_SEPARATOR: &str = "\n\n---\n\n";

/// A user account as owned by the auth and persistence collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_premium: bool,
    pub credits: Option<i64>,
}

// A browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// The identity attached to one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionContext {
    #[default]
    Absent,
    Present(User),
}

impl SessionContext {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionContext::Present(user) => Some(user),
            SessionContext::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SessionContext::Present(_))
    }
}

/// The tag stored on every usage-history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageAction {
    Restructure,
    SubscriptionStarted,
    BuyCredits,
}

impl UsageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageAction::Restructure => "restructure",
            UsageAction::SubscriptionStarted => "subscription_started",
            UsageAction::BuyCredits => "buy_credits",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "restructure" => Some(UsageAction::Restructure),
            "subscription_started" => Some(UsageAction::SubscriptionStarted),
            "buy_credits" => Some(UsageAction::BuyCredits),
            _ => None,
        }
    }
}

impl fmt::Display for UsageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: UsageAction,
    pub amount: i64,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// The payload for appending a history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUsageEntry {
    pub user_id: Uuid,
    pub action: UsageAction,
    pub amount: i64,
    pub details: String,
}

/// How the submitted content should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Text,
    Article,
    Youtube,
}

impl InputMode {
    /// Article and YouTube modes carry a link that must be extracted first.
    pub fn is_url(&self) -> bool {
        matches!(self, InputMode::Article | InputMode::Youtube)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Text => "text",
            InputMode::Article => "article",
            InputMode::Youtube => "youtube",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated content for a single platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedContent {
    Text(String),
    Parts(Vec<String>),
}

impl GeneratedContent {
    pub fn into_display(self) -> String {
        match self {
            GeneratedContent::Text(text) => text,
            GeneratedContent::Parts(parts) => parts.join(PART_SEPARATOR),
        }
    }
}

/// The generator's reply, in the order the platforms appeared in it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub entries: Vec<(String, GeneratedContent)>,
}

impl BatchResult {
    pub fn new(entries: Vec<(String, GeneratedContent)>) -> Self {
        Self { entries }
    }

    /// Reshapes the mapping into display pairs, keeping key order.
    pub fn into_platform_contents(self) -> Vec<PlatformContent> {
        self.entries
            .into_iter()
            .map(|(platform, content)| PlatformContent {
                platform,
                content: content.into_display(),
            })
            .collect()
    }
}

/// A display-ready result tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformContent {
    pub platform: String,
    pub content: String,
}

/// A payment intent created by the payment backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Succeeded,
    Processing,
    RequiresAction,
    Other(String),
}

impl PaymentStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "succeeded" => PaymentStatus::Succeeded,
            "processing" => PaymentStatus::Processing,
            "requires_action" => PaymentStatus::RequiresAction,
            other => PaymentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Processing => "processing",
            PaymentStatus::RequiresAction => "requires_action",
            PaymentStatus::Other(other) => other,
        }
    }
}

/// The processor's answer to a confirmation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub intent_id: String,
    pub status: PaymentStatus,
}

/// Billing details forwarded with a card confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingDetails {
    pub name: Option<String>,
    pub email: String,
}

impl From<&User> for BillingDetails {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
