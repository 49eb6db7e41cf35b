pub mod content;
pub mod domain;
pub mod payment;
pub mod ports;
pub mod profile;
pub mod quota;
pub mod session;

#[cfg(test)]
mod testing;

pub use content::{ContentOrchestrator, RestructureError, RestructureOutcome, RestructureRequest};
pub use domain::{
    AuthSession, BatchResult, BillingDetails, GeneratedContent, InputMode, NewUsageEntry,
    PaymentConfirmation, PaymentIntent, PaymentStatus, PlatformContent, SessionContext,
    UsageAction, UsageHistoryEntry, User,
};
pub use payment::{PaymentOrchestrator, SubscriptionError, SubscriptionOutcome};
pub use ports::{
    AuthService, BatchGenerator, ContentExtractor, HistoryRepository, PaymentError,
    PaymentErrorKind, PaymentGateway, PortError, PortResult, UserRepository,
};
pub use profile::{Profile, ProfileService};
pub use quota::{QuotaDecision, QuotaGate};
pub use session::SessionBootstrap;
