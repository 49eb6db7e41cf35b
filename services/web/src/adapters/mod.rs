pub mod auth;
pub mod batch_llm;
pub mod db;
pub mod extractor;
pub mod payment;

pub use auth::PasswordAuthAdapter;
pub use batch_llm::OpenAiBatchAdapter;
pub use db::DbAdapter;
pub use extractor::HttpContentExtractor;
pub use payment::HttpPaymentGateway;
