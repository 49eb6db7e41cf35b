pub mod auth;
pub mod boundary;
pub mod content;
pub mod middleware;
pub mod pages;
pub mod payment;
pub mod profile;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the router builder so the binary and the integration tests
// share one definition of the route table.
pub use router::build_router;
pub use state::{AppState, Ports};
