//! services/web/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use recraftr_core::ports::{
    AuthService, BatchGenerator, ContentExtractor, HistoryRepository, PaymentGateway,
    UserRepository,
};
use recraftr_core::{ContentOrchestrator, PaymentOrchestrator, ProfileService, SessionBootstrap};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<dyn AuthService>,
    pub session: SessionBootstrap,
    pub content: ContentOrchestrator,
    pub payments: PaymentOrchestrator,
    pub profiles: ProfileService,
}

/// The collaborators every screen is built from.
pub struct Ports {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub extractor: Arc<dyn ContentExtractor>,
    pub generator: Arc<dyn BatchGenerator>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Wires the orchestrators over the given ports.
    pub fn new(config: Arc<Config>, ports: Ports) -> Self {
        let Ports {
            auth,
            users,
            history,
            extractor,
            generator,
            payments,
        } = ports;

        Self {
            session: SessionBootstrap::new(auth.clone()),
            content: ContentOrchestrator::new(history.clone(), extractor, generator),
            payments: PaymentOrchestrator::new(
                payments,
                users.clone(),
                history.clone(),
                config.payment_dev_bypass,
            ),
            profiles: ProfileService::new(users, history),
            auth,
            config,
        }
    }
}
