//! Resolves the identity attached to a request.

use std::sync::Arc;
use tracing::warn;

use crate::domain::SessionContext;
use crate::ports::AuthService;

#[derive(Clone)]
pub struct SessionBootstrap {
    auth: Arc<dyn AuthService>,
}

impl SessionBootstrap {
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        Self { auth }
    }

    /// Turns an optional session token into a `SessionContext`.
    ///
    /// Lookup failures are logged and reported as `Absent`; they never fail the request.
    pub async fn resolve(&self, token: Option<&str>) -> SessionContext {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionContext::Absent;
        };

        match self.auth.current_user(token).await {
            Ok(Some(user)) => SessionContext::Present(user),
            Ok(None) => SessionContext::Absent,
            Err(e) => {
                warn!("User init error: {:?}", e);
                SessionContext::Absent
            }
        }
    }
}
