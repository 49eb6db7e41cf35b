//! crates/recraftr_core/src/content.rs
//!
//! The restructure flow: quota gate, optional link extraction, one audit entry,
//! a single batch-generation call, and reshaping of the reply.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::{InputMode, NewUsageEntry, PlatformContent, SessionContext, UsageAction};
use crate::ports::{BatchGenerator, ContentExtractor, HistoryRepository, PortError};
use crate::quota::{QuotaDecision, QuotaGate};

/// Extracted text shorter than this is treated as a failed extraction.
pub const MIN_EXTRACTED_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct RestructureRequest {
    pub content: String,
    pub mode: InputMode,
    pub targets: Vec<String>,
    pub tone: String,
}

/// Every way the flow can end without a collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestructureOutcome {
    SignInRequired,
    MissingInput,
    QuotaExceeded { used: u32, limit: u32 },
    ExtractionFailed { reason: String },
    Generated(Vec<PlatformContent>),
}

#[derive(Debug, thiserror::Error)]
pub enum RestructureError {
    #[error("Failed to check usage: {0}")]
    Quota(#[source] PortError),
    #[error("Failed to record usage: {0}")]
    History(#[source] PortError),
    #[error("Generation failed: {0}")]
    Generation(#[source] PortError),
}

#[derive(Clone)]
pub struct ContentOrchestrator {
    quota: QuotaGate,
    history: Arc<dyn HistoryRepository>,
    extractor: Arc<dyn ContentExtractor>,
    generator: Arc<dyn BatchGenerator>,
}

impl ContentOrchestrator {
    pub fn new(
        history: Arc<dyn HistoryRepository>,
        extractor: Arc<dyn ContentExtractor>,
        generator: Arc<dyn BatchGenerator>,
    ) -> Self {
        Self {
            quota: QuotaGate::new(history.clone()),
            history,
            extractor,
            generator,
        }
    }

    pub async fn restructure(
        &self,
        session: &SessionContext,
        request: RestructureRequest,
        now: DateTime<Utc>,
    ) -> Result<RestructureOutcome, RestructureError> {
        let Some(user) = session.user() else {
            return Ok(RestructureOutcome::SignInRequired);
        };

        let targets: Vec<String> = request
            .targets
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if request.content.trim().is_empty() || targets.is_empty() {
            return Ok(RestructureOutcome::MissingInput);
        }

        match self
            .quota
            .check(user, now)
            .await
            .map_err(RestructureError::Quota)?
        {
            QuotaDecision::Exceeded { used, limit } => {
                info!("Daily limit reached for user {}", user.id);
                return Ok(RestructureOutcome::QuotaExceeded { used, limit });
            }
            QuotaDecision::Allowed { .. } | QuotaDecision::Unlimited => {}
        }

        let text = if request.mode.is_url() {
            match self.extract(request.content.trim()).await {
                Ok(text) => text,
                Err(reason) => {
                    warn!("Fetch failed: {}", reason);
                    return Ok(RestructureOutcome::ExtractionFailed { reason });
                }
            }
        } else {
            request.content
        };

        self.history
            .append(NewUsageEntry {
                user_id: user.id,
                action: UsageAction::Restructure,
                amount: 1,
                details: format!("Drafted {} from {}", targets.join(", "), request.mode),
            })
            .await
            .map_err(|e| {
                error!("Processing error: {:?}", e);
                RestructureError::History(e)
            })?;

        let batch = self
            .generator
            .generate(&text, &targets, &request.tone)
            .await
            .map_err(|e| {
                error!("Processing error: {:?}", e);
                RestructureError::Generation(e)
            })?;

        let results = batch.into_platform_contents();
        info!("Generated {} result(s) for user {}", results.len(), user.id);
        Ok(RestructureOutcome::Generated(results))
    }

    async fn extract(&self, url: &str) -> Result<String, String> {
        let text = self.extractor.extract(url).await.map_err(|e| e.to_string())?;
        if text.trim().chars().count() < MIN_EXTRACTED_CHARS {
            return Err("Could not extract enough content from URL".to_string());
        }
        Ok(text)
    }
}
