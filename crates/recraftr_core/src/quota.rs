//! The daily free-tier gate: every usage entry of the day counts toward it.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use crate::domain::User;
use crate::ports::{HistoryRepository, PortResult};

/// Usage entries a free account may accumulate per UTC day.
pub const DAILY_FREE_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Unlimited,
    Allowed { used: u32 },
    Exceeded { used: u32, limit: u32 },
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, QuotaDecision::Exceeded { .. })
    }
}

#[derive(Clone)]
pub struct QuotaGate {
    history: Arc<dyn HistoryRepository>,
    limit: u32,
}

impl QuotaGate {
    pub fn new(history: Arc<dyn HistoryRepository>) -> Self {
        Self {
            history,
            limit: DAILY_FREE_LIMIT,
        }
    }

    pub async fn check(&self, user: &User, now: DateTime<Utc>) -> PortResult<QuotaDecision> {
        if user.is_premium {
            return Ok(QuotaDecision::Unlimited);
        }

        let used = self
            .history
            .count_since(user.id, start_of_day(now))
            .await?;

        if used >= self.limit {
            Ok(QuotaDecision::Exceeded {
                used,
                limit: self.limit,
            })
        } else {
            Ok(QuotaDecision::Allowed { used })
        }
    }
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .unwrap_or(now)
}
