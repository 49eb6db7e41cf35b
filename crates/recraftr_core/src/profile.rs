//! Profile screen data and the credit top-up action.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{NewUsageEntry, UsageAction, UsageHistoryEntry, User};
use crate::ports::{HistoryRepository, PortError, PortResult, UserRepository};

/// Number of history entries shown on the profile screen.
pub const HISTORY_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user: User,
    pub history: Vec<UsageHistoryEntry>,
}

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    history: Arc<dyn HistoryRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, history: Arc<dyn HistoryRepository>) -> Self {
        Self { users, history }
    }

    /// Loads the user's recent history. A history failure still yields a profile.
    pub async fn load(&self, user: &User) -> Profile {
        let history = match self.history.list_recent(user.id, HISTORY_PAGE_SIZE).await {
            Ok(entries) => entries
                .into_iter()
                .filter(|entry| entry.user_id == user.id)
                .collect(),
            Err(e) => {
                warn!("Failed to load history: {:?}", e);
                Vec::new()
            }
        };

        Profile {
            user: user.clone(),
            history,
        }
    }

    pub async fn buy_credits(&self, user: &User, amount: i64) -> PortResult<User> {
        if amount <= 0 {
            return Err(PortError::Unexpected(format!(
                "Credit amount must be positive, got {}",
                amount
            )));
        }

        let new_credits = user.credits.unwrap_or(0) + amount;
        self.users.set_credits(user.id, new_credits).await?;
        self.history
            .append(NewUsageEntry {
                user_id: user.id,
                action: UsageAction::BuyCredits,
                amount,
                details: format!("Purchased {} credits", amount),
            })
            .await?;

        info!("User {} now has {} credits", user.id, new_credits);
        Ok(User {
            credits: Some(new_credits),
            ..user.clone()
        })
    }
}
