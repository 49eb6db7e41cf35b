//! services/web/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `UserRepository` and `HistoryRepository` ports from the `core` crate.
//! It also stores the credentials and login sessions used by the auth adapter.
//! It handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recraftr_core::domain::{NewUsageEntry, UsageAction, UsageHistoryEntry, User};
use recraftr_core::ports::{HistoryRepository, PortError, PortResult, UserRepository};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the persistence ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "id, email, name, avatar_url, is_premium, credits";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    name: Option<String>,
    avatar_url: Option<String>,
    is_premium: bool,
    credits: Option<i64>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            avatar_url: self.avatar_url,
            is_premium: self.is_premium,
            credits: self.credits,
        }
    }
}

/// Only used internally for login - contains sensitive data.
#[derive(FromRow)]
pub struct CredentialsRecord {
    pub id: Uuid,
    pub hashed_password: Option<String>,
}

const HISTORY_COLUMNS: &str = "id, user_id, action, amount, details, created_at";

#[derive(FromRow)]
struct UsageHistoryRecord {
    id: Uuid,
    user_id: Uuid,
    action: String,
    amount: i64,
    details: String,
    created_at: DateTime<Utc>,
}
impl UsageHistoryRecord {
    fn to_domain(self) -> PortResult<UsageHistoryEntry> {
        let action = UsageAction::parse(&self.action).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown usage action '{}'", self.action))
        })?;
        Ok(UsageHistoryEntry {
            id: self.id,
            user_id: self.user_id,
            action,
            amount: self.amount,
            details: self.details,
            created_at: self.created_at,
        })
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

//=========================================================================================
// Account and Login Session Storage (used by the auth adapter)
//=========================================================================================

impl DbAdapter {
    pub async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let query = format!(
            "INSERT INTO users (id, email, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(hashed_password)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PortError::Conflict(format!("User {} already exists", email))
                } else {
                    unexpected(e)
                }
            })?;
        Ok(record.to_domain())
    }

    pub async fn get_credentials_by_email(&self, email: &str) -> PortResult<CredentialsRecord> {
        sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })
    }

    /// Returns the account linked to a Google subject, linking or creating it on first use.
    pub async fn upsert_google_user(
        &self,
        google_sub: &str,
        email: &str,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> PortResult<User> {
        let query = format!(
            "INSERT INTO users (id, email, name, avatar_url, google_sub) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO UPDATE SET google_sub = EXCLUDED.google_sub, \
             name = COALESCE(users.name, EXCLUDED.name), \
             avatar_url = COALESCE(users.avatar_url, EXCLUDED.avatar_url) \
             RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(name)
            .bind(avatar_url)
            .bind(google_sub)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    pub async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    /// Returns the user of a live session, or `None` when it is unknown or expired.
    pub async fn user_for_session(&self, token: &str) -> PortResult<Option<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE id = \
             (SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW())",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    pub async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `UserRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserRepository for DbAdapter {
    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("User {} not found", user_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn set_premium(&self, user_id: Uuid, is_premium: bool) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET is_premium = $1 WHERE id = $2")
            .bind(is_premium)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn set_credits(&self, user_id: Uuid, credits: i64) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET credits = $1 WHERE id = $2")
            .bind(credits)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `HistoryRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl HistoryRepository for DbAdapter {
    async fn append(&self, entry: NewUsageEntry) -> PortResult<UsageHistoryEntry> {
        let query = format!(
            "INSERT INTO usage_history (id, user_id, action, amount, details) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            HISTORY_COLUMNS
        );
        let record = sqlx::query_as::<_, UsageHistoryRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(entry.user_id)
            .bind(entry.action.as_str())
            .bind(entry.amount)
            .bind(&entry.details)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }

    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> PortResult<u32> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM usage_history WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn list_recent(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<UsageHistoryEntry>> {
        let query = format!(
            "SELECT {} FROM usage_history WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            HISTORY_COLUMNS
        );
        let records = sqlx::query_as::<_, UsageHistoryRecord>(&query)
            .bind(user_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
