//! In-memory fakes of every port, shared by the unit tests of this crate.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::{
    AuthSession, BatchResult, BillingDetails, NewUsageEntry, PaymentConfirmation, PaymentIntent,
    PaymentStatus, UsageAction, UsageHistoryEntry, User,
};
use crate::ports::{
    AuthService, BatchGenerator, ContentExtractor, HistoryRepository, PaymentError,
    PaymentGateway, PortError, PortResult, UserRepository,
};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 9, 15, 30, 0).unwrap()
}

pub fn free_user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "writer@example.com".to_string(),
        name: Some("Writer".to_string()),
        avatar_url: None,
        is_premium: false,
        credits: None,
    }
}

pub fn premium_user() -> User {
    User {
        is_premium: true,
        ..free_user()
    }
}

/// Ordered record of collaborator calls, shared between fakes.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

//=========================================================================================
// Auth
//=========================================================================================

#[derive(Default)]
pub struct FakeAuth {
    sessions: Mutex<HashMap<String, User>>,
    fail: bool,
    lookups: Mutex<usize>,
}

impl FakeAuth {
    pub fn with_session(token: &str, user: User) -> Self {
        let auth = Self::default();
        auth.sessions.lock().unwrap().insert(token.to_string(), user);
        auth
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn current_user(&self, token: &str) -> PortResult<Option<User>> {
        *self.lookups.lock().unwrap() += 1;
        if self.fail {
            return Err(PortError::Unexpected("auth backend down".to_string()));
        }
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn register(&self, _email: &str, _password: &str) -> PortResult<AuthSession> {
        Err(PortError::Unexpected("not used".to_string()))
    }

    async fn login(&self, _email: &str, _password: &str) -> PortResult<AuthSession> {
        Err(PortError::InvalidCredentials)
    }

    async fn login_with_google(&self, _id_token: &str) -> PortResult<AuthSession> {
        Err(PortError::Unauthorized)
    }

    async fn logout(&self, token: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }
}

//=========================================================================================
// Persistence
//=========================================================================================

#[derive(Default)]
pub struct FakeUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl FakeUsers {
    pub fn with(user: User) -> Self {
        let users = Self::default();
        users.users.lock().unwrap().insert(user.id, user);
        users
    }

    pub fn get(&self, user_id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&user_id).cloned()
    }

    fn update(&self, user_id: Uuid, apply: impl FnOnce(&mut User)) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        apply(user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeUsers {
    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        self.get(user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn set_premium(&self, user_id: Uuid, is_premium: bool) -> PortResult<()> {
        self.update(user_id, |u| u.is_premium = is_premium)
    }

    async fn set_credits(&self, user_id: Uuid, credits: i64) -> PortResult<()> {
        self.update(user_id, |u| u.credits = Some(credits))
    }
}

#[derive(Default)]
pub struct FakeHistory {
    log: CallLog,
    seeded: Mutex<Vec<UsageHistoryEntry>>,
    appended: Mutex<Vec<UsageHistoryEntry>>,
    count_calls: Mutex<usize>,
    fail: bool,
}

impl FakeHistory {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn seed_today(&self, user: &User, action: UsageAction, n: usize) {
        self.seed_at(user, action, n, fixed_now());
    }

    pub fn seed_at(&self, user: &User, action: UsageAction, n: usize, at: DateTime<Utc>) {
        let mut seeded = self.seeded.lock().unwrap();
        for _ in 0..n {
            seeded.push(UsageHistoryEntry {
                id: Uuid::new_v4(),
                user_id: user.id,
                action,
                amount: 1,
                details: "seeded".to_string(),
                created_at: at,
            });
        }
    }

    pub fn appended(&self) -> Vec<UsageHistoryEntry> {
        self.appended.lock().unwrap().clone()
    }

    pub fn count_calls(&self) -> usize {
        *self.count_calls.lock().unwrap()
    }
}

#[async_trait]
impl HistoryRepository for FakeHistory {
    async fn append(&self, entry: NewUsageEntry) -> PortResult<UsageHistoryEntry> {
        self.log.push("append");
        if self.fail {
            return Err(PortError::Unexpected("store down".to_string()));
        }
        let stored = UsageHistoryEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            amount: entry.amount,
            details: entry.details,
            created_at: fixed_now(),
        };
        self.appended.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> PortResult<u32> {
        self.log.push("count");
        *self.count_calls.lock().unwrap() += 1;
        if self.fail {
            return Err(PortError::Unexpected("store down".to_string()));
        }
        let seeded = self.seeded.lock().unwrap();
        let appended = self.appended.lock().unwrap();
        let count = seeded
            .iter()
            .chain(appended.iter())
            .filter(|e| e.user_id == user_id && e.created_at >= since)
            .count();
        Ok(count as u32)
    }

    async fn list_recent(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<UsageHistoryEntry>> {
        if self.fail {
            return Err(PortError::Unexpected("store down".to_string()));
        }
        let seeded = self.seeded.lock().unwrap();
        let appended = self.appended.lock().unwrap();
        Ok(appended
            .iter()
            .rev()
            .chain(seeded.iter().rev())
            .filter(|e| e.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

//=========================================================================================
// Extraction and generation
//=========================================================================================

pub struct FakeExtractor {
    log: CallLog,
    result: Result<String, String>,
    calls: Mutex<usize>,
}

impl FakeExtractor {
    pub fn new(log: CallLog, result: Result<String, String>) -> Self {
        Self {
            log,
            result,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ContentExtractor for FakeExtractor {
    async fn extract(&self, _url: &str) -> PortResult<String> {
        self.log.push("extract");
        *self.calls.lock().unwrap() += 1;
        self.result.clone().map_err(PortError::Unexpected)
    }
}

pub struct FakeGenerator {
    log: CallLog,
    result: Result<BatchResult, String>,
    calls: Mutex<usize>,
    last_text: Mutex<Option<String>>,
}

impl FakeGenerator {
    pub fn new(log: CallLog, result: Result<BatchResult, String>) -> Self {
        Self {
            log,
            result,
            calls: Mutex::new(0),
            last_text: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchGenerator for FakeGenerator {
    async fn generate(
        &self,
        text: &str,
        _targets: &[String],
        _tone: &str,
    ) -> PortResult<BatchResult> {
        self.log.push("generate");
        *self.calls.lock().unwrap() += 1;
        *self.last_text.lock().unwrap() = Some(text.to_string());
        self.result.clone().map_err(PortError::Unexpected)
    }
}

//=========================================================================================
// Payments
//=========================================================================================

pub struct FakeGateway {
    intent: Result<PaymentIntent, PaymentError>,
    status: PaymentStatus,
    created: Mutex<Vec<i64>>,
    confirmed: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn succeeding(intent_id: &str) -> Self {
        Self::with_status(intent_id, PaymentStatus::Succeeded)
    }

    pub fn with_status(intent_id: &str, status: PaymentStatus) -> Self {
        Self {
            intent: Ok(PaymentIntent {
                id: intent_id.to_string(),
                client_secret: format!("{}_secret_abc", intent_id),
            }),
            status,
            created: Mutex::new(Vec::new()),
            confirmed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_intent(error: PaymentError) -> Self {
        Self {
            intent: Err(error),
            status: PaymentStatus::Succeeded,
            created: Mutex::new(Vec::new()),
            confirmed: Mutex::new(Vec::new()),
        }
    }

    pub fn created_amounts(&self) -> Vec<i64> {
        self.created.lock().unwrap().clone()
    }

    pub fn confirmed_methods(&self) -> Vec<String> {
        self.confirmed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_intent(&self, amount_cents: i64) -> Result<PaymentIntent, PaymentError> {
        self.created.lock().unwrap().push(amount_cents);
        self.intent.clone()
    }

    async fn confirm(
        &self,
        intent: &PaymentIntent,
        payment_method_id: &str,
        _billing: &BillingDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        self.confirmed
            .lock()
            .unwrap()
            .push(payment_method_id.to_string());
        Ok(PaymentConfirmation {
            intent_id: intent.id.clone(),
            status: self.status.clone(),
        })
    }
}
