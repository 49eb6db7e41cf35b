//! In-memory ports and a router builder shared by the HTTP tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use recraftr_core::domain::{
    AuthSession, BatchResult, BillingDetails, GeneratedContent, NewUsageEntry,
    PaymentConfirmation, PaymentIntent, PaymentStatus, UsageAction, UsageHistoryEntry, User,
};
use recraftr_core::ports::{
    AuthService, BatchGenerator, ContentExtractor, HistoryRepository, PaymentError,
    PaymentErrorKind, PaymentGateway, PortError, PortResult, UserRepository,
};
use recraftr_web::config::Config;
use recraftr_web::web::{build_router, AppState, Ports};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TOKEN: &str = "test-token";

pub fn test_config(bypass: bool) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgres://localhost/recraftr_test".to_string()),
        ("STRIPE_PUBLISHABLE_KEY", "pk_test_123".to_string()),
        ("PAYMENT_DEV_BYPASS", bypass.to_string()),
        ("COOKIE_SECURE", "false".to_string()),
    ]);
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
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

pub fn with_session(builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder.header("cookie", format!("session={}", TOKEN))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    with_session(Request::builder().method(method).uri(uri))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

//=========================================================================================
// Ports
//=========================================================================================

#[derive(Default)]
pub struct MemoryAuth {
    sessions: Mutex<HashMap<String, User>>,
    accounts: Mutex<HashMap<String, (String, User)>>,
}

#[async_trait]
impl AuthService for MemoryAuth {
    async fn current_user(&self, token: &str) -> PortResult<Option<User>> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn register(&self, email: &str, password: &str) -> PortResult<AuthSession> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(PortError::Conflict(email.to_string()));
        }
        let user = User {
            email: email.to_string(),
            ..free_user()
        };
        accounts.insert(email.to_string(), (password.to_string(), user.clone()));
        Ok(self.open_session(user))
    }

    async fn login(&self, email: &str, password: &str) -> PortResult<AuthSession> {
        let account = self.accounts.lock().unwrap().get(email).cloned();
        match account {
            Some((stored, user)) if stored == password => Ok(self.open_session(user)),
            _ => Err(PortError::InvalidCredentials),
        }
    }

    async fn login_with_google(&self, _id_token: &str) -> PortResult<AuthSession> {
        Err(PortError::Unauthorized)
    }

    async fn logout(&self, token: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }
}

impl MemoryAuth {
    fn open_session(&self, user: User) -> AuthSession {
        let token = Uuid::new_v4().to_string();
        let session = AuthSession {
            token: token.clone(),
            user_id: user.id,
            expires_at: Utc::now() + chrono::Duration::days(30),
        };
        self.sessions.lock().unwrap().insert(token, user);
        session
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUsers {
    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        self.get(user_id)
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))
    }

    async fn set_premium(&self, user_id: Uuid, is_premium: bool) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))?;
        user.is_premium = is_premium;
        Ok(())
    }

    async fn set_credits(&self, user_id: Uuid, credits: i64) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))?;
        user.credits = Some(credits);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<UsageHistoryEntry>>,
}

impl MemoryHistory {
    pub fn seed(&self, user_id: Uuid, action: UsageAction, count: usize) {
        let mut entries = self.entries.lock().unwrap();
        for _ in 0..count {
            entries.push(UsageHistoryEntry {
                id: Uuid::new_v4(),
                user_id,
                action,
                amount: 1,
                details: "seeded".to_string(),
                created_at: Utc::now(),
            });
        }
    }

    pub fn actions(&self) -> Vec<UsageAction> {
        self.entries.lock().unwrap().iter().map(|e| e.action).collect()
    }
}

#[async_trait]
impl HistoryRepository for MemoryHistory {
    async fn append(&self, entry: NewUsageEntry) -> PortResult<UsageHistoryEntry> {
        let stored = UsageHistoryEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            amount: entry.amount,
            details: entry.details,
            created_at: Utc::now(),
        };
        self.entries.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> PortResult<u32> {
        let count = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id && e.created_at >= since)
            .count();
        Ok(count as u32)
    }

    async fn list_recent(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<UsageHistoryEntry>> {
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.reverse();
        entries.truncate(limit as usize);
        Ok(entries)
    }
}

pub struct StaticExtractor(pub String);

#[async_trait]
impl ContentExtractor for StaticExtractor {
    async fn extract(&self, _url: &str) -> PortResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct RecordingGenerator {
    calls: Mutex<usize>,
}

impl RecordingGenerator {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BatchGenerator for RecordingGenerator {
    async fn generate(
        &self,
        _text: &str,
        targets: &[String],
        _tone: &str,
    ) -> PortResult<BatchResult> {
        *self.calls.lock().unwrap() += 1;
        let entries = targets
            .iter()
            .map(|target| {
                if target == "twitter" {
                    (
                        target.clone(),
                        GeneratedContent::Parts(vec!["a".to_string(), "b".to_string()]),
                    )
                } else {
                    (target.clone(), GeneratedContent::Text(format!("{} draft", target)))
                }
            })
            .collect();
        Ok(BatchResult::new(entries))
    }
}

/// Panics on every call, standing in for a fault deep inside a request.
pub struct PanickingGenerator;

#[async_trait]
impl BatchGenerator for PanickingGenerator {
    async fn generate(
        &self,
        _text: &str,
        _targets: &[String],
        _tone: &str,
    ) -> PortResult<BatchResult> {
        panic!("generator exploded")
    }
}

pub struct ScriptedGateway {
    intent_error: Option<PaymentError>,
    status: PaymentStatus,
}

impl ScriptedGateway {
    pub fn succeeding() -> Self {
        Self {
            intent_error: None,
            status: PaymentStatus::Succeeded,
        }
    }

    pub fn with_status(status: PaymentStatus) -> Self {
        Self {
            intent_error: None,
            status,
        }
    }

    pub fn failing(kind: PaymentErrorKind, message: &str) -> Self {
        Self {
            intent_error: Some(PaymentError::new(kind, message)),
            status: PaymentStatus::Succeeded,
        }
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_intent(&self, _amount_cents: i64) -> Result<PaymentIntent, PaymentError> {
        if let Some(err) = &self.intent_error {
            return Err(err.clone());
        }
        Ok(PaymentIntent {
            id: "pi_123".to_string(),
            client_secret: "pi_123_secret_456".to_string(),
        })
    }

    async fn confirm(
        &self,
        intent: &PaymentIntent,
        _payment_method_id: &str,
        _billing: &BillingDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        Ok(PaymentConfirmation {
            intent_id: intent.id.clone(),
            status: self.status.clone(),
        })
    }
}

//=========================================================================================
// App
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub auth: Arc<MemoryAuth>,
    pub users: Arc<MemoryUsers>,
    pub history: Arc<MemoryHistory>,
    pub generator: Arc<RecordingGenerator>,
}

pub struct Setup {
    /// Signed in as this user when requests carry `TOKEN`.
    pub user: Option<User>,
    pub bypass: bool,
    pub gateway: ScriptedGateway,
    pub extracted: String,
    /// Swap the generator for one that panics.
    pub generator_panics: bool,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            user: None,
            bypass: false,
            gateway: ScriptedGateway::succeeding(),
            extracted: "An article body that is comfortably longer than fifty characters."
                .to_string(),
            generator_panics: false,
        }
    }
}

impl TestApp {
    pub fn new(setup: Setup) -> Self {
        let auth = Arc::new(MemoryAuth::default());
        let users = Arc::new(MemoryUsers::default());
        if let Some(user) = setup.user {
            auth.sessions.lock().unwrap().insert(TOKEN.to_string(), user.clone());
            users.users.lock().unwrap().insert(user.id, user);
        }
        let history = Arc::new(MemoryHistory::default());
        let generator = Arc::new(RecordingGenerator::default());
        let generator_port: Arc<dyn BatchGenerator> = if setup.generator_panics {
            Arc::new(PanickingGenerator)
        } else {
            generator.clone()
        };

        let state = AppState::new(
            Arc::new(test_config(setup.bypass)),
            Ports {
                auth: auth.clone(),
                users: users.clone(),
                history: history.clone(),
                extractor: Arc::new(StaticExtractor(setup.extracted)),
                generator: generator_port,
                payments: Arc::new(setup.gateway),
            },
        );

        Self {
            router: build_router(Arc::new(state)),
            auth,
            users,
            history,
            generator,
        }
    }

    pub fn signed_in(user: User) -> Self {
        Self::new(Setup {
            user: Some(user),
            ..Setup::default()
        })
    }

    pub fn anonymous() -> Self {
        Self::new(Setup::default())
    }
}
