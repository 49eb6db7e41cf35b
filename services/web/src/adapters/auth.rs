//! services/web/src/adapters/auth.rs
//!
//! The default auth collaborator: email/password accounts hashed with argon2,
//! Google sign-in through Google's token verification endpoint, and 30-day
//! login sessions stored by the database adapter.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use recraftr_core::domain::{AuthSession, User};
use recraftr_core::ports::{AuthService, PortError, PortResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::adapters::db::DbAdapter;

/// Lifetime of a login session.
pub const SESSION_DAYS: i64 = 30;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Clone)]
pub struct PasswordAuthAdapter {
    db: Arc<DbAdapter>,
    http: reqwest::Client,
    google_client_id: Option<String>,
}

impl PasswordAuthAdapter {
    pub fn new(
        db: Arc<DbAdapter>,
        http: reqwest::Client,
        google_client_id: Option<String>,
    ) -> Self {
        Self {
            db,
            http,
            google_client_id,
        }
    }

    async fn open_session(&self, user_id: Uuid) -> PortResult<AuthSession> {
        let session = AuthSession {
            token: Uuid::new_v4().to_string(),
            user_id,
            expires_at: Utc::now() + Duration::days(SESSION_DAYS),
        };
        self.db
            .create_auth_session(&session.token, session.user_id, session.expires_at)
            .await?;
        Ok(session)
    }
}

/// The subset of Google's tokeninfo reply we rely on.
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleTokenInfo {
    /// Checks the audience and that Google verified the address.
    fn validate(self, client_id: &str) -> PortResult<GoogleTokenInfo> {
        if self.aud != client_id {
            return Err(PortError::Unauthorized);
        }
        let verified = self.email_verified.as_deref() == Some("true");
        if !verified || self.email.as_deref().map_or(true, str::is_empty) {
            return Err(PortError::Unauthorized);
        }
        Ok(self)
    }
}

pub fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            PortError::Unexpected("Failed to hash password".to_string())
        })
}

pub fn verify_password(password: &str, hashed: &str) -> PortResult<bool> {
    let parsed_hash = PasswordHash::new(hashed).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        PortError::Unexpected("Authentication error".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[async_trait]
impl AuthService for PasswordAuthAdapter {
    async fn current_user(&self, token: &str) -> PortResult<Option<User>> {
        self.db.user_for_session(token).await
    }

    async fn register(&self, email: &str, password: &str) -> PortResult<AuthSession> {
        let password_hash = hash_password(password)?;
        let user = self.db.create_user_with_email(email, &password_hash).await?;
        info!("Registered user {}", user.id);
        self.open_session(user.id).await
    }

    async fn login(&self, email: &str, password: &str) -> PortResult<AuthSession> {
        let credentials = match self.db.get_credentials_by_email(email).await {
            Ok(credentials) => credentials,
            Err(PortError::NotFound(_)) => return Err(PortError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        // Accounts created through Google have no password.
        let Some(hashed) = credentials.hashed_password.as_deref() else {
            return Err(PortError::InvalidCredentials);
        };
        if !verify_password(password, hashed)? {
            return Err(PortError::InvalidCredentials);
        }

        self.open_session(credentials.id).await
    }

    async fn login_with_google(&self, id_token: &str) -> PortResult<AuthSession> {
        let client_id = self
            .google_client_id
            .as_deref()
            .ok_or_else(|| PortError::Unexpected("Google sign-in is not configured".to_string()))?;

        let response = self
            .http
            .get(GOOGLE_TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PortError::Unauthorized);
        }
        let info = response
            .json::<GoogleTokenInfo>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .validate(client_id)?;

        let email = info.email.as_deref().unwrap_or_default();
        let user = self
            .db
            .upsert_google_user(&info.sub, email, info.name.as_deref(), info.picture.as_deref())
            .await?;
        self.open_session(user.id).await
    }

    async fn logout(&self, token: &str) -> PortResult<()> {
        self.db.delete_auth_session(token).await
    }
}
