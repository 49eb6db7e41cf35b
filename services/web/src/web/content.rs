//! services/web/src/web/content.rs
//!
//! The restructure endpoint behind the landing page's workspace.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::Utc;
use recraftr_core::domain::{InputMode, PlatformContent, SessionContext};
use recraftr_core::{RestructureOutcome, RestructureRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::state::AppState;

//=========================================================================================
// API Payload Structs
//=========================================================================================

#[derive(Debug, Clone, Copy, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputModeDto {
    #[default]
    Text,
    Article,
    Youtube,
}

impl From<InputModeDto> for InputMode {
    fn from(mode: InputModeDto) -> Self {
        match mode {
            InputModeDto::Text => InputMode::Text,
            InputModeDto::Article => InputMode::Article,
            InputModeDto::Youtube => InputMode::Youtube,
        }
    }
}

fn default_tone() -> String {
    "professional".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestructureBody {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mode: InputModeDto,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default = "default_tone")]
    pub tone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformResult {
    pub platform: String,
    pub content: String,
}

impl From<PlatformContent> for PlatformResult {
    fn from(result: PlatformContent) -> Self {
        Self {
            platform: result.platform,
            content: result.content,
        }
    }
}

/// Tagged by `status` so the workspace script can branch on it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RestructureResponse {
    Generated {
        results: Vec<PlatformResult>,
    },
    SignInRequired {
        message: String,
        redirect: String,
    },
    MissingInput {
        message: String,
    },
    QuotaExceeded {
        message: String,
        used: u32,
        limit: u32,
        redirect: String,
    },
    ExtractionFailed {
        message: String,
    },
}

impl RestructureResponse {
    fn status_code(&self) -> StatusCode {
        match self {
            RestructureResponse::Generated { .. } => StatusCode::OK,
            RestructureResponse::SignInRequired { .. } => StatusCode::UNAUTHORIZED,
            RestructureResponse::MissingInput { .. } => StatusCode::BAD_REQUEST,
            RestructureResponse::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            RestructureResponse::ExtractionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<RestructureOutcome> for RestructureResponse {
    fn from(outcome: RestructureOutcome) -> Self {
        match outcome {
            RestructureOutcome::Generated(results) => RestructureResponse::Generated {
                results: results.into_iter().map(PlatformResult::from).collect(),
            },
            RestructureOutcome::SignInRequired => RestructureResponse::SignInRequired {
                message: "Join Recraftr to create your content. Sign in now?".to_string(),
                redirect: "/login".to_string(),
            },
            RestructureOutcome::MissingInput => RestructureResponse::MissingInput {
                message: "Add some content and pick at least one format.".to_string(),
            },
            RestructureOutcome::QuotaExceeded { used, limit } => {
                RestructureResponse::QuotaExceeded {
                    message: format!(
                        "Daily creative limit reached ({}/{}).\n\nUnlock unlimited ideas with the Pro Writer plan?",
                        used.min(limit),
                        limit
                    ),
                    used,
                    limit,
                    redirect: "/payment".to_string(),
                }
            }
            RestructureOutcome::ExtractionFailed { reason } => {
                RestructureResponse::ExtractionFailed {
                    message: format!(
                        "We couldn't read that link directly ({}).\n\nTry pasting the text content instead!",
                        reason
                    ),
                }
            }
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Turn a draft, article or video link into content for several platforms.
#[utoipa::path(
    post,
    path = "/api/restructure",
    request_body = RestructureBody,
    responses(
        (status = 200, description = "Content generated", body = RestructureResponse),
        (status = 400, description = "Missing content or formats", body = RestructureResponse),
        (status = 401, description = "Sign in required", body = RestructureResponse),
        (status = 422, description = "Link could not be read", body = RestructureResponse),
        (status = 429, description = "Daily free limit reached", body = RestructureResponse),
        (status = 500, description = "Generation failed")
    )
)]
pub async fn restructure_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<RestructureBody>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let request = RestructureRequest {
        content: body.content,
        mode: body.mode.into(),
        targets: body.targets,
        tone: body.tone,
    };

    let outcome = state
        .content
        .restructure(&session, request, Utc::now())
        .await
        .map_err(|e| {
            error!("Processing error: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Something went wrong: {}", e),
            )
        })?;

    let response = RestructureResponse::from(outcome);
    Ok((response.status_code(), Json(response)))
}
