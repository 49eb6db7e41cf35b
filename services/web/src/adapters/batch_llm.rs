//! services/web/src/adapters/batch_llm.rs
//!
//! This module contains the adapter for the batch content generator.
//! It implements the `BatchGenerator` port from the `core` crate with a single
//! chat completion that returns one JSON object keyed by platform.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use recraftr_core::{
    domain::{BatchResult, GeneratedContent},
    ports::{BatchGenerator, PortError, PortResult},
};
use serde_json::Value;
use tracing::warn;

const SYSTEM_INSTRUCTIONS: &str = r#"You are an editorial assistant that repurposes source material for several publishing platforms at once.

Reply with ONE JSON object and nothing else:
- Use exactly the requested platform names as keys, in the order they were requested.
- Each value is either a string, or an array of strings when the platform is naturally split into parts (for example a thread of posts).
- Write in the requested tone. Keep facts from the source; do not invent statistics or quotes."#;

/// Builds the user message. Targets, tone and text are inserted verbatim.
fn user_input(text: &str, targets: &[String], tone: &str) -> String {
    format!(
        "PLATFORMS: {}\nTONE: {}\n\nSOURCE:\n---\n{}\n---",
        targets.join(", "),
        tone,
        text
    )
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `BatchGenerator` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiBatchAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBatchAdapter {
    /// Creates a new `OpenAiBatchAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Removes a surrounding Markdown code fence, if the model added one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses the generator's JSON reply into an ordered `BatchResult`.
pub fn parse_batch_reply(raw: &str) -> PortResult<BatchResult> {
    let object = match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            return Err(PortError::Unexpected(
                "Generation reply was not a JSON object.".to_string(),
            ))
        }
        Err(e) => {
            return Err(PortError::Unexpected(format!(
                "Generation reply was not valid JSON: {}",
                e
            )))
        }
    };

    let mut entries = Vec::with_capacity(object.len());
    for (platform, value) in object {
        let content = match value {
            Value::String(text) => GeneratedContent::Text(text),
            Value::Array(items) => GeneratedContent::Parts(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(text) => text,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            other => {
                return Err(PortError::Unexpected(format!(
                    "Unsupported content for '{}': {}",
                    platform, other
                )))
            }
        };
        entries.push((platform, content));
    }

    if entries.is_empty() {
        return Err(PortError::Unexpected(
            "Generation reply contained no platforms.".to_string(),
        ));
    }
    Ok(BatchResult::new(entries))
}

//=========================================================================================
// `BatchGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl BatchGenerator for OpenAiBatchAdapter {
    async fn generate(
        &self,
        text: &str,
        targets: &[String],
        tone: &str,
    ) -> PortResult<BatchResult> {
        let user_input = user_input(text, targets, tone);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Generation LLM returned no text content.".to_string())
            })?;

        let batch = parse_batch_reply(&content)?;
        let missing: Vec<&String> = targets
            .iter()
            .filter(|t| !batch.entries.iter().any(|(platform, _)| platform == *t))
            .collect();
        if !missing.is_empty() {
            warn!("Generation reply is missing platforms: {:?}", missing);
        }
        Ok(batch)
    }
}
