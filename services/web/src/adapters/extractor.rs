//! services/web/src/adapters/extractor.rs
//!
//! Fetches article and video pages and reduces their HTML to readable text.
//! It implements the `ContentExtractor` port from the `core` crate.

use async_trait::async_trait;
use recraftr_core::ports::{ContentExtractor, PortError, PortResult};
use regex::Regex;
use tracing::info;

/// Upper bound on the text handed to the generator.
const MAX_EXTRACTED_CHARS: usize = 20_000;

/// Bytes of a page read before the rest is dropped.
const MAX_DOWNLOAD_BYTES: usize = 2 * 1024 * 1024;

pub struct HttpContentExtractor {
    http: reqwest::Client,
    blocks: Regex,
    tags: Regex,
    whitespace: Regex,
}

impl HttpContentExtractor {
    pub fn new(http: reqwest::Client) -> Result<Self, regex::Error> {
        Ok(Self {
            http,
            blocks: Regex::new(
                r"(?is)<(script|style|noscript|svg|head|nav|footer)\b.*?</(script|style|noscript|svg|head|nav|footer)>",
            )?,
            tags: Regex::new(r"(?s)<[^>]*>")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Strips markup from an HTML document and collapses whitespace.
    pub fn html_to_text(&self, html: &str) -> String {
        let without_blocks = self.blocks.replace_all(html, " ");
        let without_tags = self.tags.replace_all(&without_blocks, " ");
        let decoded = decode_entities(&without_tags);
        let text = self.whitespace.replace_all(&decoded, " ");
        text.trim().chars().take(MAX_EXTRACTED_CHARS).collect()
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Reads at most `limit` bytes of the body. Pages that declare a larger
/// `Content-Length` are refused before any of the body is read.
async fn read_bounded(mut response: reqwest::Response, limit: usize) -> PortResult<String> {
    let declared = response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if let Some(declared) = declared {
        if declared > limit as u64 {
            return Err(PortError::Unexpected(format!(
                "Page is too large ({} bytes)",
                declared
            )));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
    {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn validate_url(url: &str) -> PortResult<reqwest::Url> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| PortError::Unexpected(format!("Invalid link: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(PortError::Unexpected(format!(
            "Unsupported link scheme '{}'",
            other
        ))),
    }
}

#[async_trait]
impl ContentExtractor for HttpContentExtractor {
    async fn extract(&self, url: &str) -> PortResult<String> {
        let url = validate_url(url)?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Unexpected(format!("HTTP {}", status)));
        }

        let body = read_bounded(response, MAX_DOWNLOAD_BYTES).await?;
        let text = self.html_to_text(&body);
        info!("Extracted {} characters from {}", text.chars().count(), url);
        Ok(text)
    }
}
