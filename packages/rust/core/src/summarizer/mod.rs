//! Language-model summarization of enriched records.
//!
//! The pipeline only sees the [`Summarizer`] trait. [`ChatSummarizer`] is the
//! shipped implementation: it formats records into a prompt, sends it through
//! a [`ChatBackend`] (Claude, OpenAI or Gemini over HTTP), and splits the
//! reply into the tier's two fields.

pub mod claude;
pub mod gemini;
pub mod openai;
pub mod prompt;
pub mod registry;
pub mod sections;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use worklog_shared::{EnrichedRecord, Result, WorklogError};

pub use registry::SummarizerRegistry;

// ---------------------------------------------------------------------------
// Summary shapes
// ---------------------------------------------------------------------------

/// Weekly rollup summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySummary {
    /// Resume-style bullet points; becomes the weekly record's body.
    pub bullet_points: String,
    /// Three-line highlight; stored as the `Key Highlights` property.
    pub key_highlights: String,
    /// Unmodified model output.
    pub raw_response: String,
}

/// Monthly rollup summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySummary {
    pub summary: String,
    pub career_brief: String,
    pub raw_response: String,
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Reduces enriched records into a tier-specific summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    async fn summarize_weekly(&self, daily_logs: &[EnrichedRecord]) -> Result<WeeklySummary>;

    async fn summarize_monthly(&self, weeks: &[EnrichedRecord]) -> Result<MonthlySummary>;
}

/// A single-turn chat completion endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Send one system + user exchange and return the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Chat summarizer
// ---------------------------------------------------------------------------

/// [`Summarizer`] over any [`ChatBackend`]. One backend call per summary.
pub struct ChatSummarizer {
    backend: Box<dyn ChatBackend>,
}

impl ChatSummarizer {
    pub fn new(backend: Box<dyn ChatBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    fn name(&self) -> &str {
        self.backend.name()
    }

    #[instrument(skip_all, fields(backend = self.backend.name(), logs = daily_logs.len()))]
    async fn summarize_weekly(&self, daily_logs: &[EnrichedRecord]) -> Result<WeeklySummary> {
        let user = prompt::weekly_user_prompt(daily_logs);
        let raw = self
            .backend
            .complete(prompt::WEEKLY_SYSTEM_PROMPT, &user)
            .await?;
        let (bullet_points, key_highlights) = sections::split(&raw, &sections::WEEKLY);
        debug!(chars = raw.len(), "weekly summary received");
        Ok(WeeklySummary {
            bullet_points,
            key_highlights,
            raw_response: raw,
        })
    }

    #[instrument(skip_all, fields(backend = self.backend.name(), weeks = weeks.len()))]
    async fn summarize_monthly(&self, weeks: &[EnrichedRecord]) -> Result<MonthlySummary> {
        let user = prompt::monthly_user_prompt(weeks);
        let raw = self
            .backend
            .complete(prompt::MONTHLY_SYSTEM_PROMPT, &user)
            .await?;
        let (summary, career_brief) = sections::split(&raw, &sections::MONTHLY);
        debug!(chars = raw.len(), "monthly summary received");
        Ok(MonthlySummary {
            summary,
            career_brief,
            raw_response: raw,
        })
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers shared by the providers
// ---------------------------------------------------------------------------

const USER_AGENT: &str = concat!("worklog/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Build a reqwest client for provider calls.
pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| WorklogError::Network(format!("failed to build HTTP client: {e}")))
}

/// Send a request and decode a JSON body. Non-2xx is a summarizer error.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| WorklogError::Network(format!("{provider}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(WorklogError::Summarizer(format!(
            "{provider}: HTTP {status}: {}",
            body.trim()
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| WorklogError::Summarizer(format!("{provider}: unexpected response: {e}")))
}

/// Join text parts; a reply with no text at all is an error.
pub(crate) fn require_text<'a>(
    provider: &str,
    parts: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let text: String = parts.into_iter().collect();
    if text.trim().is_empty() {
        return Err(WorklogError::Summarizer(format!(
            "{provider}: response contained no text"
        )));
    }
    Ok(text)
}
