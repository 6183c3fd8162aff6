//! Anthropic Messages API backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use worklog_shared::{ProviderConfig, Result};

use super::{ChatBackend, build_client, require_text, send_json};

const NAME: &str = "claude";
const API_VERSION: &str = "2023-06-01";

pub struct ClaudeBackend {
    client: Client,
    config: ProviderConfig,
    api_key: String,
}

impl ClaudeBackend {
    /// Build from config, reading the API key from its env var.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(config.clone(), api_key)
    }

    pub fn with_api_key(config: ProviderConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            config,
            api_key: api_key.into(),
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ChatBackend for ClaudeBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages: [Message {
                role: "user",
                content: user,
            }],
        };

        let request = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let response: MessagesResponse = send_json(NAME, request).await?;
        require_text(
            NAME,
            response
                .content
                .iter()
                .filter(|block| block.kind == "text")
                .map(|block| block.text.as_str()),
        )
    }
}
