//! OpenAI Chat Completions backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use worklog_shared::{ProviderConfig, Result};

use super::{ChatBackend, build_client, require_text, send_json};

const NAME: &str = "openai";

pub struct OpenAiBackend {
    client: Client,
    config: ProviderConfig,
    api_key: String,
}

impl OpenAiBackend {
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
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = ChatRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let request = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatResponse = send_json(NAME, request).await?;
        require_text(
            NAME,
            response
                .choices
                .first()
                .and_then(|choice| choice.message.content.as_deref()),
        )
    }
}
