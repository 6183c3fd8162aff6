//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use worklog_shared::{ProviderConfig, Result};

use super::{ChatBackend, build_client, require_text, send_json};

const NAME: &str = "gemini";

pub struct GeminiBackend {
    client: Client,
    config: ProviderConfig,
    api_key: String,
}

impl GeminiBackend {
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
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part { text: system }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: user }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
            },
        };

        let request = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        let response: GenerateResponse = send_json(NAME, request).await?;
        let parts = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or(&[]);

        require_text(NAME, parts.iter().map(|part| part.text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use worklog_shared::WorklogError;

    fn backend(server: &MockServer) -> GeminiBackend {
        let config = ProviderConfig {
            base_url: server.uri(),
            ..ProviderConfig::gemini()
        };
        GeminiBackend::with_api_key(config, "g-key").unwrap()
    }

    #[tokio::test]
    async fn posts_to_model_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "sys"}]},
                "contents": [{"role": "user", "parts": [{"text": "user"}]}],
                "generationConfig": {"maxOutputTokens": 2000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "월간 "}, {"text": "요약"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = backend(&server).complete("sys", "user").await.unwrap();
        assert_eq!(reply, "월간 요약");
    }

    #[tokio::test]
    async fn blocked_candidate_is_summarizer_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let err = backend(&server).complete("s", "u").await.unwrap_err();
        assert!(matches!(err, WorklogError::Summarizer(_)));
    }
}
