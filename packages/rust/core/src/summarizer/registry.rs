//! Name → summarizer factory lookup.

use std::collections::BTreeMap;

use tracing::debug;

use worklog_shared::{LlmConfig, Result, WorklogError};

use super::claude::ClaudeBackend;
use super::gemini::GeminiBackend;
use super::openai::OpenAiBackend;
use super::{ChatSummarizer, Summarizer};

/// Builds a summarizer from the `[llm]` config section.
pub type SummarizerFactory = Box<dyn Fn(&LlmConfig) -> Result<Box<dyn Summarizer>> + Send + Sync>;

/// Registry of summarizer backends, keyed by lowercase name.
pub struct SummarizerRegistry {
    factories: BTreeMap<String, SummarizerFactory>,
}

impl Default for SummarizerRegistry {
    /// Registry with `claude`, `openai` and `gemini`.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("claude", |config| {
            let backend = ClaudeBackend::from_config(&config.claude)?;
            Ok(Box::new(ChatSummarizer::new(Box::new(backend))))
        });
        registry.register("openai", |config| {
            let backend = OpenAiBackend::from_config(&config.openai)?;
            Ok(Box::new(ChatSummarizer::new(Box::new(backend))))
        });
        registry.register("gemini", |config| {
            let backend = GeminiBackend::from_config(&config.gemini)?;
            Ok(Box::new(ChatSummarizer::new(Box::new(backend))))
        });
        registry
    }
}

impl SummarizerRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Add or replace a backend.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&LlmConfig) -> Result<Box<dyn Summarizer>> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.trim().to_lowercase(), Box::new(factory));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the backend registered under `name` (case-insensitive).
    pub fn create(&self, name: &str, config: &LlmConfig) -> Result<Box<dyn Summarizer>> {
        let key = name.trim().to_lowercase();
        let factory = self.factories.get(&key).ok_or_else(|| {
            let known: Vec<&str> = self.names().collect();
            WorklogError::missing_config(format!(
                "llm.provider '{name}' is not one of: {}",
                known.join(", ")
            ))
        })?;
        debug!(provider = %key, "creating summarizer");
        factory(config)
    }

    /// Build the backend the config (or `LLM_PROVIDER`) selects.
    pub fn from_config(&self, config: &LlmConfig) -> Result<Box<dyn Summarizer>> {
        self.create(&config.selected_provider(), config)
    }
}
