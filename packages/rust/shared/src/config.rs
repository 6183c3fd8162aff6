//! Application configuration for the worklog tools.
//!
//! User config lives at `~/.worklog/worklog.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorklogError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "worklog.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".worklog";

/// Env var that overrides `[llm] provider`.
const PROVIDER_ENV: &str = "LLM_PROVIDER";

// ---------------------------------------------------------------------------
// Config structs (matching worklog.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the document store lives.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Collection keys for each tier. A file without this section leaves
    /// every key unset.
    #[serde(default = "CollectionsConfig::unset")]
    pub collections: CollectionsConfig,

    /// Summarization backend settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Rollup behaviour switches.
    #[serde(default)]
    pub rollup: RollupConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; a leading `~/` is expanded to the home directory.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> String {
    "~/.worklog/worklog.db".into()
}

impl StorageConfig {
    /// Resolve the configured path, expanding `~/`.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match self.path.strip_prefix("~/") {
            Some(rest) => {
                let home = dirs::home_dir().ok_or_else(|| {
                    WorklogError::config("could not determine home directory")
                })?;
                Ok(home.join(rest))
            }
            None => Ok(PathBuf::from(&self.path)),
        }
    }
}

/// `[collections]` section.
///
/// A loaded file that omits a key leaves it unset; the built-in default
/// (used when no file exists) sets all three.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_logs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_achievements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_highlights: Option<String>,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            daily_logs: Some("daily_logs".into()),
            weekly_achievements: Some("weekly_achievements".into()),
            monthly_highlights: Some("monthly_highlights".into()),
        }
    }
}

impl CollectionsConfig {
    /// No collection configured.
    pub fn unset() -> Self {
        Self {
            daily_logs: None,
            weekly_achievements: None,
            monthly_highlights: None,
        }
    }

    pub fn daily_logs(&self) -> Result<&str> {
        require(self.daily_logs.as_deref(), "collections.daily_logs")
    }

    pub fn weekly_achievements(&self) -> Result<&str> {
        require(
            self.weekly_achievements.as_deref(),
            "collections.weekly_achievements",
        )
    }

    pub fn monthly_highlights(&self) -> Result<&str> {
        require(
            self.monthly_highlights.as_deref(),
            "collections.monthly_highlights",
        )
    }
}

fn require<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WorklogError::missing_config(key)),
    }
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Backend name looked up in the summarizer registry.
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "ProviderConfig::claude")]
    pub claude: ProviderConfig,

    #[serde(default = "ProviderConfig::openai")]
    pub openai: ProviderConfig,

    #[serde(default = "ProviderConfig::gemini")]
    pub gemini: ProviderConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            claude: ProviderConfig::claude(),
            openai: ProviderConfig::openai(),
            gemini: ProviderConfig::gemini(),
        }
    }
}

fn default_provider() -> String {
    "claude".into()
}

impl LlmConfig {
    /// Provider name after applying the `LLM_PROVIDER` override, lowercased.
    pub fn selected_provider(&self) -> String {
        std::env::var(PROVIDER_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.provider.clone())
            .trim()
            .to_lowercase()
    }
}

/// Per-provider settings (`[llm.claude]`, `[llm.openai]`, `[llm.gemini]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the env var holding the API key (never store the key itself).
    pub api_key_env: String,
    pub model: String,
    pub base_url: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    2000
}

impl ProviderConfig {
    pub fn claude() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".into(),
            model: "claude-sonnet-4-20250514".into(),
            base_url: "https://api.anthropic.com".into(),
            max_tokens: default_max_tokens(),
        }
    }

    pub fn openai() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".into(),
            model: "gpt-4o".into(),
            base_url: "https://api.openai.com".into(),
            max_tokens: default_max_tokens(),
        }
    }

    pub fn gemini() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".into(),
            model: "gemini-2.0-flash".into(),
            base_url: "https://generativelanguage.googleapis.com".into(),
            max_tokens: default_max_tokens(),
        }
    }

    /// Read the API key from the configured env var.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(val) if !val.trim().is_empty() => Ok(val),
            _ => Err(WorklogError::missing_config(format!(
                "API key env var {}",
                self.api_key_env
            ))),
        }
    }
}

/// `[rollup]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Skip a rollup when an aggregate with the same period label already exists.
    #[serde(default)]
    pub guard_duplicates: bool,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.worklog/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| WorklogError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.worklog/worklog.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WorklogError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WorklogError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WorklogError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WorklogError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WorklogError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
