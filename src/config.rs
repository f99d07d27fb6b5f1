//! Configuration loading and management for farefinder.
//!
//! Loads settings from `farefinder.toml` with environment variable overrides for
//! the provider API keys. The file itself is optional; the keys are not.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FIRECRAWL_KEY_VAR: &str = "FIRECRAWL_API_KEY";
pub const GROQ_KEY_VAR: &str = "GROQ_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key: set {0}")]
    MissingApiKey(&'static str),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Web search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    /// Maximum number of flight results per cycle
    pub limit: usize,
    /// Timeout handed to the provider, in milliseconds
    pub timeout_ms: u64,
}

/// Which page fetcher backs deep search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScraperBackend {
    #[default]
    Firecrawl,
    Direct,
}

/// Page scraping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub backend: ScraperBackend,
    pub base_url: String,
    /// How old a cached copy the provider may hand back, in milliseconds
    pub max_age_ms: u64,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub base_url: String,
    /// Model identifier (e.g., "moonshotai/kimi-k2-instruct")
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// System persona for the summarizer
    pub persona: String,
}

/// API keys configuration (loaded from environment)
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub firecrawl_key: Option<String>,
    #[serde(default)]
    pub groq_key: Option<String>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("ApiConfig")
            .field("firecrawl_key", &redact(&self.firecrawl_key))
            .field("groq_key", &redact(&self.groq_key))
            .finish()
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from an explicit path, or the default locations
    /// (farefinder.toml in cwd or home). Missing files fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::read_file(path)?,
            None => match Self::find_config_file() {
                Some(path) => Self::read_file(&path)?,
                None => Config::default(),
            },
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override API keys from environment variables
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(FIRECRAWL_KEY_VAR) {
            self.api.firecrawl_key = Some(key);
        }
        if let Ok(key) = std::env::var(GROQ_KEY_VAR) {
            self.api.groq_key = Some(key);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from("farefinder.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?
            .join(".config")
            .join("farefinder")
            .join("farefinder.toml");
        home_config.exists().then_some(home_config)
    }

    /// Reject values the providers would only fail on later, and refuse to
    /// start without both credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.limit == 0 {
            return Err(invalid("search.limit", "must be greater than zero"));
        }
        if self.summarizer.max_tokens == 0 {
            return Err(invalid("summarizer.max_tokens", "must be greater than zero"));
        }
        if !(0.0..=2.0).contains(&self.summarizer.temperature) {
            return Err(invalid(
                "summarizer.temperature",
                format!("{} is outside [0, 2]", self.summarizer.temperature),
            ));
        }
        for (field, base) in [
            ("search.base_url", &self.search.base_url),
            ("scraper.base_url", &self.scraper.base_url),
            ("summarizer.base_url", &self.summarizer.base_url),
        ] {
            url::Url::parse(base).map_err(|e| invalid(field, e.to_string()))?;
        }

        self.firecrawl_key()?;
        self.groq_key()?;
        Ok(())
    }

    pub fn firecrawl_key(&self) -> Result<&str, ConfigError> {
        non_blank(self.api.firecrawl_key.as_deref())
            .ok_or(ConfigError::MissingApiKey(FIRECRAWL_KEY_VAR))
    }

    pub fn groq_key(&self) -> Result<&str, ConfigError> {
        non_blank(self.api.groq_key.as_deref()).ok_or(ConfigError::MissingApiKey(GROQ_KEY_VAR))
    }
}

fn non_blank(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.trim().is_empty())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.firecrawl.dev".to_string(),
            limit: 5,
            timeout_ms: 30_000,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            backend: ScraperBackend::Firecrawl,
            base_url: "https://api.firecrawl.dev".to_string(),
            max_age_ms: 3_600_000,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "moonshotai/kimi-k2-instruct".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            persona: "You are a helpful assistant.".to_string(),
        }
    }
}
