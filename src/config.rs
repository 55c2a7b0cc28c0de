use crate::defaults;
use crate::error::{Result, TrsuError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub assistant: AssistantConfig,
    pub chunking: ChunkingConfig,
    pub polling: PollingConfig,
}

/// Assistant API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Assistant persona configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    pub model: String,
    pub name: String,
    pub instructions: String,
}

/// Transcript chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub token_limit: usize,
    pub tokenizer_model: String,
}

/// Run status polling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    /// Zero means poll until the run reaches a terminal state.
    pub max_polls: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: defaults::ASSISTANT_MODEL.to_string(),
            name: defaults::ASSISTANT_NAME.to_string(),
            instructions: defaults::ASSISTANT_INSTRUCTIONS.to_string(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            token_limit: defaults::TOKEN_LIMIT,
            tokenizer_model: defaults::TOKENIZER_MODEL.to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: defaults::POLL_INTERVAL_MS,
            max_polls: defaults::MAX_POLLS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_polls(&self) -> Option<u32> {
        (self.max_polls > 0).then_some(self.max_polls)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(TrsuError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TRSU_MODEL → assistant.model
    /// - TRSU_TOKEN_LIMIT → chunking.token_limit
    /// - TRSU_API_BASE → api.base_url
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(model) = std::env::var("TRSU_MODEL")
            && !model.is_empty()
        {
            self.assistant.model = model;
        }

        if let Ok(limit) = std::env::var("TRSU_TOKEN_LIMIT")
            && !limit.is_empty()
        {
            self.chunking.token_limit =
                limit
                    .trim()
                    .parse()
                    .map_err(|e| TrsuError::ConfigInvalidValue {
                        key: "TRSU_TOKEN_LIMIT".to_string(),
                        message: format!("{e}"),
                    })?;
        }

        if let Ok(base) = std::env::var("TRSU_API_BASE")
            && !base.is_empty()
        {
            self.api.base_url = base;
        }

        Ok(self)
    }

    /// Reject values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.token_limit == 0 {
            return Err(TrsuError::ConfigInvalidValue {
                key: "chunking.token_limit".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.polling.interval_ms == 0 {
            return Err(TrsuError::ConfigInvalidValue {
                key: "polling.interval_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(TrsuError::ConfigInvalidValue {
                key: "api.timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.api.base_url.trim().is_empty() {
            return Err(TrsuError::ConfigInvalidValue {
                key: "api.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/trsu/config.toml on Linux, or `None` when the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trsu").join("config.toml"))
    }
}

/// Read the API credential from the first non-empty variable in
/// [`defaults::API_KEY_VARS`].
pub fn api_key_from_env() -> Result<String> {
    defaults::API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or_else(|| TrsuError::MissingApiKey {
            vars: defaults::API_KEY_VARS.join(", "),
        })
}
