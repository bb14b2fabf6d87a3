//! Service configuration.
//!
//! Loaded from a YAML file, then overridden by `COGNILENS_*` environment
//! variables (`__` separates nested keys, e.g. `COGNILENS_LLM__MODEL`).

mod env;

use crate::compression::CompressionStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub use env::{ENV_NESTED_DELIMITER, ENV_PREFIX};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "COGNILENS_CONFIG";
/// Config file used when `COGNILENS_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "mock")]
    Mock,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "lexora")]
    Lexora,
}

impl Provider {
    /// Lowercase ID used in config files.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Mock => "mock",
            Provider::OpenAi => "openai",
            Provider::Lexora => "lexora",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Spirrow-Cognilens".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8003,
        }
    }
}

/// Smart model selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartSelectionConfig {
    pub enabled: bool,
    /// Ask the gateway's classifier before falling back to capability lookup.
    pub classify_tasks: bool,
    /// Report the style's capability on default selections.
    pub fallback_to_default: bool,
    pub cache_ttl_seconds: u64,
    /// Style name → capability tag.
    pub strategy_capability_map: BTreeMap<String, String>,
}

impl Default for SmartSelectionConfig {
    fn default() -> Self {
        let strategy_capability_map = [
            ("concise", "summarization"),
            ("detailed", "summarization"),
            ("bullet", "summarization"),
            ("code_aware", "code"),
            ("diff", "reasoning"),
        ]
        .into_iter()
        .map(|(style, capability)| (style.to_string(), capability.to_string()))
        .collect();

        Self {
            enabled: false,
            classify_tasks: true,
            fallback_to_default: true,
            cache_ttl_seconds: crate::provider::DEFAULT_CACHE_TTL_SECS,
            strategy_capability_map,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub max_retries: u32,
    pub smart_selection: SmartSelectionConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Mock,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: None,
            timeout: 30,
            max_retries: 3,
            smart_selection: SmartSelectionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub default_ratio: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            default_ratio: 0.3,
            min_ratio: 0.1,
            max_ratio: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationConfig {
    pub default_max_tokens: usize,
    pub default_style: String,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            default_max_tokens: 500,
            default_style: "concise".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub compression: CompressionConfig,
    pub summarization: SummarizationConfig,
}

impl Config {
    /// Load from `COGNILENS_CONFIG` (or `./config.yaml`) plus the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self::from_yaml(&path)
    }

    /// Load a YAML file (defaults when missing) with process environment overrides.
    pub fn from_yaml(path: &Path) -> Result<Self, ConfigError> {
        Self::from_yaml_with_env(path, std::env::vars())
    }

    /// Like [`Config::from_yaml`] with an explicit set of environment variables.
    pub fn from_yaml_with_env<I>(path: &Path, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut root = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_yaml::from_str::<serde_yaml::Value>(&content)?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            serde_yaml::Value::Null
        };

        env::apply_overrides(&mut root, vars);

        let config: Config = if root.is_null() {
            Config::default()
        } else {
            serde_yaml::from_value(root)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Mock-provider configuration for tests and local runs.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            llm: LlmConfig {
                provider: Provider::Mock,
                ..LlmConfig::default()
            },
            ..Self::default()
        }
    }

    /// Check value ranges and style names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("compression.default_ratio", self.compression.default_ratio, 0.1, 0.9),
            ("compression.min_ratio", self.compression.min_ratio, 0.05, 0.5),
            ("compression.max_ratio", self.compression.max_ratio, 0.5, 1.0),
        ];
        for (field, value, min, max) in ratios {
            if !(min..=max).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: format!("must be between {min} and {max}"),
                });
            }
        }

        let style = &self.summarization.default_style;
        if CompressionStyle::from_str(style).is_err() {
            return Err(unknown_style("summarization.default_style", style));
        }
        for style in self.llm.smart_selection.strategy_capability_map.keys() {
            if CompressionStyle::from_str(style).is_err() {
                return Err(unknown_style(
                    "llm.smart_selection.strategy_capability_map",
                    style,
                ));
            }
        }

        Ok(())
    }
}

fn unknown_style(field: &str, style: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: style.to_string(),
        reason: "unknown compression style".to_string(),
    }
}
