#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{Result, ZooError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HISTORY_CAP: usize = 100;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZooConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub relocation: RelocationConfig,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_cap")]
    pub list_cap: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelocationConfig {
    /// Revert the animal's enclosure when the history append fails.
    #[serde(default)]
    pub compensate_on_ledger_failure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_history_cap() -> usize {
    DEFAULT_HISTORY_CAP
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            list_cap: DEFAULT_HISTORY_CAP,
        }
    }
}

impl ZooConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，先替換 ${VAR} 環境變數
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| ZooError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 從環境變數建立配置
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("ZOO_BACKEND_URL").map_err(|_| ZooError::MissingConfig {
            field: "ZOO_BACKEND_URL".to_string(),
        })?;
        let api_key = std::env::var("ZOO_API_KEY").map_err(|_| ZooError::MissingConfig {
            field: "ZOO_API_KEY".to_string(),
        })?;

        let list_cap = match std::env::var("ZOO_HISTORY_CAP") {
            Ok(raw) => raw.parse().map_err(|_| ZooError::InvalidConfigValue {
                field: "ZOO_HISTORY_CAP".to_string(),
                value: raw.clone(),
                reason: "must be a positive integer".to_string(),
            })?,
            Err(_) => DEFAULT_HISTORY_CAP,
        };

        let compensate = std::env::var("ZOO_COMPENSATE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            backend: BackendConfig {
                url,
                api_key,
                timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            },
            history: HistoryConfig { list_cap },
            relocation: RelocationConfig {
                compensate_on_ledger_failure: compensate,
            },
            logging: None,
        })
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ZooError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }
}

impl Validate for ZooConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("backend.url", &self.backend.url)?;
        validation::validate_non_empty_string("backend.api_key", &self.backend.api_key)?;
        if self.backend.api_key.starts_with("${") {
            return Err(ZooError::InvalidConfigValue {
                field: "backend.api_key".to_string(),
                value: self.backend.api_key.clone(),
                reason: "environment variable was not set".to_string(),
            });
        }
        validation::validate_range(
            "backend.timeout_seconds",
            self.backend.timeout_seconds,
            1,
            300,
        )?;
        validation::validate_range("history.list_cap", self.history.list_cap, 1, 1000)?;

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
