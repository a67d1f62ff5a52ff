//! Configuration management for natalprobe

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::NatalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Region hierarchy asset (province -> city -> district)
    pub regions_path: PathBuf,

    /// Local secrets store consulted when a variable is not in the environment
    pub secrets_path: PathBuf,

    /// Log file (the terminal belongs to the UI)
    pub log_file: PathBuf,

    /// Natal chart API settings
    pub chart: ChartConfig,

    /// LLM providers, one response column each, in display order
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Natal chart endpoint URL
    pub endpoint: String,

    /// Access token (can be a secret reference like $XINGPAN_ACCESS_TOKEN)
    pub access_token: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Timezone offset sent with the birthday
    pub tz: String,

    /// House system code
    pub house_system: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Column title
    pub label: String,

    /// OpenAI-compatible API base URL
    pub endpoint: String,

    /// API key (can be a secret reference like $OPENAI_API_KEY)
    pub api_key: String,

    /// Model to use (can be a secret reference too)
    pub model: String,

    /// Optional request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let app_config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("natalprobe");
        let app_cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("natalprobe");

        Self {
            regions_path: PathBuf::from("region.json"),
            secrets_path: app_config_dir.join("secrets.toml"),
            log_file: app_cache_dir.join("natalprobe.log"),
            chart: ChartConfig {
                endpoint: "http://www.xingpan.vip/astrology/chart/natal".to_string(),
                access_token: "$XINGPAN_ACCESS_TOKEN".to_string(),
                timeout_secs: 60,
                tz: "8.00".to_string(),
                house_system: "P".to_string(),
            },
            providers: vec![
                ProviderConfig {
                    label: "gpt4o".to_string(),
                    endpoint: "https://api.openai.com/v1".to_string(),
                    api_key: "$OPENAI_API_KEY".to_string(),
                    model: "gpt-4o".to_string(),
                    timeout_secs: None,
                },
                ProviderConfig {
                    label: "glm4".to_string(),
                    endpoint: "https://open.bigmodel.cn/api/paas/v4".to_string(),
                    api_key: "$ZHIPU_API_KEY".to_string(),
                    model: "glm-4-0520".to_string(),
                    timeout_secs: None,
                },
                ProviderConfig {
                    label: "doubao-pro".to_string(),
                    endpoint: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
                    api_key: "$ARK_API_KEY".to_string(),
                    model: "$ARK_MODEL_ENDPOINT".to_string(),
                    timeout_secs: None,
                },
            ],
        }
    }
}

impl Config {
    /// Load config from file or create default
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_path(),
        };

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("natalprobe")
            .join("config.toml")
    }

    fn validate(&self) -> std::result::Result<(), NatalError> {
        if self.providers.is_empty() {
            return Err(NatalError::Config(
                "at least one [[providers]] entry is required".to_string(),
            ));
        }
        if self.chart.timeout_secs == 0 {
            return Err(NatalError::Config(
                "chart.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Flat key/value store used when a variable is missing from the environment
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Load the store; a missing file is an empty store
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            tracing::debug!("No secrets store at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let values: HashMap<String, String> = toml::from_str(&content)
            .map_err(|e| NatalError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self { values })
    }

    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Environment first, then the store
    pub fn lookup(&self, key: &str) -> crate::error::Result<String> {
        if let Ok(value) = std::env::var(key) {
            return Ok(value);
        }
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| NatalError::MissingSecret(key.to_string()))
    }

    /// Resolve a config value, following `$NAME` references
    pub fn resolve(&self, value: &str) -> crate::error::Result<String> {
        match value.strip_prefix('$') {
            Some(key) => self.lookup(key),
            None if value.is_empty() => Err(NatalError::Config(
                "empty value where a credential was expected".to_string(),
            )),
            None => Ok(value.to_string()),
        }
    }
}
