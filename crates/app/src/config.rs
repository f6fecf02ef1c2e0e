use anyhow::{Context, Result};
use extract::{ExtractionConfig, StrategyKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: ExtractionMode,
    pub extraction: ExtractionConfig,
    pub concurrency: ConcurrencyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    #[default]
    Placeholders, // {field} tokens only
    Organizations, // orgs with role/context, plus dates
    All,
}

impl ExtractionMode {
    pub fn strategies(self) -> Vec<StrategyKind> {
        match self {
            ExtractionMode::Placeholders => vec![StrategyKind::Placeholders],
            ExtractionMode::Organizations => vec![StrategyKind::Organizations],
            ExtractionMode::All => vec![StrategyKind::Placeholders, StrategyKind::Organizations],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub max_concurrent_extractions: usize,
    pub request_timeout_secs: u64,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_extractions: 5,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is not set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Defaults, overlaid with the TOML file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&raw)
            .context(format!("Failed to parse config file: {:?}", path))?;

        if config.concurrency.max_concurrent_extractions == 0 {
            anyhow::bail!("concurrency.max_concurrent_extractions must be at least 1");
        }
        Ok(config)
    }
}
