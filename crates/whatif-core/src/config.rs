//! Run configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Stage-1 accuracy at or above which a section routes to the hard tier.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct AdaptiveThreshold(f64);

impl AdaptiveThreshold {
    pub const DEFAULT: f64 = 0.50;

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for AdaptiveThreshold {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::ThresholdOutOfRange(value))
        }
    }
}

/// Top-level whatif configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfConfig {
    /// Stage-1 accuracy cut-off in [0, 1].
    #[serde(default = "default_threshold")]
    pub adaptive_threshold: f64,
    /// Output files are written as `<prefix>_impacts.csv` and `<prefix>_summary.json`.
    #[serde(default = "default_output_prefix")]
    pub output_prefix: PathBuf,
    /// Number of report rows carried into the summary.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Output formats to write: "csv", "json".
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_threshold() -> f64 {
    AdaptiveThreshold::DEFAULT
}
fn default_output_prefix() -> PathBuf {
    PathBuf::from("outputs/run")
}
fn default_top_n() -> usize {
    5
}
fn default_formats() -> Vec<String> {
    vec!["csv".into(), "json".into()]
}

impl Default for WhatIfConfig {
    fn default() -> Self {
        Self {
            adaptive_threshold: default_threshold(),
            output_prefix: default_output_prefix(),
            top_n: default_top_n(),
            formats: default_formats(),
        }
    }
}

impl WhatIfConfig {
    /// The configured threshold, validated.
    pub fn threshold(&self) -> Result<AdaptiveThreshold, ConfigError> {
        AdaptiveThreshold::try_from(self.adaptive_threshold)
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `whatif.toml` in the current directory
/// 2. `~/.config/whatif/config.toml`
///
/// `WHATIF_THRESHOLD` overrides the threshold from any file.
pub fn load_config() -> Result<WhatIfConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WhatIfConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("whatif.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => WhatIfConfig::default(),
    };

    if let Ok(raw) = std::env::var("WHATIF_THRESHOLD") {
        config.adaptive_threshold = raw
            .trim()
            .parse()
            .with_context(|| format!("WHATIF_THRESHOLD is not a number: {raw}"))?;
    }

    Ok(config)
}

/// Parse a TOML configuration string.
pub fn parse_config_str(content: &str) -> Result<WhatIfConfig> {
    Ok(toml::from_str::<WhatIfConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("whatif"))
}
