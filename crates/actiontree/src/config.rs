use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use actiontree_core::{FetcherConfig, ScanOptions};

/// Settings loaded from an optional TOML file.
///
/// ```toml
/// mirror = "/srv/action-mirror"
///
/// [scan]
/// max_depth = 5
/// fetch_timeout_seconds = 20
///
/// [github]
/// raw_base_url = "https://raw.githubusercontent.com"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Read manifests from a local mirror instead of GitHub
    pub mirror: Option<PathBuf>,
    pub scan: ScanOptions,
    pub github: FetcherConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// File config (or defaults) with environment overrides applied.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.github = config.github.with_env();
        Ok(config)
    }
}
