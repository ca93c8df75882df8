// crates/toolmark-server/src/config/file.rs
// File-based configuration from ~/.toolmark/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level config structure
#[derive(Debug, Deserialize, Default)]
pub struct ToolmarkConfig {
    #[serde(default)]
    pub ledger: LedgerFileConfig,
}

/// `[ledger]` section
#[derive(Debug, Deserialize, Default)]
pub struct LedgerFileConfig {
    pub enabled: Option<bool>,
    pub max_file_size_bytes: Option<u64>,
    pub metrics_dir: Option<PathBuf>,
    pub server_name: Option<String>,
}

impl ToolmarkConfig {
    /// Load config from ~/.toolmark/config.toml
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        super::toolmark_home().join("config.toml")
    }
}
