// crates/toolmark-server/src/config/mod.rs
// Configuration and shared constants

pub mod env;
pub mod file;

pub use env::{ConfigValidation, EnvConfig};
pub use file::ToolmarkConfig;

use std::path::PathBuf;

/// Default invocation ledger cap: 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Server identifier used when none is configured
pub const DEFAULT_SERVER_NAME: &str = "toolmark";

/// Directory under ~/.toolmark holding ledger files
pub const METRICS_DIR_NAME: &str = "metrics";

/// ~/.toolmark, falling back to the working directory without a home
pub fn toolmark_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".toolmark")
}

/// Effective ledger settings after layering env over file over defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    pub enabled: bool,
    pub server_name: String,
    pub metrics_dir: PathBuf,
    pub max_file_size: u64,
}

impl LedgerSettings {
    pub fn resolve(env: &EnvConfig, file: &ToolmarkConfig) -> Self {
        let ledger = &file.ledger;
        Self {
            enabled: env.metrics_enabled.or(ledger.enabled).unwrap_or(true),
            server_name: env
                .server_name
                .clone()
                .or_else(|| ledger.server_name.clone())
                .filter(|name| env::is_valid_server_name(name))
                .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
            metrics_dir: env
                .metrics_dir
                .clone()
                .or_else(|| ledger.metrics_dir.clone())
                .unwrap_or_else(|| toolmark_home().join(METRICS_DIR_NAME)),
            max_file_size: env
                .max_file_size
                .or(ledger.max_file_size_bytes.filter(|b| *b > 0))
                .unwrap_or(DEFAULT_MAX_FILE_SIZE),
        }
    }

    /// Settings rooted at an explicit directory, used by tests and tooling
    pub fn in_dir(metrics_dir: impl Into<PathBuf>, server_name: &str) -> Self {
        Self {
            enabled: true,
            server_name: server_name.to_string(),
            metrics_dir: metrics_dir.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// `<metrics_dir>/<server>.json`
    pub fn metrics_path(&self) -> PathBuf {
        self.metrics_dir.join(format!("{}.json", self.server_name))
    }

    /// `<metrics_dir>/<server>.issues.json`
    pub fn issues_path(&self) -> PathBuf {
        self.metrics_dir
            .join(format!("{}.issues.json", self.server_name))
    }
}
