// crates/toolmark-server/src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const ENV_METRICS_ENABLED: &str = "TOOLMARK_METRICS_ENABLED";
pub const ENV_METRICS_MAX_FILE_SIZE: &str = "TOOLMARK_METRICS_MAX_FILE_SIZE";
pub const ENV_METRICS_DIR: &str = "TOOLMARK_METRICS_DIR";
pub const ENV_SERVER_NAME: &str = "TOOLMARK_SERVER_NAME";
pub const ENV_PROJECT_ROOT: &str = "TOOLMARK_PROJECT_ROOT";

/// Configuration validation result
#[derive(Debug)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Environment configuration - all env vars in one place.
///
/// Every field is optional so that unset variables fall through to the
/// config file and then to built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Ledger on/off switch (TOOLMARK_METRICS_ENABLED)
    pub metrics_enabled: Option<bool>,
    /// Invocation ledger size cap in bytes (TOOLMARK_METRICS_MAX_FILE_SIZE)
    pub max_file_size: Option<u64>,
    /// Directory holding ledger files (TOOLMARK_METRICS_DIR)
    pub metrics_dir: Option<PathBuf>,
    /// Server identifier used to name ledger files (TOOLMARK_SERVER_NAME)
    pub server_name: Option<String>,
    /// Project root for project-scoped styles (TOOLMARK_PROJECT_ROOT)
    pub project_root: Option<PathBuf>,
    /// Raw values that failed to parse, kept for validation
    pub(crate) invalid: Vec<(&'static str, String)>,
}

impl EnvConfig {
    /// Load all environment configuration (call once at startup)
    pub fn load() -> Self {
        info!("Loading environment configuration");
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut invalid = Vec::new();

        let metrics_enabled = read(ENV_METRICS_ENABLED).and_then(|v| {
            let parsed = parse_bool(&v);
            if parsed.is_none() {
                warn!(value = %v, "Unrecognized {}, ignoring", ENV_METRICS_ENABLED);
                invalid.push((ENV_METRICS_ENABLED, v));
            }
            parsed
        });

        let max_file_size = read(ENV_METRICS_MAX_FILE_SIZE).and_then(|v| {
            match v.trim().parse::<u64>() {
                Ok(0) | Err(_) => {
                    warn!(value = %v, "Invalid {}, ignoring", ENV_METRICS_MAX_FILE_SIZE);
                    invalid.push((ENV_METRICS_MAX_FILE_SIZE, v));
                    None
                }
                Ok(bytes) => Some(bytes),
            }
        });

        let config = Self {
            metrics_enabled,
            max_file_size,
            metrics_dir: read(ENV_METRICS_DIR).map(PathBuf::from),
            server_name: read(ENV_SERVER_NAME).map(|s| s.trim().to_string()),
            project_root: read(ENV_PROJECT_ROOT).map(PathBuf::from),
            invalid,
        };

        if let Some(bytes) = config.max_file_size {
            debug!(bytes, "Custom ledger size cap configured");
        }
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        for (name, value) in &self.invalid {
            validation.add_warning(format!("Ignoring {}='{}': could not parse value", name, value));
        }

        if let Some(ref name) = self.server_name
            && !is_valid_server_name(name)
        {
            validation.add_error(format!(
                "{} '{}' must not contain path separators",
                ENV_SERVER_NAME, name
            ));
        }

        if let Some(ref root) = self.project_root
            && !root.is_dir()
        {
            validation.add_warning(format!(
                "{} '{}' is not a directory",
                ENV_PROJECT_ROOT,
                root.display()
            ));
        }

        if self.metrics_enabled == Some(false) {
            validation.add_warning("Ledger disabled: tool calls and issue reports will not be recorded");
        }

        validation
    }
}

/// Server names become file names, so they may not escape the metrics dir
pub fn is_valid_server_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> EnvConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_empty_env() {
        let config = env_from(&[]);
        assert!(config.metrics_enabled.is_none());
        assert!(config.max_file_size.is_none());
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_disable_metrics() {
        let config = env_from(&[(ENV_METRICS_ENABLED, "false")]);
        assert_eq!(config.metrics_enabled, Some(false));
        let validation = config.validate();
        assert!(validation.is_valid());
        assert_eq!(validation.warnings.len(), 1);
    }

    #[test]
    fn test_max_file_size_override() {
        let config = env_from(&[(ENV_METRICS_MAX_FILE_SIZE, "2048")]);
        assert_eq!(config.max_file_size, Some(2048));
    }

    #[test]
    fn test_invalid_max_file_size_is_warning() {
        let config = env_from(&[(ENV_METRICS_MAX_FILE_SIZE, "lots")]);
        assert!(config.max_file_size.is_none());
        let validation = config.validate();
        assert!(validation.is_valid());
        assert!(validation.warnings[0].contains(ENV_METRICS_MAX_FILE_SIZE));
    }

    #[test]
    fn test_zero_max_file_size_rejected() {
        let config = env_from(&[(ENV_METRICS_MAX_FILE_SIZE, "0")]);
        assert!(config.max_file_size.is_none());
    }

    #[test]
    fn test_server_name_with_separator_is_error() {
        let config = env_from(&[(ENV_SERVER_NAME, "../escape")]);
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = env_from(&[(ENV_SERVER_NAME, "   "), (ENV_METRICS_DIR, "")]);
        assert!(config.server_name.is_none());
        assert!(config.metrics_dir.is_none());
    }

    #[test]
    fn test_report_ok() {
        assert_eq!(ConfigValidation::new().report(), "Configuration OK");
    }
}
