//! Configuration file
//!
//! ```json
//! { "data_dir": "./data", "log_level": "info" }
//! ```
//!
//! `data_dir` is required. `log_level` is one of trace, info, warn, error
//! and defaults to info.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        self.log_severity()?;
        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Parsed `log_level`
    pub fn log_severity(&self) -> CliResult<Severity> {
        match self.log_level.parse::<Severity>() {
            Ok(Severity::Fatal) | Err(_) => Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error.",
                self.log_level
            ))),
            Ok(severity) => Ok(severity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;

    #[test]
    fn test_defaults() {
        let config = Config::from_json(r#"{"data_dir": "/tmp/campus"}"#).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_severity().unwrap(), Severity::Info);
        assert_eq!(config.data_path(), Path::new("/tmp/campus"));
    }

    #[test]
    fn test_log_level() {
        let config = Config::from_json(r#"{"data_dir": "d", "log_level": "warn"}"#).unwrap();
        assert_eq!(config.log_severity().unwrap(), Severity::Warn);

        for bad in ["verbose", "fatal"] {
            let text = format!(r#"{{"data_dir": "d", "log_level": "{}"}}"#, bad);
            let err = Config::from_json(&text).unwrap_err();
            assert_eq!(err.code(), CliErrorCode::ConfigError);
        }
    }

    #[test]
    fn test_missing_data_dir() {
        assert!(Config::from_json("{}").is_err());
        assert!(Config::from_json(r#"{"data_dir": "  "}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/campusdb.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
