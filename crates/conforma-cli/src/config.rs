//! Configuration management for the CLI
//!
//! Layered TOML configuration: built-in defaults, then the user config at
//! `~/.conforma/config.toml`, then the project config at `.conforma.toml`.
//! An explicit `--config` path bypasses the layering entirely.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Check command settings
    pub check: CheckConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LogConfig,
}

/// Settings for the check command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Normalize the implementation document before comparison
    pub normalize: bool,

    /// Treat warnings as failures
    pub fail_on_warnings: bool,

    /// Classification of untagged base routes: "required" or "optional"
    pub untagged: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration defaults (overridden by -v and environment)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            fail_on_warnings: false,
            untagged: "required".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from the default layered locations
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config.merge(Self::from_file(&user_path)?);
            }
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            config.merge(Self::from_file(&project_path)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific file or the default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Path of the user config file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".conforma").join("config.toml"))
    }

    /// Path of the project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".conforma.toml")
    }

    /// Merge with another config (other takes precedence, per section)
    pub fn merge(&mut self, other: Config) {
        self.check = other.check;
        self.output = other.output;
        self.logging = other.logging;
    }

    /// The configured untagged-route policy
    pub fn untagged_policy(&self) -> conforma_core::UntaggedRoutePolicy {
        if self.check.untagged.eq_ignore_ascii_case("optional") {
            conforma_core::UntaggedRoutePolicy::Optional
        } else {
            conforma_core::UntaggedRoutePolicy::Required
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Look up a dotted configuration key (e.g. `check.normalize`)
    pub fn get_value(&self, key: &str) -> Result<toml::Value> {
        let root = toml::Value::try_from(self)?;
        let mut current = &root;
        for segment in key.split('.') {
            current = current
                .get(segment)
                .ok_or_else(|| Error::config(format!("Unknown configuration key '{}'", key)))?;
        }
        Ok(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.check.normalize);
        assert!(!config.check.fail_on_warnings);
        assert_eq!(config.check.untagged, "required");
        assert_eq!(config.output.format, "human");
        assert_eq!(
            config.untagged_policy(),
            conforma_core::UntaggedRoutePolicy::Required
        );
    }

    #[test]
    fn test_partial_file_fills_with_defaults() {
        let config: Config = toml::from_str(
            r#"
[check]
untagged = "optional"
"#,
        )
        .unwrap();
        assert_eq!(
            config.untagged_policy(),
            conforma_core::UntaggedRoutePolicy::Optional
        );
        // Unset keys in a present section keep their defaults.
        assert!(config.check.normalize);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.check.fail_on_warnings = true;
        config.output.format = "json".to_string();
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert!(loaded.check.fail_on_warnings);
        assert_eq!(loaded.output.format, "json");
    }

    #[test]
    fn test_get_value_by_dotted_key() {
        let config = Config::default();
        let value = config.get_value("check.normalize").unwrap();
        assert_eq!(value, toml::Value::Boolean(true));

        assert!(config.get_value("check.nope").is_err());
    }
}
