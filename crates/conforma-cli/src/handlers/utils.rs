//! Shared file loading helpers for command handlers
//!
//! Input files are parsed as JSON or YAML based on their extension.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Parse a JSON or YAML file into the requested type
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "Loading input file");
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        _ => Err(Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON or YAML".to_string(),
        }),
    }
}

/// Write a value as pretty-printed JSON, creating parent directories
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    debug!(path = %path.display(), "Wrote output file");
    Ok(())
}
