//! Handler for config management commands
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use crate::cli::{
    ConfigAction, ConfigArgs, ConfigFormat, ConfigGetArgs, ConfigInitArgs, ConfigSetArgs,
    ConfigShowArgs,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::PathBuf;
use tracing::instrument;

/// Dispatch a config subcommand
#[instrument(skip_all)]
pub fn handle_config(args: &ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match &args.action {
        ConfigAction::Init(init_args) => handle_init(init_args, output),
        ConfigAction::Show(show_args) => handle_show(show_args, config, output),
        ConfigAction::Get(get_args) => handle_get(get_args, config, output),
        ConfigAction::Set(set_args) => handle_set(set_args, output),
    }
}

/// Write default configuration files
fn handle_init(args: &ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    // Without an explicit target, initialize the project config.
    let mut targets: Vec<PathBuf> = Vec::new();
    if args.user {
        let path = Config::user_config_path()
            .ok_or_else(|| Error::config("Cannot determine home directory"))?;
        targets.push(path);
    }
    if args.project || !args.user {
        targets.push(Config::project_config_path());
    }

    for path in targets {
        if path.exists() && !args.force {
            return Err(Error::config(format!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }
        Config::default().save(&path)?;
        output.success(&format!("Created config file: {}", path.display()))?;
    }

    Ok(())
}

/// Show the effective configuration
fn handle_show(args: &ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let rendered = match args.format {
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    output.writeln(rendered.trim_end())
}

/// Print a single configuration value by dotted key
fn handle_get(args: &ConfigGetArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let value = config.get_value(&args.key)?;
    let rendered = match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    };
    output.writeln(&rendered)
}

/// Update one key in the project (or user) config file
fn handle_set(args: &ConfigSetArgs, output: &mut OutputWriter) -> Result<()> {
    let path = if args.user {
        Config::user_config_path().ok_or_else(|| Error::config("Cannot determine home directory"))?
    } else {
        Config::project_config_path()
    };

    let mut config = if path.exists() {
        Config::from_file(&path)?
    } else {
        Config::default()
    };
    apply_value(&mut config, &args.key, &args.value)?;
    config.save(&path)?;

    output.success(&format!(
        "Set {} = {} in {}",
        args.key,
        args.value,
        path.display()
    ))
}

fn apply_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "check.normalize" => config.check.normalize = parse_bool(key, value)?,
        "check.fail_on_warnings" => config.check.fail_on_warnings = parse_bool(key, value)?,
        "check.untagged" => {
            if !matches!(value, "required" | "optional") {
                return Err(Error::config(format!(
                    "Invalid value '{value}' for '{key}': expected 'required' or 'optional'"
                )));
            }
            config.check.untagged = value.to_string();
        }
        "output.format" => config.output.format = value.to_string(),
        "output.color" => config.output.color = parse_bool(key, value)?,
        "logging.level" => config.logging.level = value.to_string(),
        "logging.format" => config.logging.format = value.to_string(),
        _ => {
            return Err(Error::config(format!("Unknown configuration key '{key}'")));
        }
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|_| {
        Error::config(format!(
            "Invalid value '{value}' for '{key}': expected 'true' or 'false'"
        ))
    })
}
