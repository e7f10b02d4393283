//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Conforma CLI - OpenAPI compatibility checking and versioned schema tooling
///
/// Checks an implementation's OpenAPI document against a base (protocol)
/// document, emits versioned changelogs from annotated type graphs, and
/// reconstructs point-in-time schema snapshots.
#[derive(Parser, Debug)]
#[command(
    name = "conforma",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CONFORMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check an implementation spec for compatibility with a base spec
    Check(CheckArgs),

    /// Emit a per-entity, per-version changelog from a versioned type graph
    Changelog(ChangelogArgs),

    /// Reconstruct schema snapshots for earlier versions
    Schemas(SchemasArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the base (protocol) OpenAPI document (JSON or YAML)
    #[arg(value_name = "BASE_SPEC")]
    pub base: PathBuf,

    /// Path to the implementation OpenAPI document (JSON or YAML)
    #[arg(value_name = "IMPL_SPEC")]
    pub implementation: PathBuf,

    /// Skip composition normalization of the implementation document
    #[arg(long)]
    pub no_normalize: bool,

    /// Treat warnings as failures for the exit code
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// How to classify base routes carrying neither a required nor an
    /// optional tag (defaults to the configured value)
    #[arg(long, value_enum)]
    pub untagged: Option<UntaggedPolicy>,
}

/// Arguments for the changelog command
#[derive(Parser, Debug)]
pub struct ChangelogArgs {
    /// Path to the versioned type-graph file (JSON or YAML)
    #[arg(value_name = "TYPE_GRAPH")]
    pub graph: PathBuf,

    /// Output file path (stdout if not specified)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the schemas command
#[derive(Parser, Debug)]
#[command(disable_version_flag = true)]
pub struct SchemasArgs {
    /// Path to a changelog file produced by the changelog command
    #[arg(value_name = "CHANGELOG")]
    pub changelog: PathBuf,

    /// Path to the current schemas file: a mapping from entity name to
    /// schema (JSON or YAML)
    #[arg(value_name = "CURRENT_SCHEMAS")]
    pub current: PathBuf,

    /// Reconstruct only this version (all declared versions if omitted)
    #[arg(long)]
    pub version: Option<String>,

    /// Directory to write per-version snapshots into
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize default configuration files
    Init(ConfigInitArgs),

    /// Show current configuration values
    Show(ConfigShowArgs),

    /// Get a configuration value
    Get(ConfigGetArgs),

    /// Set a configuration value
    Set(ConfigSetArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Initialize user config (~/.conforma/config.toml)
    #[arg(long)]
    pub user: bool,

    /// Initialize project config (.conforma.toml)
    #[arg(long)]
    pub project: bool,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Arguments for config get
#[derive(Parser, Debug)]
pub struct ConfigGetArgs {
    /// Configuration key (e.g. check.normalize, output.format)
    pub key: String,
}

/// Arguments for config set
#[derive(Parser, Debug)]
pub struct ConfigSetArgs {
    /// Configuration key (e.g. check.normalize, output.format)
    pub key: String,

    /// New value for the key
    pub value: String,

    /// Write to the user config instead of the project config
    #[arg(long)]
    pub user: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Classification of untagged base routes
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum UntaggedPolicy {
    /// Untagged routes must be implemented
    Required,
    /// Untagged routes may be omitted (warnings only)
    Optional,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && atty::is(atty::Stream::Stdout)
    }
}

impl From<UntaggedPolicy> for conforma_core::UntaggedRoutePolicy {
    fn from(policy: UntaggedPolicy) -> Self {
        match policy {
            UntaggedPolicy::Required => conforma_core::UntaggedRoutePolicy::Required,
            UntaggedPolicy::Optional => conforma_core::UntaggedRoutePolicy::Optional,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
