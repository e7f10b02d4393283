//! Conforma CLI - OpenAPI compatibility checking and versioned schema tooling
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use config::Config;
use error::{format_error, Result};
use logging::{init_logging, LoggingConfig};
use output::OutputWriter;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    if cli.quiet {
        logging_config.level = "error".to_string();
    }
    logging_config.merge_with_env();

    if let Err(error) = init_logging(logging_config) {
        eprintln!("{}", format_error(&error, false));
        std::process::exit(error.exit_code());
    }

    if let Err(error) = run(&cli) {
        eprintln!("{}", format_error(&error, cli.use_color()));
        if error.should_show_help() {
            eprintln!("\nRun 'conforma --help' for usage information");
        }
        std::process::exit(error.exit_code());
    }
}

#[instrument(skip_all)]
fn run(cli: &Cli) -> Result<()> {
    let config = Config::load_with_file(cli.config.as_deref())?;
    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    match &cli.command {
        Commands::Check(args) => handlers::check::handle_check(args, &config, &mut output),
        Commands::Changelog(args) => handlers::changelog::handle_changelog(args, &mut output),
        Commands::Schemas(args) => handlers::schemas::handle_schemas(args, &mut output),
        Commands::Config(args) => handlers::config::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::completions::handle_completions(args),
    }
}
