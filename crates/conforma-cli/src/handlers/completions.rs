//! Handler for shell completion generation
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;
use clap::CommandFactory;
use std::io;
use tracing::debug;

/// Generate completions for the requested shell on stdout
pub fn handle_completions(args: &CompletionsArgs) -> Result<()> {
    debug!(shell = ?args.shell, "Generating shell completions");

    let mut command = Cli::command();
    clap_complete::generate(
        args.shell.to_clap_shell(),
        &mut command,
        "conforma",
        &mut io::stdout(),
    );
    Ok(())
}
