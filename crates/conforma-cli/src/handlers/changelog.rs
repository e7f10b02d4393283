//! Handler for the changelog command
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use super::utils;
use crate::cli::ChangelogArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use conforma_core::{ChangelogBuilder, Namespace};
use tracing::{info, instrument};

/// Build a per-entity, per-version changelog from a versioned type graph
#[instrument(skip_all, fields(graph = %args.graph.display()))]
pub fn handle_changelog(args: &ChangelogArgs, output: &mut OutputWriter) -> Result<()> {
    let root: Namespace = utils::load_file(&args.graph)?;
    let changelog = ChangelogBuilder::build(&root);

    info!(
        versions = changelog.versions.len(),
        entities = changelog.logs.len(),
        "Changelog built"
    );

    match &args.out {
        Some(path) => {
            utils::write_json_pretty(path, &changelog)?;
            output.info(&format!("Wrote changelog to {}", path.display()))?;
        }
        None => {
            output.data(&changelog)?;
        }
    }

    Ok(())
}
