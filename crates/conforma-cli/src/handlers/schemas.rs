//! Handler for the schemas command
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use super::utils;
use crate::cli::SchemasArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use conforma_core::{generate_schema_versions, Changelog, SchemaNode};
use indexmap::IndexMap;
use tracing::{info, instrument};

/// Reconstruct per-version schema snapshots from a changelog and the
/// current schemas
#[instrument(skip_all, fields(changelog = %args.changelog.display()))]
pub fn handle_schemas(args: &SchemasArgs, output: &mut OutputWriter) -> Result<()> {
    let changelog: Changelog = utils::load_file(&args.changelog)?;
    let current: IndexMap<String, SchemaNode> = utils::load_file(&args.current)?;

    let versions: Vec<String> = match &args.version {
        Some(version) => vec![version.clone()],
        None => changelog.versions.clone(),
    };

    let mut snapshots = Vec::with_capacity(versions.len());
    for version in &versions {
        snapshots.push(generate_schema_versions(version, &changelog, &current)?);
    }

    info!(count = snapshots.len(), "Reconstructed schema snapshots");

    match &args.out_dir {
        Some(dir) => {
            for snapshot in &snapshots {
                let path = dir.join(&snapshot.version).join("schemas.json");
                utils::write_json_pretty(&path, &snapshot.schemas)?;
                output.info(&format!(
                    "Wrote version {} to {}",
                    snapshot.version,
                    path.display()
                ))?;
            }
        }
        None => {
            if snapshots.len() == 1 {
                output.data(&snapshots[0])?;
            } else {
                output.data(&snapshots)?;
            }
        }
    }

    Ok(())
}
