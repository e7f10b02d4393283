//! Handler for the check command
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use super::utils;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use conforma_core::{
    check_matching_routes, check_missing_required_routes_with_policy, detect_composition_issues,
    transform_composition, Document, UntaggedRoutePolicy,
};
use tracing::{info, instrument};

/// Check an implementation document for compatibility with a base document
#[instrument(skip_all, fields(base = %args.base.display(), implementation = %args.implementation.display()))]
pub fn handle_check(args: &CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let base: Document = utils::load_file(&args.base)?;
    let mut implementation: Document = utils::load_file(&args.implementation)?;

    let normalize = !args.no_normalize && config.check.normalize;
    if normalize && detect_composition_issues(&implementation) {
        let outcome = transform_composition(&implementation);
        if outcome.had_issues {
            info!("Normalized composition patterns in implementation document");
        }
        implementation = outcome.document;
    }

    let policy: UntaggedRoutePolicy = match args.untagged {
        Some(policy) => policy.into(),
        None => config.untagged_policy(),
    };

    let mut report = check_missing_required_routes_with_policy(&base, &implementation, policy);
    report.merge(check_matching_routes(&base, &implementation)?);

    let errors = report.error_level_count();
    let warnings = report.warning_count();
    info!(errors, warnings, "Compatibility check finished");

    if report.is_empty() {
        output.success("Compatible: no conflicts found")?;
        return Ok(());
    }

    output.report(&report)?;

    let fail_on_warnings = args.fail_on_warnings || config.check.fail_on_warnings;
    if errors > 0 || (fail_on_warnings && warnings > 0) {
        return Err(Error::Incompatible { errors, warnings });
    }

    Ok(())
}
