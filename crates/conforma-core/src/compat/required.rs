//! Detection of base routes absent from an implementation
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};

use crate::compat::document::Document;
use crate::compat::finding::{CompatibilityError, ConflictKind, ErrorCollector, Level};
use crate::compat::{TAG_EXPERIMENTAL, TAG_OPTIONAL, TAG_REQUIRED};

/// How to classify base routes that carry neither the required nor the
/// optional tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntaggedRoutePolicy {
    /// Untagged routes must be implemented
    #[default]
    Required,
    /// Untagged routes may be omitted, producing warnings only
    Optional,
}

/// Check that every non-experimental base route exists in the
/// implementation, treating untagged routes as required.
pub fn check_missing_required_routes(
    base: &Document,
    implementation: &Document,
) -> ErrorCollector {
    check_missing_required_routes_with_policy(base, implementation, UntaggedRoutePolicy::default())
}

/// [`check_missing_required_routes`] with an explicit untagged-route policy.
///
/// A missing route tagged required (or untagged, under the default policy)
/// is an error; a missing route tagged optional is a warning. Routes tagged
/// experimental are exempt entirely. Base paths are visited in declaration
/// order, methods in canonical order.
pub fn check_missing_required_routes_with_policy(
    base: &Document,
    implementation: &Document,
    policy: UntaggedRoutePolicy,
) -> ErrorCollector {
    let mut errors = ErrorCollector::new();

    for (path, base_item) in &base.paths {
        for (method, base_op) in base_item.operations() {
            if base_op.has_tag(TAG_EXPERIMENTAL) {
                continue;
            }
            let implemented = implementation
                .paths
                .get(path)
                .and_then(|item| item.operation(method))
                .is_some();
            if implemented {
                continue;
            }

            let required = if base_op.has_tag(TAG_OPTIONAL) {
                false
            } else if base_op.has_tag(TAG_REQUIRED) {
                true
            } else {
                policy == UntaggedRoutePolicy::Required
            };

            let endpoint = format!("{} {}", method.as_upper(), path);
            if required {
                errors.push(CompatibilityError::missing_route(
                    ConflictKind::MissingRequiredRoute,
                    Level::Error,
                    &endpoint,
                    format!("Missing required route '{endpoint}'"),
                ));
            } else {
                errors.push(CompatibilityError::missing_route(
                    ConflictKind::MissingOptionalRoute,
                    Level::Warning,
                    &endpoint,
                    format!("Missing optional route '{endpoint}'"),
                ));
            }
        }
    }

    errors
}
