//! Route-by-route comparison of two documents
//!
//! Walks the routes present in both documents and checks that each
//! implementation operation can stand in for its base counterpart:
//! response status codes and bodies, the request body, and parameters.
//! Routes absent from the implementation are the business of the
//! missing-route checker, not this one.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use tracing::debug;

use crate::compat::document::{Document, Operation, Parameter};
use crate::compat::finding::{CompatibilityError, ConflictKind, ErrorCollector};
use crate::compat::location::Location;
use crate::compat::schema::SchemaChecker;
use crate::compat::TAG_EXPERIMENTAL;
use crate::error::Result;

/// Compare every route declared in both documents, collecting conflicts.
///
/// Base paths are visited in declaration order, methods in canonical
/// order. Operations tagged experimental on the base side are skipped.
pub fn check_matching_routes(
    base: &Document,
    implementation: &Document,
) -> Result<ErrorCollector> {
    let mut errors = ErrorCollector::new();
    let mut checker = SchemaChecker::new(&base.components, &implementation.components);

    for (path, base_item) in &base.paths {
        let Some(impl_item) = implementation.paths.get(path) else {
            continue;
        };
        for (method, base_op) in base_item.operations() {
            if base_op.has_tag(TAG_EXPERIMENTAL) {
                continue;
            }
            let Some(impl_op) = impl_item.operation(method) else {
                continue;
            };
            let endpoint = format!("{} {}", method.as_upper(), path);
            debug!(endpoint = %endpoint, "comparing route");
            check_operation(&endpoint, base_op, impl_op, &mut checker, &mut errors)?;
        }
    }

    Ok(errors)
}

fn check_operation(
    endpoint: &str,
    base: &Operation,
    implementation: &Operation,
    checker: &mut SchemaChecker<'_>,
    errors: &mut ErrorCollector,
) -> Result<()> {
    check_responses(endpoint, base, implementation, checker, errors)?;
    check_request_body(endpoint, base, implementation, checker, errors)?;
    check_parameters(endpoint, base, implementation, checker, errors)?;
    Ok(())
}

fn check_responses(
    endpoint: &str,
    base: &Operation,
    implementation: &Operation,
    checker: &mut SchemaChecker<'_>,
    errors: &mut ErrorCollector,
) -> Result<()> {
    for (status, base_response) in &base.responses {
        let Some(impl_response) = implementation.responses.get(status) else {
            errors.push(CompatibilityError::route_conflict(
                ConflictKind::MissingStatusCode,
                endpoint,
                None,
                format!("Missing response status code [{status}]"),
            ));
            continue;
        };

        let Some(base_content) = &base_response.content else {
            continue;
        };
        let Some(impl_content) = &impl_response.content else {
            errors.push(CompatibilityError::route_conflict(
                ConflictKind::ResponseBodyConflict,
                endpoint,
                Some(format!("responses.{status}")),
                "Implementation missing content",
            ));
            continue;
        };

        for (mime, base_media) in base_content {
            let Some(base_schema) = &base_media.schema else {
                continue;
            };
            let impl_schema = impl_content.get(mime).and_then(|m| m.schema.as_ref());
            let Some(impl_schema) = impl_schema else {
                errors.push(CompatibilityError::route_conflict(
                    ConflictKind::ResponseBodyConflict,
                    endpoint,
                    Some(format!("responses.{status}")),
                    "Implementation missing schema",
                ));
                continue;
            };

            let mut schema_errors = ErrorCollector::new();
            checker.check(
                &Location::root(format!("responses.{status}")),
                base_schema,
                impl_schema,
                &mut schema_errors,
            )?;
            errors.merge_with_endpoint(schema_errors, endpoint);
        }
    }
    Ok(())
}

fn check_request_body(
    endpoint: &str,
    base: &Operation,
    implementation: &Operation,
    checker: &mut SchemaChecker<'_>,
    errors: &mut ErrorCollector,
) -> Result<()> {
    let Some(base_body) = &base.request_body else {
        return Ok(());
    };
    let Some(impl_body) = &implementation.request_body else {
        if base_body.required {
            errors.push(CompatibilityError::route_conflict(
                ConflictKind::RequestBodyConflict,
                endpoint,
                Some("requestBody".to_string()),
                "Missing required request body",
            ));
        }
        return Ok(());
    };

    for (mime, base_media) in &base_body.content {
        let Some(base_schema) = &base_media.schema else {
            continue;
        };
        let impl_schema = impl_body.content.get(mime).and_then(|m| m.schema.as_ref());
        let Some(impl_schema) = impl_schema else {
            errors.push(CompatibilityError::route_conflict(
                ConflictKind::RequestBodyConflict,
                endpoint,
                Some("requestBody".to_string()),
                format!("Implementation missing schema for expected mime type [{mime}]"),
            ));
            continue;
        };

        let mut schema_errors = ErrorCollector::new();
        checker.check(
            &Location::root("requestBody"),
            base_schema,
            impl_schema,
            &mut schema_errors,
        )?;
        errors.merge_with_endpoint(schema_errors, endpoint);
    }
    Ok(())
}

fn check_parameters(
    endpoint: &str,
    base: &Operation,
    implementation: &Operation,
    checker: &mut SchemaChecker<'_>,
    errors: &mut ErrorCollector,
) -> Result<()> {
    for base_param in &base.parameters {
        let impl_param = find_parameter(&implementation.parameters, base_param);
        let Some(impl_param) = impl_param else {
            if base_param.required {
                errors.push(CompatibilityError::route_conflict(
                    ConflictKind::QueryParamConflict,
                    endpoint,
                    None,
                    format!(
                        "Missing required {} parameter [{}]",
                        base_param.location, base_param.name
                    ),
                ));
            }
            continue;
        };

        if base_param.required && !impl_param.required {
            errors.push(CompatibilityError::route_conflict(
                ConflictKind::QueryParamConflict,
                endpoint,
                None,
                format!("Parameter [{}] must be required", base_param.name),
            ));
        }

        if let (Some(base_schema), Some(impl_schema)) = (&base_param.schema, &impl_param.schema) {
            let mut schema_errors = ErrorCollector::new();
            checker.check(
                &Location::root(format!("parameters.{}", base_param.name)),
                base_schema,
                impl_schema,
                &mut schema_errors,
            )?;
            errors.merge_with_endpoint(schema_errors, endpoint);
        }
    }
    Ok(())
}

/// Parameters match on (name, location)
fn find_parameter<'a>(candidates: &'a [Parameter], wanted: &Parameter) -> Option<&'a Parameter> {
    candidates
        .iter()
        .find(|p| p.name == wanted.name && p.location == wanted.location)
}
