//! Spec-compatibility checking
//!
//! Structural comparison of an implementation's OpenAPI document against a
//! base (protocol) OpenAPI document:
//!
//! - [`check_matching_routes`]: content comparison for routes present in
//!   both documents (status codes, bodies, parameters, schemas)
//! - [`check_missing_required_routes`]: presence comparison, classifying
//!   missing routes as required or optional
//! - [`transform_composition`] / [`detect_composition_issues`]: pre-checks
//!   normalization of known cross-framework `type`/`allOf` divergences
//! - [`SchemaChecker`]: the recursive JSON-Schema-like subtree comparison
//!   the route comparator delegates to
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

mod composition;
mod document;
mod finding;
mod location;
mod required;
mod resolve;
mod routes;
mod schema;

pub use composition::{detect_composition_issues, transform_composition, NormalizeOutcome};
pub use document::{
    AdditionalProperties, Components, Document, Items, MediaType, Method, Operation, Parameter,
    ParameterLocation, PathItem, RequestBody, Response, SchemaNode, SchemaObject, TypeSet,
};
pub use finding::{CompatibilityError, ConflictKind, ErrorCollector, ErrorType, Level};
pub use location::Location;
pub use required::{
    check_missing_required_routes, check_missing_required_routes_with_policy, UntaggedRoutePolicy,
};
pub use resolve::schema_ref_name;
pub use routes::check_matching_routes;
pub use schema::{check_schema_compatibility, SchemaChecker};

/// Tag marking a base route as excluded from content comparison.
pub const TAG_EXPERIMENTAL: &str = "experimental";
/// Tag marking a base route as required in implementations.
pub const TAG_REQUIRED: &str = "required";
/// Tag marking a base route as optional in implementations.
pub const TAG_OPTIONAL: &str = "optional";
