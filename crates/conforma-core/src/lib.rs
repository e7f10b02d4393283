//! Conforma Core - compatibility checking and version reconstruction
//!
//! This crate implements the two engines behind the `conforma` tooling:
//!
//! - **Compatibility checking**: determine whether an implementation's
//!   OpenAPI document conforms to a base (protocol) OpenAPI document.
//!   Findings are collected into an ordered [`ErrorCollector`] rather than
//!   thrown, so one pass reports every discrepancy.
//! - **Versioning**: walk a versioned type graph into a per-entity,
//!   per-version [`Changelog`], and reconstruct point-in-time schema
//!   snapshots from the changelog and the current schemas.
//!
//! ## Quick start
//!
//! ```rust
//! use conforma_core::{check_matching_routes, check_missing_required_routes, Document};
//! use serde_json::json;
//!
//! let base: Document = serde_json::from_value(json!({
//!     "paths": {
//!         "/forms": {
//!             "get": { "responses": { "200": {} } }
//!         }
//!     }
//! })).unwrap();
//! let implementation: Document = serde_json::from_value(json!({ "paths": {} })).unwrap();
//!
//! let missing = check_missing_required_routes(&base, &implementation);
//! assert_eq!(missing.error_count(), 1);
//!
//! let conflicts = check_matching_routes(&base, &implementation).unwrap();
//! assert_eq!(conflicts.error_count(), 0);
//! ```
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

pub mod compat;
pub mod error;
pub mod versioning;

pub use compat::{
    check_matching_routes, check_missing_required_routes,
    check_missing_required_routes_with_policy, check_schema_compatibility,
    detect_composition_issues, transform_composition, AdditionalProperties, CompatibilityError,
    Components, ConflictKind, Document, ErrorCollector, ErrorType, Items, Level, Location,
    MediaType, Method, NormalizeOutcome, Operation, Parameter, ParameterLocation, PathItem,
    RequestBody, Response, SchemaChecker, SchemaNode, SchemaObject, TypeSet, UntaggedRoutePolicy,
};
pub use error::{Error, Result};
pub use versioning::{
    generate_schema_versions, ChangeAction, ChangeRecord, Changelog, ChangelogBuilder, EnumDecl,
    Lifecycle, Member, Model, Namespace, Property, Rename, SchemaVersionSnapshot, TargetKind,
    TypeChange, VersionSequence,
};
