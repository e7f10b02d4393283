//! Error types for the Conforma core library
//!
//! Compatibility findings are not errors: they are collected into an
//! [`crate::ErrorCollector`] and reported in one pass. The variants here
//! cover genuinely invalid input - unresolvable references, unknown version
//! identifiers, malformed documents - which fail fast.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Main error type for core operations
#[derive(Debug, Error)]
pub enum Error {
    /// The input document is structurally invalid
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    /// A `$ref` does not point at a known component schema
    #[error("unresolved reference '{reference}'")]
    UnresolvedReference { reference: String },

    /// A `$ref` chain loops back on itself without reaching a schema
    #[error("circular reference chain through '{reference}'")]
    CircularReference { reference: String },

    /// A version identifier does not appear in the declared version sequence
    #[error("unknown version '{version}' (declared versions: {declared})")]
    UnknownVersion { version: String, declared: String },

    /// JSON serialization or deserialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
