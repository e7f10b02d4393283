//! Compatibility findings and the ordered collector they accumulate into
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad classification of a compatibility finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// A route exists in both documents but its content conflicts
    RouteConflict,
    /// A base route is absent from the implementation
    MissingRoute,
}

/// Specific kind of conflict within an [`ErrorType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    TypeConflict,
    MissingField,
    EnumConflict,
    ExtraField,
    MissingStatusCode,
    ResponseBodyConflict,
    QueryParamConflict,
    RequestBodyConflict,
    MissingRequiredRoute,
    MissingOptionalRoute,
}

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Error,
    Warning,
}

/// A single compatibility finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityError {
    /// Broad classification
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    /// Specific conflict kind
    pub sub_type: ConflictKind,
    /// Severity
    pub level: Level,
    /// Owning endpoint as `"METHOD /path"`, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Dotted path into the schema where the finding was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl CompatibilityError {
    /// Create an error-level route conflict finding
    pub fn route_conflict(
        sub_type: ConflictKind,
        endpoint: impl Into<String>,
        location: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error_type: ErrorType::RouteConflict,
            sub_type,
            level: Level::Error,
            endpoint: Some(endpoint.into()),
            location,
            message: message.into(),
        }
    }

    /// Create a schema-level conflict finding; the owning endpoint is
    /// attached later by the route comparator
    pub fn schema_conflict(
        sub_type: ConflictKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error_type: ErrorType::RouteConflict,
            sub_type,
            level: Level::Error,
            endpoint: None,
            location: Some(location.into()),
            message: message.into(),
        }
    }

    /// Create a missing-route finding at the given severity
    pub fn missing_route(
        sub_type: ConflictKind,
        level: Level,
        endpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error_type: ErrorType::MissingRoute,
            sub_type,
            level,
            endpoint: Some(endpoint.into()),
            location: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for CompatibilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Error => write!(f, "[ERROR]")?,
            Level::Warning => write!(f, "[WARNING]")?,
        }
        if let Some(endpoint) = &self.endpoint {
            write!(f, " {endpoint}")?;
        }
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Append-only, insertion-ordered accumulator of compatibility findings.
///
/// Never deduplicates, never reorders; index positions are stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCollector {
    errors: Vec<CompatibilityError>,
}

impl ErrorCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding
    pub fn push(&mut self, error: CompatibilityError) {
        self.errors.push(error);
    }

    /// Total number of collected findings
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of findings at [`Level::Error`]
    pub fn error_level_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.level == Level::Error)
            .count()
    }

    /// Number of findings at [`Level::Warning`]
    pub fn warning_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.level == Level::Warning)
            .count()
    }

    /// Finding at a stable insertion-order index
    pub fn get(&self, index: usize) -> Option<&CompatibilityError> {
        self.errors.get(index)
    }

    /// Whether no findings were collected
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate findings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &CompatibilityError> {
        self.errors.iter()
    }

    /// Append all findings of another collector, preserving their order
    pub fn merge(&mut self, other: ErrorCollector) {
        self.errors.extend(other.errors);
    }

    /// Append another collector's findings, tagging each with the owning
    /// endpoint where one is not already set
    pub fn merge_with_endpoint(&mut self, other: ErrorCollector, endpoint: &str) {
        for mut error in other.errors {
            if error.endpoint.is_none() {
                error.endpoint = Some(endpoint.to_string());
            }
            self.errors.push(error);
        }
    }
}

impl<'a> IntoIterator for &'a ErrorCollector {
    type Item = &'a CompatibilityError;
    type IntoIter = std::slice::Iter<'a, CompatibilityError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
