//! Dotted-path locations into schema trees
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A dotted path identifying where in a schema a finding was made.
///
/// Grows by `.propName` for properties, `[index]` for array items and
/// `[prop]` for additional-properties schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location(String);

impl Location {
    /// Start a location at a named root
    pub fn root(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Child location for a named property
    pub fn property(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    /// Child location for an array element
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Child location for an additional-properties schema
    pub fn additional(&self) -> Self {
        Self(format!("{}[prop]", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.0
    }
}
