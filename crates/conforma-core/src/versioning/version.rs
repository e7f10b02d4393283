//! Total ordering over declared version identifiers
//!
//! Version identifiers are opaque strings; their order is their index in
//! the declared sequence, never a semantic-version parse. Every ordering
//! decision in the changelog and the reconstructor goes through this one
//! comparator.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use std::cmp::Ordering;

use crate::error::{Error, Result};

/// The declared, ordered sequence of version identifiers of a namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSequence {
    versions: Vec<String>,
}

impl VersionSequence {
    pub fn new(versions: Vec<String>) -> Self {
        Self { versions }
    }

    /// The declared identifiers, oldest first
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// The oldest declared version
    pub fn first(&self) -> Option<&str> {
        self.versions.first().map(String::as_str)
    }

    /// Position of a version in the declared sequence
    pub fn index_of(&self, version: &str) -> Result<usize> {
        self.versions
            .iter()
            .position(|v| v == version)
            .ok_or_else(|| Error::UnknownVersion {
                version: version.to_string(),
                declared: self.versions.join(", "),
            })
    }

    /// Order two declared versions by sequence position
    pub fn cmp(&self, a: &str, b: &str) -> Result<Ordering> {
        Ok(self.index_of(a)?.cmp(&self.index_of(b)?))
    }

    /// Whether `version` is at or before `bound` in the declared sequence
    pub fn at_or_before(&self, version: &str, bound: &str) -> Result<bool> {
        Ok(self.cmp(version, bound)? != Ordering::Greater)
    }
}
