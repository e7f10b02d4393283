//! The versioned type graph the changelog emitter walks
//!
//! Produced by an external compiler front-end and consumed read-only.
//! Namespaces nest arbitrarily; a namespace without its own version list
//! inherits its parent's. Every declaration may carry lifecycle metadata
//! scoping it to a version range.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};

/// A namespace of versioned declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Namespace {
    pub name: String,
    /// Declared version identifiers, oldest first. `None` inherits the
    /// parent namespace's sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<Model>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<EnumDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<Namespace>,
}

/// A model declaration, named by its current (latest) name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    #[serde(skip_serializing_if = "Lifecycle::is_empty")]
    pub lifecycle: Lifecycle,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

/// A property of a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    /// Current data type, e.g. `"string"` or another model's name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Lifecycle::is_empty")]
    pub lifecycle: Lifecycle,
}

/// An enum declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnumDecl {
    pub name: String,
    #[serde(skip_serializing_if = "Lifecycle::is_empty")]
    pub lifecycle: Lifecycle,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

/// A member of an enum
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    #[serde(skip_serializing_if = "Lifecycle::is_empty")]
    pub lifecycle: Lifecycle,
}

/// Version-scoped lifecycle annotations of one declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lifecycle {
    /// Version the declaration first appeared at. Absent means the first
    /// version of the enclosing namespace (for models and enums).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<String>,
    /// Version the declaration was removed at; removal is terminal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<String>,
    /// Renames in no particular order; sorted by version index when walked
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub renames: Vec<Rename>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub made_required: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub made_optional: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_changes: Vec<TypeChange>,
}

impl Lifecycle {
    pub fn is_empty(&self) -> bool {
        self.added.is_none()
            && self.removed.is_none()
            && self.renames.is_empty()
            && self.made_required.is_none()
            && self.made_optional.is_none()
            && self.type_changes.is_empty()
    }
}

/// One rename: at `version` the declaration stopped being `previous_name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rename {
    pub version: String,
    pub previous_name: String,
}

/// One type change: at `version` the property stopped being `previous_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeChange {
    pub version: String,
    pub previous_type: String,
}
