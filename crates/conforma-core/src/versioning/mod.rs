//! Versioned type-graph changelog emission and schema reconstruction
//!
//! A versioned namespace tree of models and enums, annotated with
//! added/removed/renamed lifecycle metadata, is walked into a
//! [`Changelog`]: per-entity, per-version lists of [`ChangeRecord`]s.
//! From the changelog plus the current component schemas,
//! [`generate_schema_versions`] derives the schemas as they existed at any
//! declared earlier version.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

mod changelog;
mod graph;
mod reconstruct;
mod version;

pub use changelog::{ChangeAction, ChangeRecord, Changelog, ChangelogBuilder, TargetKind};
pub use graph::{EnumDecl, Lifecycle, Member, Model, Namespace, Property, Rename, TypeChange};
pub use reconstruct::{generate_schema_versions, SchemaVersionSnapshot};
pub use version::VersionSequence;
