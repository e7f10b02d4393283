//! Changelog emission from a versioned type graph
//!
//! The walk is best effort: missing `added` annotations on models and
//! enums fall back to the first declared version, and version identifiers
//! not in the declared sequence sort last instead of failing the walk.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::versioning::graph::{EnumDecl, Lifecycle, Member, Model, Namespace, Property};
use crate::versioning::version::VersionSequence;

/// What happened to a target at a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeAction {
    Added,
    Removed,
    Renamed,
    MadeRequired,
    MadeOptional,
    TypeChanged,
}

/// What kind of declaration a change record is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetKind {
    Model,
    Field,
    Enum,
    Member,
    Operation,
    Union,
    Variant,
    Scalar,
    Interface,
}

impl TargetKind {
    fn word(self) -> &'static str {
        match self {
            TargetKind::Model => "model",
            TargetKind::Field => "field",
            TargetKind::Enum => "enum",
            TargetKind::Member => "member",
            TargetKind::Operation => "operation",
            TargetKind::Union => "union",
            TargetKind::Variant => "variant",
            TargetKind::Scalar => "scalar",
            TargetKind::Interface => "interface",
        }
    }
}

/// One recorded change; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub message: String,
    pub action: ChangeAction,
    pub target_kind: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_data_type: Option<String>,
}

impl ChangeRecord {
    fn added(kind: TargetKind, name: &str) -> Self {
        Self {
            message: format!("Added {} '{name}'", kind.word()),
            action: ChangeAction::Added,
            target_kind: kind,
            prev_target_name: None,
            curr_target_name: Some(name.to_string()),
            prev_data_type: None,
            curr_data_type: None,
        }
    }

    fn removed(kind: TargetKind, name: &str) -> Self {
        Self {
            message: format!("Removed {} '{name}'", kind.word()),
            action: ChangeAction::Removed,
            target_kind: kind,
            prev_target_name: Some(name.to_string()),
            curr_target_name: None,
            prev_data_type: None,
            curr_data_type: None,
        }
    }

    fn renamed(kind: TargetKind, prev: &str, curr: &str) -> Self {
        Self {
            message: format!("Renamed {} '{prev}' to '{curr}'", kind.word()),
            action: ChangeAction::Renamed,
            target_kind: kind,
            prev_target_name: Some(prev.to_string()),
            curr_target_name: Some(curr.to_string()),
            prev_data_type: None,
            curr_data_type: None,
        }
    }

    fn made_required(name: &str) -> Self {
        Self {
            message: format!("Made field '{name}' required"),
            action: ChangeAction::MadeRequired,
            target_kind: TargetKind::Field,
            prev_target_name: None,
            curr_target_name: Some(name.to_string()),
            prev_data_type: None,
            curr_data_type: None,
        }
    }

    fn made_optional(name: &str) -> Self {
        Self {
            message: format!("Made field '{name}' optional"),
            action: ChangeAction::MadeOptional,
            target_kind: TargetKind::Field,
            prev_target_name: None,
            curr_target_name: Some(name.to_string()),
            prev_data_type: None,
            curr_data_type: None,
        }
    }

    fn type_changed(name: &str, prev: &str, curr: &str) -> Self {
        Self {
            message: format!("Changed type of field '{name}' from '{prev}' to '{curr}'"),
            action: ChangeAction::TypeChanged,
            target_kind: TargetKind::Field,
            prev_target_name: None,
            curr_target_name: Some(name.to_string()),
            prev_data_type: Some(prev.to_string()),
            curr_data_type: Some(curr.to_string()),
        }
    }
}

/// Per-version record lists of one entity, keyed by version identifier
pub type EntityLog = IndexMap<String, Vec<ChangeRecord>>;

/// The full changelog: declared versions plus per-entity logs.
///
/// Entities are keyed by their current (latest) name; earlier names only
/// appear inside rename records. Version keys within an entity are in
/// discovery order; [`Changelog::sorted_records`] orders them by declared
/// version index for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Changelog {
    pub versions: Vec<String>,
    pub logs: IndexMap<String, EntityLog>,
}

impl Changelog {
    /// The declared version order as a comparator
    pub fn sequence(&self) -> VersionSequence {
        VersionSequence::new(self.versions.clone())
    }

    /// One entity's records grouped by version, in declared version order
    pub fn sorted_records(&self, entity: &str) -> Option<Vec<(&str, &[ChangeRecord])>> {
        let log = self.logs.get(entity)?;
        let mut grouped: Vec<(&str, &[ChangeRecord])> = log
            .iter()
            .map(|(version, records)| (version.as_str(), records.as_slice()))
            .collect();
        grouped.sort_by_key(|(version, _)| position(&self.versions, version));
        Some(grouped)
    }
}

/// Walks a namespace tree into a [`Changelog`]
pub struct ChangelogBuilder;

impl ChangelogBuilder {
    pub fn build(root: &Namespace) -> Changelog {
        let mut changelog = Changelog::default();
        Self::visit_namespace(root, &[], &mut changelog);
        changelog
    }

    fn visit_namespace(ns: &Namespace, inherited: &[String], changelog: &mut Changelog) {
        let versions: Vec<String> = match &ns.versions {
            Some(own) => own.clone(),
            None => inherited.to_vec(),
        };
        // Every declared identifier must be reachable through the
        // changelog's own sequence, so sub-namespace sequences append in
        // traversal order.
        for version in &versions {
            if !changelog.versions.contains(version) {
                changelog.versions.push(version.clone());
            }
        }

        for model in &ns.models {
            Self::insert(changelog, &model.name, Self::model_records(model, &versions));
        }
        for decl in &ns.enums {
            Self::insert(changelog, &decl.name, Self::enum_records(decl, &versions));
        }
        for child in &ns.namespaces {
            Self::visit_namespace(child, &versions, changelog);
        }
    }

    /// Entities with no records are omitted; duplicate names across
    /// namespaces keep the later entity.
    fn insert(changelog: &mut Changelog, name: &str, records: EntityLog) {
        if records.is_empty() {
            return;
        }
        if changelog.logs.contains_key(name) {
            warn!(entity = name, "duplicate entity name across namespaces, keeping the later one");
        }
        changelog.logs.insert(name.to_string(), records);
    }

    fn model_records(model: &Model, versions: &[String]) -> EntityLog {
        let mut records = EntityLog::new();
        Self::lifecycle_records(
            &mut records,
            TargetKind::Model,
            &model.name,
            &model.lifecycle,
            versions,
            true,
        );
        for property in &model.properties {
            Self::property_records(&mut records, property, versions);
        }
        records
    }

    fn enum_records(decl: &EnumDecl, versions: &[String]) -> EntityLog {
        let mut records = EntityLog::new();
        Self::lifecycle_records(
            &mut records,
            TargetKind::Enum,
            &decl.name,
            &decl.lifecycle,
            versions,
            true,
        );
        for member in &decl.members {
            Self::member_records(&mut records, member, versions);
        }
        records
    }

    fn property_records(records: &mut EntityLog, property: &Property, versions: &[String]) {
        Self::lifecycle_records(
            records,
            TargetKind::Field,
            &property.name,
            &property.lifecycle,
            versions,
            false,
        );
        if let Some(version) = &property.lifecycle.made_required {
            records
                .entry(version.clone())
                .or_default()
                .push(ChangeRecord::made_required(&property.name));
        }
        if let Some(version) = &property.lifecycle.made_optional {
            records
                .entry(version.clone())
                .or_default()
                .push(ChangeRecord::made_optional(&property.name));
        }

        let mut changes: Vec<_> = property.lifecycle.type_changes.iter().collect();
        changes.sort_by_key(|c| position(versions, &c.version));
        for (i, change) in changes.iter().enumerate() {
            // Types chain forward the same way names do.
            let curr = changes
                .get(i + 1)
                .map(|next| next.previous_type.as_str())
                .or(property.data_type.as_deref())
                .unwrap_or("unknown");
            records
                .entry(change.version.clone())
                .or_default()
                .push(ChangeRecord::type_changed(
                    &property.name,
                    &change.previous_type,
                    curr,
                ));
        }
    }

    fn member_records(records: &mut EntityLog, member: &Member, versions: &[String]) {
        Self::lifecycle_records(
            records,
            TargetKind::Member,
            &member.name,
            &member.lifecycle,
            versions,
            false,
        );
    }

    /// Additions, removals, then renames, in that order
    fn lifecycle_records(
        records: &mut EntityLog,
        kind: TargetKind,
        name: &str,
        lifecycle: &Lifecycle,
        versions: &[String],
        implicit_added: bool,
    ) {
        let added = lifecycle.added.clone().or_else(|| {
            if implicit_added {
                versions.first().cloned()
            } else {
                None
            }
        });
        if let Some(version) = added {
            records
                .entry(version)
                .or_default()
                .push(ChangeRecord::added(kind, name));
        }
        if let Some(version) = &lifecycle.removed {
            records
                .entry(version.clone())
                .or_default()
                .push(ChangeRecord::removed(kind, name));
        }

        let mut renames: Vec<_> = lifecycle.renames.iter().collect();
        renames.sort_by_key(|r| position(versions, &r.version));
        for (i, rename) in renames.iter().enumerate() {
            // Chained forward: each record's current name is the next
            // rename's previous name, or the final name after the last.
            let curr = renames
                .get(i + 1)
                .map(|next| next.previous_name.as_str())
                .unwrap_or(name);
            records
                .entry(rename.version.clone())
                .or_default()
                .push(ChangeRecord::renamed(kind, &rename.previous_name, curr));
        }
    }
}

/// Sequence position of a version; unknown identifiers sort last
fn position(versions: &[String], version: &str) -> usize {
    versions
        .iter()
        .position(|v| v == version)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn namespace(value: serde_json::Value) -> Namespace {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unannotated_model_added_at_first_version() {
        let root = namespace(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0"],
            "models": [{ "name": "Form" }]
        }));

        let changelog = ChangelogBuilder::build(&root);
        assert_eq!(changelog.versions, vec!["0.1.0", "0.2.0"]);
        let records = &changelog.logs["Form"]["0.1.0"];
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, ChangeAction::Added);
        assert_eq!(records[0].message, "Added model 'Form'");
        assert_eq!(records[0].curr_target_name.as_deref(), Some("Form"));
    }

    #[test]
    fn test_rename_records_chain_forward() {
        let root = namespace(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0", "0.3.0"],
            "models": [{
                "name": "FormBase",
                "lifecycle": {
                    "renames": [
                        { "version": "0.3.0", "previousName": "FormCore" },
                        { "version": "0.2.0", "previousName": "Form" }
                    ]
                }
            }]
        }));

        let changelog = ChangelogBuilder::build(&root);
        let log = &changelog.logs["FormBase"];

        // Declared out of order; chained by version index.
        let first = &log["0.2.0"][0];
        assert_eq!(first.prev_target_name.as_deref(), Some("Form"));
        assert_eq!(first.curr_target_name.as_deref(), Some("FormCore"));

        let second = &log["0.3.0"][0];
        assert_eq!(second.prev_target_name.as_deref(), Some("FormCore"));
        assert_eq!(second.curr_target_name.as_deref(), Some("FormBase"));
        assert_eq!(second.message, "Renamed model 'FormCore' to 'FormBase'");
    }

    #[test]
    fn test_property_records_follow_entity_records() {
        let root = namespace(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0"],
            "models": [{
                "name": "Form",
                "properties": [
                    {
                        "name": "id",
                        "dataType": "string",
                        "lifecycle": { "added": "0.1.0", "madeRequired": "0.2.0" }
                    },
                    {
                        "name": "label",
                        "dataType": "string",
                        "lifecycle": {
                            "added": "0.2.0",
                            "typeChanges": [{ "version": "0.2.0", "previousType": "integer" }]
                        }
                    }
                ]
            }]
        }));

        let changelog = ChangelogBuilder::build(&root);
        let log = &changelog.logs["Form"];

        let v1: Vec<&ChangeAction> = log["0.1.0"].iter().map(|r| &r.action).collect();
        assert_eq!(v1, vec![&ChangeAction::Added, &ChangeAction::Added]);
        assert_eq!(log["0.1.0"][1].target_kind, TargetKind::Field);

        let v2 = &log["0.2.0"];
        assert_eq!(v2[0].action, ChangeAction::MadeRequired);
        assert_eq!(v2[1].action, ChangeAction::Added);
        assert_eq!(v2[2].action, ChangeAction::TypeChanged);
        assert_eq!(v2[2].prev_data_type.as_deref(), Some("integer"));
        assert_eq!(v2[2].curr_data_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_unchanged_property_only_entities_are_omitted() {
        let root = namespace(json!({
            "name": "Forms",
            "versions": [],
            "models": [{ "name": "Form" }]
        }));

        // No versions declared, no explicit annotations: nothing to record.
        let changelog = ChangelogBuilder::build(&root);
        assert!(changelog.logs.is_empty());
    }

    #[test]
    fn test_nested_namespaces_inherit_versions_and_merge_flat() {
        let root = namespace(json!({
            "name": "Api",
            "versions": ["1.0", "2.0"],
            "namespaces": [
                {
                    "name": "Forms",
                    "models": [{ "name": "Form" }]
                },
                {
                    "name": "Widgets",
                    "versions": ["3.0"],
                    "models": [{ "name": "Widget" }]
                }
            ]
        }));

        let changelog = ChangelogBuilder::build(&root);
        // The inherited sequence applies inside Forms.
        assert!(changelog.logs["Form"].contains_key("1.0"));
        // Widgets declares its own sequence.
        assert!(changelog.logs["Widget"].contains_key("3.0"));
        // Sub-namespace versions extend the sequence, so every version
        // keyed in the logs stays orderable.
        assert_eq!(changelog.versions, vec!["1.0", "2.0", "3.0"]);
        assert!(changelog.sequence().index_of("3.0").is_ok());
    }

    #[test]
    fn test_duplicate_entity_names_keep_the_later_one() {
        let root = namespace(json!({
            "name": "Api",
            "versions": ["1.0"],
            "namespaces": [
                {
                    "name": "A",
                    "models": [{ "name": "Form", "lifecycle": { "added": "1.0" } }]
                },
                {
                    "name": "B",
                    "models": [{
                        "name": "Form",
                        "lifecycle": { "added": "1.0" },
                        "properties": [{ "name": "marker", "lifecycle": { "added": "1.0" } }]
                    }]
                }
            ]
        }));

        let changelog = ChangelogBuilder::build(&root);
        assert_eq!(changelog.logs.len(), 1);
        // The later namespace's entity wins.
        assert_eq!(changelog.logs["Form"]["1.0"].len(), 2);
    }

    #[test]
    fn test_enum_member_records() {
        let root = namespace(json!({
            "name": "Forms",
            "versions": ["1.0", "2.0"],
            "enums": [{
                "name": "Status",
                "members": [
                    { "name": "active", "lifecycle": { "added": "2.0" } },
                    { "name": "legacy", "lifecycle": { "removed": "2.0" } }
                ]
            }]
        }));

        let changelog = ChangelogBuilder::build(&root);
        let log = &changelog.logs["Status"];
        assert_eq!(log["1.0"][0].message, "Added enum 'Status'");
        assert_eq!(log["2.0"][0].message, "Added member 'active'");
        assert_eq!(log["2.0"][1].message, "Removed member 'legacy'");
    }

    #[test]
    fn test_sorted_records_orders_by_declared_index() {
        let root = namespace(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0", "0.10.0"],
            "models": [{
                "name": "Form",
                "lifecycle": {
                    "added": "0.2.0",
                    "renames": [{ "version": "0.10.0", "previousName": "Draft" }]
                }
            }]
        }));

        let changelog = ChangelogBuilder::build(&root);
        let grouped = changelog.sorted_records("Form").unwrap();
        let versions: Vec<&str> = grouped.iter().map(|(v, _)| *v).collect();
        assert_eq!(versions, vec!["0.2.0", "0.10.0"]);
    }
}
