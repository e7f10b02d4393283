//! Point-in-time schema reconstruction from a changelog
//!
//! Starting from the current component schemas, reverse-applies the
//! changelog back to a target version: entities and fields added later are
//! dropped, renames are unwound to the name valid at the target, required
//! flips after the target are reversed, and `$id`/`$ref` strings are
//! rewritten so the snapshot stays internally consistent.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compat::{AdditionalProperties, Items, SchemaNode};
use crate::error::Result;
use crate::versioning::changelog::{ChangeAction, ChangeRecord, Changelog, TargetKind};

/// The schemas as they existed at one version, keyed by the entity names
/// valid at that version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaVersionSnapshot {
    pub version: String,
    pub schemas: IndexMap<String, SchemaNode>,
}

/// Derive the schema snapshot at `target_version`.
///
/// `current` maps each entity's current (latest) name to its current
/// schema. Entities without changelog records pass through unmodified.
pub fn generate_schema_versions(
    target_version: &str,
    changelog: &Changelog,
    current: &IndexMap<String, SchemaNode>,
) -> Result<SchemaVersionSnapshot> {
    let sequence = changelog.sequence();
    let target = sequence.index_of(target_version)?;

    let mut schemas = IndexMap::new();
    // current name -> name at target, for entities whose name differs
    let mut renamed = IndexMap::new();

    for (name, schema) in current {
        let Some(log) = changelog.logs.get(name) else {
            schemas.insert(name.clone(), schema.clone());
            continue;
        };
        let records = indexed_records(log, changelog);

        if !entity_exists_at(&records, target) {
            debug!(entity = %name, version = target_version, "entity absent at target version");
            continue;
        }

        let name_at_target = entity_name_at(&records, target, name);
        if name_at_target != *name {
            renamed.insert(name.clone(), name_at_target.clone());
        }

        let mut schema = schema.clone();
        if let SchemaNode::Object(obj) = &mut schema {
            apply_field_history(obj, &records, target);
            if let Some(id) = &obj.id {
                if let Some(rewritten) = rewrite_name(id, name, &name_at_target) {
                    obj.id = Some(rewritten);
                }
            }
        }
        schemas.insert(name_at_target, schema);
    }

    // Second pass: point $refs at the names valid at the target version.
    if !renamed.is_empty() {
        for schema in schemas.values_mut() {
            rewrite_references(schema, &renamed);
        }
    }

    Ok(SchemaVersionSnapshot {
        version: target_version.to_string(),
        schemas,
    })
}

/// One entity's records flattened with their version's sequence index.
/// Versions outside the declared sequence index past the end, so they
/// never count as "at or before" a declared target.
fn indexed_records<'a>(
    log: &'a IndexMap<String, Vec<ChangeRecord>>,
    changelog: &Changelog,
) -> Vec<(usize, &'a ChangeRecord)> {
    let sequence = changelog.sequence();
    let mut out = Vec::new();
    for (version, records) in log {
        let index = sequence.index_of(version).ok().unwrap_or(usize::MAX);
        for record in records {
            out.push((index, record));
        }
    }
    out
}

fn is_entity_kind(kind: TargetKind) -> bool {
    matches!(kind, TargetKind::Model | TargetKind::Enum)
}

/// Added at or before the target, and not removed at or before it.
/// Removal is terminal. An entity with no entity-level records at all is
/// passed through as existing.
fn entity_exists_at(records: &[(usize, &ChangeRecord)], target: usize) -> bool {
    let added = records
        .iter()
        .filter(|(_, r)| is_entity_kind(r.target_kind) && r.action == ChangeAction::Added)
        .map(|(index, _)| *index)
        .min();
    if added.is_some_and(|index| index > target) {
        return false;
    }
    let removed = records
        .iter()
        .filter(|(_, r)| is_entity_kind(r.target_kind) && r.action == ChangeAction::Removed)
        .map(|(index, _)| *index)
        .min();
    !removed.is_some_and(|index| index <= target)
}

/// Walk entity renames forward from the oldest recorded name, applying
/// every rename at or before the target.
fn entity_name_at(records: &[(usize, &ChangeRecord)], target: usize, current: &str) -> String {
    let mut renames: Vec<&(usize, &ChangeRecord)> = records
        .iter()
        .filter(|(_, r)| is_entity_kind(r.target_kind) && r.action == ChangeAction::Renamed)
        .collect();
    if renames.is_empty() {
        return current.to_string();
    }
    renames.sort_by_key(|(index, _)| *index);

    let mut name = renames[0]
        .1
        .prev_target_name
        .clone()
        .unwrap_or_else(|| current.to_string());
    for (index, record) in renames {
        if *index > target {
            break;
        }
        if let Some(curr) = &record.curr_target_name {
            name = curr.clone();
        }
    }
    name
}

/// Reverse-apply field-level history onto the entity's object schema:
/// drop fields added after the target, unwind field renames, and reverse
/// required flips that happened after the target.
fn apply_field_history(
    obj: &mut crate::compat::SchemaObject,
    records: &[(usize, &ChangeRecord)],
    target: usize,
) {
    let field_records: Vec<&(usize, &ChangeRecord)> = records
        .iter()
        .filter(|(_, r)| r.target_kind == TargetKind::Field)
        .collect();
    if field_records.is_empty() {
        return;
    }

    let mut properties = IndexMap::new();
    let mut required = obj.required.clone();

    for (name, schema) in std::mem::take(&mut obj.properties) {
        let added = field_records
            .iter()
            .filter(|(_, r)| {
                r.action == ChangeAction::Added && r.curr_target_name.as_deref() == Some(&name)
            })
            .map(|(index, _)| *index)
            .min();
        if added.is_some_and(|index| index > target) {
            required.retain(|r| r != &name);
            continue;
        }

        // Required flips after the target are unwound.
        for (index, record) in &field_records {
            if *index <= target || record.curr_target_name.as_deref() != Some(&name) {
                continue;
            }
            match record.action {
                ChangeAction::MadeRequired => required.retain(|r| r != &name),
                ChangeAction::MadeOptional => {
                    if !required.contains(&name) {
                        required.push(name.clone());
                    }
                }
                _ => {}
            }
        }

        let at_target = field_name_at(&field_records, target, &name);
        if at_target != name {
            for entry in &mut required {
                if entry == &name {
                    *entry = at_target.clone();
                }
            }
        }
        properties.insert(at_target, schema);
    }

    obj.properties = properties;
    obj.required = required;
}

/// Walk field renames backward from the current name: every rename after
/// the target is unwound. The visited list guards against rename cycles.
fn field_name_at(records: &[&(usize, &ChangeRecord)], target: usize, current: &str) -> String {
    let mut name = current.to_string();
    let mut visited = vec![name.clone()];
    loop {
        let prev = records.iter().find_map(|(index, r)| {
            (r.action == ChangeAction::Renamed
                && *index > target
                && r.curr_target_name.as_deref() == Some(&name))
            .then(|| r.prev_target_name.clone())
            .flatten()
        });
        match prev {
            Some(prev) if !visited.contains(&prev) => {
                visited.push(prev.clone());
                name = prev;
            }
            _ => return name,
        }
    }
}

/// Rewrite one name inside an identifier string, matching the whole
/// string, a trailing `/Name` path segment, or a `Name.json` file stem
fn rewrite_name(identifier: &str, current: &str, at_target: &str) -> Option<String> {
    if identifier == current {
        return Some(at_target.to_string());
    }
    if let Some(prefix) = identifier.strip_suffix(&format!("/{current}")) {
        return Some(format!("{prefix}/{at_target}"));
    }
    if let Some(prefix) = identifier.strip_suffix(&format!("{current}.json")) {
        return Some(format!("{prefix}{at_target}.json"));
    }
    None
}

fn rewrite_reference(reference: &mut String, renamed: &IndexMap<String, String>) {
    for (current, at_target) in renamed {
        if let Some(rewritten) = rewrite_name(reference, current, at_target) {
            *reference = rewritten;
            return;
        }
    }
}

fn rewrite_references(node: &mut SchemaNode, renamed: &IndexMap<String, String>) {
    match node {
        SchemaNode::Ref(reference) => rewrite_reference(reference, renamed),
        SchemaNode::Object(obj) => {
            if let Some(reference) = &mut obj.reference {
                rewrite_reference(reference, renamed);
            }
            for schema in obj.properties.values_mut() {
                rewrite_references(schema, renamed);
            }
            match &mut obj.items {
                Some(Items::One(items)) => rewrite_references(items, renamed),
                Some(Items::Tuple(items)) => {
                    for schema in items {
                        rewrite_references(schema, renamed);
                    }
                }
                None => {}
            }
            if let Some(AdditionalProperties::Schema(schema)) = &mut obj.additional_properties {
                rewrite_references(schema, renamed);
            }
            if let Some(all_of) = &mut obj.all_of {
                for schema in all_of {
                    rewrite_references(schema, renamed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::{ChangelogBuilder, Namespace};
    use serde_json::json;

    fn changelog(value: serde_json::Value) -> Changelog {
        let root: Namespace = serde_json::from_value(value).unwrap();
        ChangelogBuilder::build(&root)
    }

    fn schemas(value: serde_json::Value) -> IndexMap<String, SchemaNode> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unchanged_entity_passes_through_at_every_version() {
        let changelog = changelog(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0"],
            "models": [{ "name": "Label" }]
        }));
        let current = schemas(json!({
            "Label": { "type": "object", "properties": { "text": { "type": "string" } } }
        }));

        for version in ["0.1.0", "0.2.0"] {
            let snapshot = generate_schema_versions(version, &changelog, &current).unwrap();
            assert_eq!(snapshot.version, version);
            assert_eq!(snapshot.schemas["Label"], current["Label"]);
        }
    }

    #[test]
    fn test_unknown_target_version_errors() {
        let changelog = changelog(json!({
            "name": "Forms",
            "versions": ["0.1.0"],
            "models": [{ "name": "Form" }]
        }));
        let result = generate_schema_versions("9.9.9", &changelog, &IndexMap::new());
        assert!(matches!(
            result,
            Err(crate::Error::UnknownVersion { .. })
        ));
    }

    #[test]
    fn test_sub_namespace_versions_are_valid_targets() {
        let changelog = changelog(json!({
            "name": "Api",
            "versions": ["1.0", "2.0"],
            "namespaces": [{
                "name": "Widgets",
                "versions": ["3.0"],
                "models": [{ "name": "Widget" }]
            }]
        }));
        let current = schemas(json!({ "Widget": { "type": "object" } }));

        // The sub-namespace sequence extends the changelog's, so its
        // versions reconstruct instead of erroring as unknown.
        let snapshot = generate_schema_versions("3.0", &changelog, &current).unwrap();
        assert!(snapshot.schemas.contains_key("Widget"));

        // At a root-only version the widget does not exist yet.
        let snapshot = generate_schema_versions("1.0", &changelog, &current).unwrap();
        assert!(!snapshot.schemas.contains_key("Widget"));
    }

    #[test]
    fn test_entity_added_later_is_absent() {
        let changelog = changelog(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0"],
            "models": [
                { "name": "Form" },
                { "name": "Widget", "lifecycle": { "added": "0.2.0" } }
            ]
        }));
        let current = schemas(json!({
            "Form": { "type": "object" },
            "Widget": { "type": "object" }
        }));

        let snapshot = generate_schema_versions("0.1.0", &changelog, &current).unwrap();
        assert!(snapshot.schemas.contains_key("Form"));
        assert!(!snapshot.schemas.contains_key("Widget"));

        let snapshot = generate_schema_versions("0.2.0", &changelog, &current).unwrap();
        assert!(snapshot.schemas.contains_key("Widget"));
    }

    #[test]
    fn test_rename_exposes_version_valid_name_and_rewrites_refs() {
        let changelog = changelog(json!({
            "name": "Forms",
            "versions": ["0.2.0", "0.3.0"],
            "models": [
                {
                    "name": "FormBase",
                    "lifecycle": {
                        "added": "0.2.0",
                        "renames": [{ "version": "0.3.0", "previousName": "Form" }]
                    }
                },
                { "name": "Page" }
            ]
        }));
        let current = schemas(json!({
            "FormBase": {
                "$id": "https://example.com/schemas/FormBase.json",
                "type": "object"
            },
            "Page": {
                "type": "object",
                "properties": {
                    "form": { "$ref": "#/components/schemas/FormBase" }
                }
            }
        }));

        let early = generate_schema_versions("0.2.0", &changelog, &current).unwrap();
        assert!(early.schemas.contains_key("Form"));
        assert!(!early.schemas.contains_key("FormBase"));
        let form = early.schemas["Form"].as_object().unwrap();
        assert_eq!(
            form.id.as_deref(),
            Some("https://example.com/schemas/Form.json")
        );
        let page = early.schemas["Page"].as_object().unwrap();
        assert_eq!(
            page.properties["form"],
            SchemaNode::Ref("#/components/schemas/Form".to_string())
        );

        let late = generate_schema_versions("0.3.0", &changelog, &current).unwrap();
        assert!(late.schemas.contains_key("FormBase"));
        assert!(!late.schemas.contains_key("Form"));
        let page = late.schemas["Page"].as_object().unwrap();
        assert_eq!(
            page.properties["form"],
            SchemaNode::Ref("#/components/schemas/FormBase".to_string())
        );
    }

    #[test]
    fn test_fields_added_later_are_dropped() {
        let changelog = changelog(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0"],
            "models": [{
                "name": "Form",
                "properties": [
                    { "name": "id", "lifecycle": { "added": "0.1.0" } },
                    { "name": "label", "lifecycle": { "added": "0.2.0" } }
                ]
            }]
        }));
        let current = schemas(json!({
            "Form": {
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "label": { "type": "string" }
                },
                "required": ["id", "label"]
            }
        }));

        let snapshot = generate_schema_versions("0.1.0", &changelog, &current).unwrap();
        let form = snapshot.schemas["Form"].as_object().unwrap();
        assert!(form.properties.contains_key("id"));
        assert!(!form.properties.contains_key("label"));
        assert_eq!(form.required, vec!["id"]);
    }

    #[test]
    fn test_field_rename_unwound_in_properties_and_required() {
        let changelog = changelog(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0"],
            "models": [{
                "name": "Form",
                "properties": [{
                    "name": "title",
                    "lifecycle": {
                        "added": "0.1.0",
                        "renames": [{ "version": "0.2.0", "previousName": "name" }]
                    }
                }]
            }]
        }));
        let current = schemas(json!({
            "Form": {
                "type": "object",
                "properties": { "title": { "type": "string" } },
                "required": ["title"]
            }
        }));

        let snapshot = generate_schema_versions("0.1.0", &changelog, &current).unwrap();
        let form = snapshot.schemas["Form"].as_object().unwrap();
        assert!(form.properties.contains_key("name"));
        assert!(!form.properties.contains_key("title"));
        assert_eq!(form.required, vec!["name"]);

        let snapshot = generate_schema_versions("0.2.0", &changelog, &current).unwrap();
        let form = snapshot.schemas["Form"].as_object().unwrap();
        assert!(form.properties.contains_key("title"));
    }

    #[test]
    fn test_required_flips_after_target_are_reversed() {
        let changelog = changelog(json!({
            "name": "Forms",
            "versions": ["0.1.0", "0.2.0"],
            "models": [{
                "name": "Form",
                "properties": [
                    { "name": "id", "lifecycle": { "added": "0.1.0", "madeRequired": "0.2.0" } },
                    { "name": "label", "lifecycle": { "added": "0.1.0", "madeOptional": "0.2.0" } }
                ]
            }]
        }));
        let current = schemas(json!({
            "Form": {
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "label": { "type": "string" }
                },
                "required": ["id"]
            }
        }));

        let snapshot = generate_schema_versions("0.1.0", &changelog, &current).unwrap();
        let form = snapshot.schemas["Form"].as_object().unwrap();
        // id only became required at 0.2.0; label was still required at 0.1.0.
        assert_eq!(form.required, vec!["label"]);

        let snapshot = generate_schema_versions("0.2.0", &changelog, &current).unwrap();
        let form = snapshot.schemas["Form"].as_object().unwrap();
        assert_eq!(form.required, vec!["id"]);
    }
}
