//! Normalization of the `type` + `allOf` composition pattern
//!
//! Some generators emit schemas that declare both `"type": "object"` and an
//! `allOf` list. Validators that treat the pair as conjunctive reject
//! otherwise valid payloads, so normalization drops the redundant `type`
//! and, where an `allOf` holds a single reference and nothing else remains,
//! collapses the object to a plain reference.
//!
//! Transformation always works on copies. The input document is never
//! mutated, and schemas inlined into responses are clones of their
//! component targets, never aliases.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use tracing::debug;

use crate::compat::document::{
    AdditionalProperties, Document, Items, SchemaNode, SchemaObject,
};
use crate::compat::resolve::schema_ref_name;

/// Result of normalizing a document
#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    /// The normalized copy of the input
    pub document: Document,
    /// Whether any composition issue was found and rewritten
    pub had_issues: bool,
}

/// Whether any schema in the document exhibits the `type` + `allOf`
/// pattern. Short-circuits on the first hit.
pub fn detect_composition_issues(document: &Document) -> bool {
    if document
        .components
        .schemas
        .values()
        .any(detect_node)
    {
        return true;
    }

    for item in document.paths.values() {
        for (_, op) in item.operations() {
            for response in op.responses.values() {
                let Some(content) = &response.content else {
                    continue;
                };
                for media in content.values() {
                    // References point into components, which were already
                    // scanned above.
                    if let Some(SchemaNode::Object(obj)) = &media.schema {
                        if detect_object(obj) {
                            return true;
                        }
                    }
                }
            }
        }
    }
    false
}

/// Produce a normalized copy of the document.
///
/// Component schemas are rewritten in place; response schemas that
/// reference a component are replaced by a normalized clone of the target
/// so downstream consumers see self-contained response shapes.
pub fn transform_composition(document: &Document) -> NormalizeOutcome {
    let mut out = document.clone();
    let mut changed = false;

    for node in out.components.schemas.values_mut() {
        changed |= fix_node(node);
    }

    // Snapshot of the already-normalized components; inlining below must
    // not alias into the live table.
    let normalized = out.components.schemas.clone();

    for (path, item) in &mut out.paths {
        for (method, op) in item.operations_mut() {
            for response in op.responses.values_mut() {
                let Some(content) = &mut response.content else {
                    continue;
                };
                for media in content.values_mut() {
                    let Some(schema) = &mut media.schema else {
                        continue;
                    };
                    match schema {
                        SchemaNode::Ref(reference) => {
                            let target = schema_ref_name(reference)
                                .and_then(|name| normalized.get(name));
                            if let Some(target) = target {
                                debug!(endpoint = %format!("{} {}", method.as_upper(), path),
                                       reference = %reference,
                                       "inlining response schema");
                                *schema = target.clone();
                            }
                        }
                        SchemaNode::Object(_) => {
                            changed |= fix_node(schema);
                        }
                    }
                }
            }
        }
    }

    NormalizeOutcome {
        document: out,
        had_issues: changed,
    }
}

fn detect_node(node: &SchemaNode) -> bool {
    match node {
        SchemaNode::Ref(_) => false,
        SchemaNode::Object(obj) => detect_object(obj),
    }
}

fn detect_object(obj: &SchemaObject) -> bool {
    if obj.all_of.is_some()
        && obj
            .schema_type
            .as_ref()
            .is_some_and(|t| t.is_only("object"))
    {
        return true;
    }
    if obj.properties.values().any(detect_node) {
        return true;
    }
    match &obj.items {
        Some(Items::One(items)) => {
            if detect_node(items) {
                return true;
            }
        }
        Some(Items::Tuple(items)) => {
            if items.iter().any(detect_node) {
                return true;
            }
        }
        None => {}
    }
    if let Some(AdditionalProperties::Schema(schema)) = &obj.additional_properties {
        if detect_node(schema) {
            return true;
        }
    }
    if let Some(all_of) = &obj.all_of {
        if all_of.iter().any(detect_node) {
            return true;
        }
    }
    false
}

fn fix_node(node: &mut SchemaNode) -> bool {
    let SchemaNode::Object(obj) = node else {
        return false;
    };
    let mut changed = fix_object(obj);

    // A lone $ref left behind by the collapse becomes a plain reference
    // node again.
    let collapse = if obj.is_bare_reference() {
        obj.reference.clone()
    } else {
        None
    };
    if let Some(reference) = collapse {
        *node = SchemaNode::Ref(reference);
    }
    changed
}

fn fix_object(obj: &mut SchemaObject) -> bool {
    let mut changed = false;

    if obj.all_of.is_some()
        && obj
            .schema_type
            .as_ref()
            .is_some_and(|t| t.is_only("object"))
    {
        obj.schema_type = None;
        changed = true;
    }

    for node in obj.properties.values_mut() {
        changed |= fix_node(node);
    }
    match &mut obj.items {
        Some(Items::One(items)) => changed |= fix_node(items),
        Some(Items::Tuple(items)) => {
            for node in items {
                changed |= fix_node(node);
            }
        }
        None => {}
    }
    if let Some(AdditionalProperties::Schema(schema)) = &mut obj.additional_properties {
        changed |= fix_node(schema);
    }
    if let Some(all_of) = &mut obj.all_of {
        for node in all_of.iter_mut() {
            changed |= fix_node(node);
        }
    }

    // allOf of exactly one reference and no other members collapses onto
    // the object as a sibling $ref.
    if let Some(all_of) = &obj.all_of {
        if let [SchemaNode::Ref(reference)] = all_of.as_slice() {
            obj.reference = Some(reference.clone());
            obj.all_of = None;
            changed = true;
        }
    }

    changed
}
