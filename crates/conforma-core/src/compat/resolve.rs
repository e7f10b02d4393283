//! `$ref` resolution against component schemas
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use std::borrow::Cow;

use crate::compat::document::{Components, SchemaNode, SchemaObject};
use crate::error::{Error, Result};

pub(crate) const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Component-schema name of a reference, if it points into
/// `components.schemas`
pub fn schema_ref_name(reference: &str) -> Option<&str> {
    reference.strip_prefix(SCHEMA_REF_PREFIX)
}

/// Resolve a schema node to its underlying object, following reference
/// chains through `components.schemas`.
///
/// Callers that mutate the result must clone it first; a resolved schema
/// must never be written through back into the component table.
pub(crate) fn resolve<'a>(
    node: &'a SchemaNode,
    components: &'a Components,
) -> Result<Cow<'a, SchemaObject>> {
    let mut current = node;
    let mut seen: Vec<&str> = Vec::new();

    loop {
        match current {
            SchemaNode::Object(obj) => return Ok(Cow::Borrowed(obj)),
            SchemaNode::Ref(reference) => {
                let name = schema_ref_name(reference).ok_or_else(|| Error::UnresolvedReference {
                    reference: reference.clone(),
                })?;
                if seen.contains(&name) {
                    return Err(Error::CircularReference {
                        reference: reference.clone(),
                    });
                }
                seen.push(name);
                current =
                    components
                        .schemas
                        .get(name)
                        .ok_or_else(|| Error::UnresolvedReference {
                            reference: reference.clone(),
                        })?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn components(value: serde_json::Value) -> Components {
        serde_json::from_value(json!({ "schemas": value })).unwrap()
    }

    #[test]
    fn test_resolve_follows_reference_chain() {
        let components = components(json!({
            "Alias": { "$ref": "#/components/schemas/Form" },
            "Form": { "type": "object" }
        }));

        let node = SchemaNode::Ref("#/components/schemas/Alias".to_string());
        let resolved = resolve(&node, &components).unwrap();
        assert!(resolved.schema_type.as_ref().unwrap().is_only("object"));
    }

    #[test]
    fn test_resolve_rejects_unknown_and_circular() {
        let components = components(json!({
            "A": { "$ref": "#/components/schemas/B" },
            "B": { "$ref": "#/components/schemas/A" }
        }));

        let missing = SchemaNode::Ref("#/components/schemas/Nope".to_string());
        assert!(matches!(
            resolve(&missing, &components),
            Err(Error::UnresolvedReference { .. })
        ));

        let circular = SchemaNode::Ref("#/components/schemas/A".to_string());
        assert!(matches!(
            resolve(&circular, &components),
            Err(Error::CircularReference { .. })
        ));
    }
}
