//! Recursive schema compatibility checking
//!
//! Determines whether an implementation schema accepts a superset of what
//! the base schema accepts while honoring all of the base's required
//! constraints. Findings are pushed into an [`ErrorCollector`]; the walk
//! never stops at the first conflict.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use tracing::trace;

use crate::compat::document::{AdditionalProperties, Components, Items, SchemaNode, SchemaObject};
use crate::compat::finding::{CompatibilityError, ConflictKind, ErrorCollector};
use crate::compat::location::Location;
use crate::compat::resolve::resolve;
use crate::error::Result;

/// Compares base and implementation schema subtrees.
///
/// Holds the two documents' component tables for `$ref` resolution, plus
/// the stack of in-progress reference pairs. Re-entering a pair that is
/// already on the stack means the schemas are mutually recursive; the pair
/// is treated as compatible and the walk is cut there.
pub struct SchemaChecker<'a> {
    base_components: &'a Components,
    impl_components: &'a Components,
    in_progress: Vec<(String, String)>,
}

impl<'a> SchemaChecker<'a> {
    pub fn new(base_components: &'a Components, impl_components: &'a Components) -> Self {
        Self {
            base_components,
            impl_components,
            in_progress: Vec::new(),
        }
    }

    /// Check one base/implementation schema pair, pushing findings into
    /// `errors`. Fails fast only on unresolvable input.
    pub fn check(
        &mut self,
        location: &Location,
        base: &SchemaNode,
        implementation: &SchemaNode,
        errors: &mut ErrorCollector,
    ) -> Result<()> {
        let ref_pair = match (base, implementation) {
            (SchemaNode::Ref(b), SchemaNode::Ref(i)) => Some((b.clone(), i.clone())),
            _ => None,
        };
        if let Some(pair) = &ref_pair {
            if self.in_progress.contains(pair) {
                trace!(location = %location, "reference pair already in progress, cutting recursion");
                return Ok(());
            }
            self.in_progress.push(pair.clone());
        }

        let result = self.check_resolved(location, base, implementation, errors);

        if ref_pair.is_some() {
            self.in_progress.pop();
        }
        result
    }

    fn check_resolved(
        &mut self,
        location: &Location,
        base: &SchemaNode,
        implementation: &SchemaNode,
        errors: &mut ErrorCollector,
    ) -> Result<()> {
        let base = resolve(base, self.base_components)?.into_owned();
        let implementation = resolve(implementation, self.impl_components)?.into_owned();

        self.check_types(location, &base, &implementation, errors);
        self.check_required(location, &base, &implementation, errors);
        self.check_enum(location, &base, &implementation, errors);
        self.check_additional_properties(location, &base, &implementation, errors)?;

        // Nested objects: recurse into every property present on both sides.
        for (name, base_prop) in &base.properties {
            if let Some(impl_prop) = implementation.properties.get(name) {
                self.check(&location.property(name), base_prop, impl_prop, errors)?;
            }
        }

        // Arrays: index 0 stands in for the representative element.
        if let (Some(Items::One(base_items)), Some(Items::One(impl_items))) =
            (&base.items, &implementation.items)
        {
            self.check(&location.index(0), base_items, impl_items, errors)?;
        }

        Ok(())
    }

    fn check_types(
        &self,
        location: &Location,
        base: &SchemaObject,
        implementation: &SchemaObject,
        errors: &mut ErrorCollector,
    ) {
        // A base without `type` accepts any implementation type.
        let Some(base_types) = &base.schema_type else {
            return;
        };

        let compatible = implementation
            .schema_type
            .as_ref()
            .is_some_and(|impl_types| base_types.set_equals(impl_types));
        if !compatible {
            let found = implementation
                .schema_type
                .as_ref()
                .map(|t| t.render())
                .unwrap_or_else(|| "any".to_string());
            errors.push(CompatibilityError::schema_conflict(
                ConflictKind::TypeConflict,
                location.as_str(),
                format!(
                    "Type mismatch: expected '{}', found '{}'",
                    base_types.render(),
                    found
                ),
            ));
        }
    }

    fn check_required(
        &self,
        location: &Location,
        base: &SchemaObject,
        implementation: &SchemaObject,
        errors: &mut ErrorCollector,
    ) {
        for name in &base.required {
            if !implementation.properties.contains_key(name) {
                errors.push(CompatibilityError::schema_conflict(
                    ConflictKind::MissingField,
                    location.property(name).as_str(),
                    format!("Missing required field '{name}'"),
                ));
            }
        }
    }

    fn check_enum(
        &self,
        location: &Location,
        base: &SchemaObject,
        implementation: &SchemaObject,
        errors: &mut ErrorCollector,
    ) {
        let Some(base_enum) = &base.enum_values else {
            return;
        };
        // An implementation without `enum` is unconstrained, which is a
        // superset of any base enum.
        let Some(impl_enum) = &implementation.enum_values else {
            return;
        };

        let missing: Vec<String> = base_enum
            .iter()
            .filter(|value| !impl_enum.contains(value))
            .map(|value| value.to_string())
            .collect();
        if !missing.is_empty() {
            errors.push(CompatibilityError::schema_conflict(
                ConflictKind::EnumConflict,
                location.as_str(),
                format!(
                    "Enum mismatch: implementation missing value(s) {}",
                    missing.join(", ")
                ),
            ));
        }
    }

    fn check_additional_properties(
        &mut self,
        location: &Location,
        base: &SchemaObject,
        implementation: &SchemaObject,
        errors: &mut ErrorCollector,
    ) -> Result<()> {
        match &base.additional_properties {
            Some(AdditionalProperties::Allowed(false)) => {
                for name in implementation.properties.keys() {
                    if !base.properties.contains_key(name) {
                        errors.push(CompatibilityError::schema_conflict(
                            ConflictKind::ExtraField,
                            location.property(name).as_str(),
                            format!("Unexpected additional field '{name}'"),
                        ));
                    }
                }
            }
            Some(AdditionalProperties::Schema(base_additional)) => {
                // Only recurse when both sides declare a schema; an
                // implementation without one is compatible.
                if let Some(AdditionalProperties::Schema(impl_additional)) =
                    &implementation.additional_properties
                {
                    self.check(
                        &location.additional(),
                        base_additional,
                        impl_additional,
                        errors,
                    )?;
                }
            }
            Some(AdditionalProperties::Allowed(true)) | None => {}
        }
        Ok(())
    }
}

/// One-shot schema compatibility check, returning the collected findings.
pub fn check_schema_compatibility(
    location: &Location,
    base: &SchemaNode,
    implementation: &SchemaNode,
    base_components: &Components,
    impl_components: &Components,
) -> Result<ErrorCollector> {
    let mut errors = ErrorCollector::new();
    let mut checker = SchemaChecker::new(base_components, impl_components);
    checker.check(location, base, implementation, &mut errors)?;
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::document::Components;
    use serde_json::json;

    fn node(value: serde_json::Value) -> SchemaNode {
        serde_json::from_value(value).unwrap()
    }

    fn check(base: serde_json::Value, implementation: serde_json::Value) -> ErrorCollector {
        let empty = Components::default();
        check_schema_compatibility(
            &Location::root("body"),
            &node(base),
            &node(implementation),
            &empty,
            &empty,
        )
        .unwrap()
    }

    #[test]
    fn test_absent_base_type_is_wildcard() {
        let errors = check(json!({}), json!({ "type": "string" }));
        assert!(errors.is_empty());

        let errors = check(json!({}), json!({ "type": ["integer", "null"] }));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_type_sets_compare_order_independently() {
        let errors = check(
            json!({ "type": ["string", "integer"] }),
            json!({ "type": ["integer", "string"] }),
        );
        assert!(errors.is_empty());

        let errors = check(json!({ "type": "string" }), json!({ "type": "integer" }));
        assert_eq!(errors.error_count(), 1);
        let error = errors.get(0).unwrap();
        assert_eq!(error.sub_type, ConflictKind::TypeConflict);
        assert_eq!(
            error.message,
            "Type mismatch: expected 'string', found 'integer'"
        );
    }

    #[test]
    fn test_required_subset() {
        let base = json!({
            "type": "object",
            "properties": { "id": { "type": "string" }, "note": { "type": "string" } },
            "required": ["id"]
        });

        // Implementation missing the required field.
        let errors = check(base.clone(), json!({ "type": "object", "properties": {} }));
        assert_eq!(errors.error_count(), 1);
        let error = errors.get(0).unwrap();
        assert_eq!(error.sub_type, ConflictKind::MissingField);
        assert_eq!(error.location.as_deref(), Some("body.id"));

        // Missing an optional field is fine.
        let errors = check(
            base,
            json!({ "type": "object", "properties": { "id": { "type": "string" } } }),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_enum_superset() {
        let errors = check(
            json!({ "enum": ["A", "B"] }),
            json!({ "enum": ["A", "B", "C"] }),
        );
        assert!(errors.is_empty());

        let errors = check(json!({ "enum": ["A", "B"] }), json!({ "enum": ["A"] }));
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.get(0).unwrap().sub_type, ConflictKind::EnumConflict);
        assert_eq!(errors.get(0).unwrap().location.as_deref(), Some("body"));

        // No enum on the implementation side means unconstrained.
        let errors = check(json!({ "enum": ["A", "B"] }), json!({}));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_closed_additional_properties_flags_extra_fields() {
        let errors = check(
            json!({
                "type": "object",
                "properties": { "id": { "type": "string" } },
                "additionalProperties": false
            }),
            json!({
                "type": "object",
                "properties": { "id": { "type": "string" }, "surprise": { "type": "string" } }
            }),
        );
        assert_eq!(errors.error_count(), 1);
        let error = errors.get(0).unwrap();
        assert_eq!(error.sub_type, ConflictKind::ExtraField);
        assert_eq!(error.location.as_deref(), Some("body.surprise"));
    }

    #[test]
    fn test_additional_properties_schema_recursion() {
        let errors = check(
            json!({ "type": "object", "additionalProperties": { "type": "string" } }),
            json!({ "type": "object", "additionalProperties": { "type": "integer" } }),
        );
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.get(0).unwrap().location.as_deref(), Some("body[prop]"));

        // Implementation without additionalProperties is acceptable.
        let errors = check(
            json!({ "type": "object", "additionalProperties": { "type": "string" } }),
            json!({ "type": "object" }),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_nested_property_and_items_locations() {
        let errors = check(
            json!({
                "type": "object",
                "properties": {
                    "tags": { "type": "array", "items": { "type": "string" } }
                }
            }),
            json!({
                "type": "object",
                "properties": {
                    "tags": { "type": "array", "items": { "type": "integer" } }
                }
            }),
        );
        assert_eq!(errors.error_count(), 1);
        assert_eq!(
            errors.get(0).unwrap().location.as_deref(),
            Some("body.tags[0]")
        );
    }

    #[test]
    fn test_refs_resolved_before_comparison() {
        let base_components: Components = serde_json::from_value(json!({
            "schemas": { "Id": { "type": "string" } }
        }))
        .unwrap();
        let impl_components: Components = serde_json::from_value(json!({
            "schemas": { "Id": { "type": "integer" } }
        }))
        .unwrap();

        let base = node(json!({ "$ref": "#/components/schemas/Id" }));
        let implementation = node(json!({ "$ref": "#/components/schemas/Id" }));

        let errors = check_schema_compatibility(
            &Location::root("body"),
            &base,
            &implementation,
            &base_components,
            &impl_components,
        )
        .unwrap();
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.get(0).unwrap().sub_type, ConflictKind::TypeConflict);
    }

    #[test]
    fn test_sibling_reference_is_not_merged_into_comparison() {
        let impl_components: Components = serde_json::from_value(json!({
            "schemas": {
                "Base": { "properties": { "id": { "type": "string" } } }
            }
        }))
        .unwrap();

        let base = node(json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"]
        }));
        // A $ref alongside other keywords stays an inline object; the
        // target's properties do not count toward the base's required set.
        let implementation = node(json!({
            "$ref": "#/components/schemas/Base",
            "type": "object",
            "properties": { "label": { "type": "string" } }
        }));

        let errors = check_schema_compatibility(
            &Location::root("body"),
            &base,
            &implementation,
            &Components::default(),
            &impl_components,
        )
        .unwrap();
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.get(0).unwrap().sub_type, ConflictKind::MissingField);
        assert_eq!(errors.get(0).unwrap().location.as_deref(), Some("body.id"));
    }

    #[test]
    fn test_mutually_recursive_schemas_terminate() {
        let components: Components = serde_json::from_value(json!({
            "schemas": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "next": { "$ref": "#/components/schemas/Node" }
                    }
                }
            }
        }))
        .unwrap();

        let base = node(json!({ "$ref": "#/components/schemas/Node" }));
        let implementation = node(json!({ "$ref": "#/components/schemas/Node" }));

        let errors = check_schema_compatibility(
            &Location::root("body"),
            &base,
            &implementation,
            &components,
            &components,
        )
        .unwrap();
        assert!(errors.is_empty());
    }
}
