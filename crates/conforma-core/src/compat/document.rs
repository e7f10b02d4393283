//! Typed model of an OpenAPI-like document tree
//!
//! Documents arrive already deserialized (serde_json / serde_yaml); this
//! module gives the comparison engines a typed view of the parts they walk:
//! paths, operations, parameters, bodies, responses and schema nodes.
//! Unknown keywords are retained in `extra` maps so documents round-trip.
//!
//! A schema node is a tagged variant - [`SchemaNode::Ref`] vs
//! [`SchemaNode::Object`] - rather than a loose map tested for key
//! presence, so a node can never be partially both shapes.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// A parsed OpenAPI 3.0/3.1 document, reduced to the parts the
/// compatibility engines inspect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,
    pub paths: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Document {
    /// Deserialize a document from an in-memory JSON tree
    pub fn from_value(value: Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Reusable components, of which only `schemas` participates in checking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Components {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaNode>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Components {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.extra.is_empty()
    }
}

/// HTTP method of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl Method {
    /// The fixed canonical iteration order for operations within a path.
    /// Error ordering is observable, so this order is part of the contract.
    pub const CANONICAL: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Head,
        Method::Options,
        Method::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
            Method::Head => "head",
            Method::Options => "options",
            Method::Trace => "trace",
        }
    }

    pub fn as_upper(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_upper())
    }
}

/// Operations declared under one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl PathItem {
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        match method {
            Method::Get => self.get.as_ref(),
            Method::Post => self.post.as_ref(),
            Method::Put => self.put.as_ref(),
            Method::Patch => self.patch.as_ref(),
            Method::Delete => self.delete.as_ref(),
            Method::Head => self.head.as_ref(),
            Method::Options => self.options.as_ref(),
            Method::Trace => self.trace.as_ref(),
        }
    }

    /// Iterate declared operations in the canonical method order
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        Method::CANONICAL
            .into_iter()
            .filter_map(|method| self.operation(method).map(|op| (method, op)))
    }

    /// Mutable variant of [`PathItem::operations`]
    pub fn operations_mut(&mut self) -> Vec<(Method, &mut Operation)> {
        let mut out = Vec::new();
        let slots = [
            (Method::Get, &mut self.get),
            (Method::Post, &mut self.post),
            (Method::Put, &mut self.put),
            (Method::Patch, &mut self.patch),
            (Method::Delete, &mut self.delete),
            (Method::Head, &mut self.head),
            (Method::Options, &mut self.options),
            (Method::Trace, &mut self.trace),
        ];
        for (method, slot) in slots {
            if let Some(op) = slot.as_mut() {
                out.push((method, op));
            }
        }
        out
    }
}

/// One operation (method) on a path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Operation {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Where a parameter appears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Path => "path",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        };
        f.write_str(s)
    }
}

/// An operation parameter; identity is (name, location)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Request body of an operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestBody {
    pub required: bool,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One response of an operation, keyed by status code in the parent map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Media-type entry under a `content` map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The `type` keyword: a scalar in 3.0 syntax, an array in 3.1 syntax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    One(String),
    Many(Vec<String>),
}

impl TypeSet {
    /// The declared types with duplicates removed, in declaration order
    pub fn normalized(&self) -> Vec<&str> {
        match self {
            TypeSet::One(t) => vec![t.as_str()],
            TypeSet::Many(types) => {
                let mut seen = HashSet::new();
                types
                    .iter()
                    .map(String::as_str)
                    .filter(|t| seen.insert(*t))
                    .collect()
            }
        }
    }

    /// Order-independent set equality
    pub fn set_equals(&self, other: &TypeSet) -> bool {
        let a: HashSet<&str> = self.normalized().into_iter().collect();
        let b: HashSet<&str> = other.normalized().into_iter().collect();
        a == b
    }

    /// Whether the set is exactly `{name}`
    pub fn is_only(&self, name: &str) -> bool {
        self.normalized() == [name]
    }

    /// `"|"`-joined rendering in normalized declaration order
    pub fn render(&self) -> String {
        self.normalized().join("|")
    }
}

/// The `items` keyword: one schema, or a tuple of schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    One(Box<SchemaNode>),
    Tuple(Vec<SchemaNode>),
}

/// The `additionalProperties` keyword: a boolean or a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaNode>),
}

/// An inline schema object
///
/// The optional sibling `$ref` exists only so the composition normalizer
/// can collapse `allOf: [{$ref}]` in place while preserving sibling keys;
/// parsing a pure `$ref` map always yields [`SchemaNode::Ref`].
///
/// Comparison treats a sibling reference as opaque: only the inline
/// keywords next to it are checked, and the referenced component's
/// constraints are not merged in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaObject {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaNode>>,
    #[serde(rename = "$id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl SchemaObject {
    /// Whether nothing but the sibling `$ref` and non-semantic `extra`
    /// keywords remain
    pub(crate) fn is_bare_reference(&self) -> bool {
        self.schema_type.is_none()
            && self.properties.is_empty()
            && self.required.is_empty()
            && self.items.is_none()
            && self.additional_properties.is_none()
            && self.enum_values.is_none()
            && self.all_of.is_none()
            && self.id.is_none()
            && self.extra.is_empty()
    }
}

/// A schema position: either a reference into `components.schemas` or an
/// inline schema object. Resolution substitutes before comparison, so the
/// checker never sees an unresolved `Ref`.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Ref(String),
    Object(Box<SchemaObject>),
}

impl SchemaNode {
    pub fn object(obj: SchemaObject) -> Self {
        SchemaNode::Object(Box::new(obj))
    }

    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            SchemaNode::Object(obj) => Some(obj),
            SchemaNode::Ref(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if let Value::Object(map) = &value {
            if map.len() == 1 {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return Ok(SchemaNode::Ref(reference.clone()));
                }
            }
        }
        let obj: SchemaObject = serde_json::from_value(value).map_err(D::Error::custom)?;
        Ok(SchemaNode::Object(Box::new(obj)))
    }
}

impl Serialize for SchemaNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SchemaNode::Ref(reference) => {
                #[derive(Serialize)]
                struct RefOnly<'a> {
                    #[serde(rename = "$ref")]
                    reference: &'a str,
                }
                RefOnly { reference }.serialize(serializer)
            }
            SchemaNode::Object(obj) => obj.serialize(serializer),
        }
    }
}
