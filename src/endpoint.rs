//! Data model for discovered endpoints and their inferred shapes.
//!
//! An [`Endpoint`] is one discovered route: an HTTP method, a normalized
//! path, and four [`ObjectParameters`] maps describing the request body,
//! query parameters, headers and response payload. Field shapes are
//! described by the recursive [`FieldType`] tree.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// HTTP methods recognized as route registrations.
///
/// The `use` mounting verb never becomes a method; it only contributes a
/// path prefix during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP PUT method
    Put,
    /// HTTP POST method
    Post,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
}

impl HttpMethod {
    /// Parse a callee name into a method. Returns `None` for `use` and
    /// anything outside the verb vocabulary.
    pub fn from_callee(name: &str) -> Option<Self> {
        match name {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    /// Lowercase verb, as it appears in source and in the decorator file.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }

    /// Uppercase name for display and the collection file.
    pub fn upper(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// Structural description of a single field value.
///
/// The kind carries the shape; `is_optional` records whether the field may
/// be absent (from a declared `?` marker, or by convention for fields
/// recovered through the structural fallback).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub kind: FieldKind,
    pub is_optional: bool,
}

/// The shape variants a field can take.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A scalar type, named as the semantic model reports it
    /// (`string`, `number`, `boolean`, `Date`, ...).
    Primitive(String),
    /// An array; `None` items means the element shape is undeterminable.
    Array(Option<Box<FieldType>>),
    /// An object with named, ordered properties.
    Object(Vec<(String, FieldType)>),
    /// An enumeration with named members.
    Enum(Vec<(String, FieldType)>),
    /// A single string constant, e.g. an enum member's underlying value.
    Literal(String),
}

impl FieldType {
    pub fn primitive(name: impl Into<String>) -> Self {
        FieldType {
            kind: FieldKind::Primitive(name.into()),
            is_optional: false,
        }
    }

    pub fn array(items: Option<FieldType>) -> Self {
        FieldType {
            kind: FieldKind::Array(items.map(Box::new)),
            is_optional: false,
        }
    }

    pub fn object(properties: Vec<(String, FieldType)>) -> Self {
        FieldType {
            kind: FieldKind::Object(properties),
            is_optional: false,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        FieldType {
            kind: FieldKind::Literal(value.into()),
            is_optional: false,
        }
    }

    /// Same shape with the optionality flag set.
    pub fn optional(mut self, is_optional: bool) -> Self {
        self.is_optional = is_optional;
        self
    }

    /// Render to the flat JSON form used by the decorator file and the
    /// collection body: `{"type": ..., "isOptional": ...}` with
    /// `items`/`properties`/`members`/`value` depending on the kind.
    pub fn to_json(&self) -> Value {
        match &self.kind {
            FieldKind::Primitive(name) => json!({
                "type": name,
                "isOptional": self.is_optional,
            }),
            FieldKind::Array(items) => json!({
                "type": "array",
                "items": items.as_ref().map(|t| t.to_json()).unwrap_or(Value::Null),
                "isOptional": self.is_optional,
            }),
            FieldKind::Object(properties) => {
                let mut props = Map::new();
                for (name, ty) in properties {
                    props.insert(name.clone(), ty.to_json());
                }
                json!({
                    "type": "object",
                    "properties": props,
                    "isOptional": self.is_optional,
                })
            }
            FieldKind::Enum(members) => {
                let mut props = Map::new();
                for (name, ty) in members {
                    props.insert(name.clone(), ty.to_json());
                }
                json!({
                    "type": "enum",
                    "members": props,
                })
            }
            FieldKind::Literal(value) => json!({
                "type": "string",
                "value": value,
            }),
        }
    }
}

/// Ordered mapping from field name to shape.
///
/// `None` for a key means the field was observed but its type could not be
/// determined. Insertion order is preserved for deterministic output;
/// inserting an existing key overwrites it in place. Equality is
/// order-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ObjectParameters {
    entries: Vec<(String, Option<FieldType>)>,
}

impl ObjectParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, overwriting any earlier entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, ty: Option<FieldType>) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = ty;
        } else {
            self.entries.push((name, ty));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Option<FieldType>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Option<FieldType>)> {
        self.entries.iter()
    }

    /// Field names, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Merge another map into this one; colliding keys are overwritten.
    pub fn extend(&mut self, other: ObjectParameters) {
        for (name, ty) in other.entries {
            self.insert(name, ty);
        }
    }

    /// Render as a JSON object, `null` for undeterminable fields.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, ty) in &self.entries {
            map.insert(
                name.clone(),
                ty.as_ref().map(|t| t.to_json()).unwrap_or(Value::Null),
            );
        }
        Value::Object(map)
    }
}

impl PartialEq for ObjectParameters {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(name, ty)| other.get(name) == Some(ty))
    }
}

impl FromIterator<(String, Option<FieldType>)> for ObjectParameters {
    fn from_iter<I: IntoIterator<Item = (String, Option<FieldType>)>>(iter: I) -> Self {
        let mut params = ObjectParameters::new();
        for (name, ty) in iter {
            params.insert(name, ty);
        }
        params
    }
}

/// One discovered route.
///
/// Created empty at the root of the traversal, re-derived with an extended
/// path at each recursion step, and finalized exactly once when a verb
/// call is matched. Never mutated after it is pushed to the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// The matched HTTP verb; `None` while the endpoint is only an
    /// accumulated prefix during traversal.
    pub method: Option<HttpMethod>,
    /// Normalized absolute route path; never contains `//`.
    pub path: String,
    pub body: ObjectParameters,
    pub query: ObjectParameters,
    pub headers: ObjectParameters,
    pub response: ObjectParameters,
    /// Declared name of the resolved handler, when it has one.
    pub handler_name: Option<String>,
    /// Documentation tags attached to the handler (tag name -> text).
    pub doc_tags: Option<BTreeMap<String, String>>,
}

impl Endpoint {
    /// The root of a traversal: empty path, default headers seeded with a
    /// synthetic `content-type` field.
    pub fn root() -> Self {
        let mut headers = ObjectParameters::new();
        headers.insert("content-type", Some(FieldType::primitive("string")));
        Endpoint {
            method: None,
            path: String::new(),
            body: ObjectParameters::new(),
            query: ObjectParameters::new(),
            headers,
            response: ObjectParameters::new(),
            handler_name: None,
            doc_tags: None,
        }
    }

    /// A fresh endpoint inheriting only the accumulated path; shapes start
    /// from the defaults, exactly like the root.
    pub fn child_with_path(path: String) -> Self {
        Endpoint {
            path,
            ..Endpoint::root()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_callee() {
        assert_eq!(HttpMethod::from_callee("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_callee("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::from_callee("use"), None);
        assert_eq!(HttpMethod::from_callee("listen"), None);
    }

    #[test]
    fn test_object_parameters_insert_overwrites() {
        let mut params = ObjectParameters::new();
        params.insert("email", Some(FieldType::primitive("string")));
        params.insert("email", Some(FieldType::primitive("number")));

        assert_eq!(params.len(), 1);
        assert_eq!(
            params.get("email"),
            Some(&Some(FieldType::primitive("number")))
        );
    }

    #[test]
    fn test_object_parameters_preserve_insertion_order() {
        let mut params = ObjectParameters::new();
        params.insert("b", None);
        params.insert("a", None);
        params.insert("c", None);

        let keys: Vec<_> = params.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_object_parameters_equality_ignores_order() {
        let mut left = ObjectParameters::new();
        left.insert("a", Some(FieldType::primitive("string")));
        left.insert("b", None);

        let mut right = ObjectParameters::new();
        right.insert("b", None);
        right.insert("a", Some(FieldType::primitive("string")));

        assert_eq!(left, right);

        right.insert("a", Some(FieldType::primitive("number")));
        assert_ne!(left, right);
    }

    #[test]
    fn test_root_endpoint_seeds_content_type() {
        let root = Endpoint::root();
        assert_eq!(root.path, "");
        assert_eq!(root.method, None);
        assert_eq!(
            root.headers.get("content-type"),
            Some(&Some(FieldType::primitive("string")))
        );
        assert!(root.body.is_empty());
        assert!(root.query.is_empty());
        assert!(root.response.is_empty());
    }

    #[test]
    fn test_child_endpoint_gets_fresh_shapes() {
        let child = Endpoint::child_with_path("/api".to_string());
        assert_eq!(child.path, "/api");
        assert_eq!(child.method, None);
        assert!(child.body.is_empty());
        // Default headers are re-seeded, not inherited.
        assert_eq!(child.headers.len(), 1);
    }

    #[test]
    fn test_field_type_json_rendering() {
        let ty = FieldType::object(vec![
            (
                "id".to_string(),
                FieldType::primitive("string").optional(false),
            ),
            (
                "tags".to_string(),
                FieldType::array(Some(FieldType::primitive("string"))),
            ),
        ]);

        let value = ty.to_json();
        assert_eq!(value["type"], "object");
        assert_eq!(value["properties"]["id"]["type"], "string");
        assert_eq!(value["properties"]["id"]["isOptional"], false);
        assert_eq!(value["properties"]["tags"]["type"], "array");
        assert_eq!(value["properties"]["tags"]["items"]["type"], "string");
    }

    #[test]
    fn test_literal_json_rendering() {
        let ty = FieldType::literal("admin");
        let value = ty.to_json();
        assert_eq!(value["type"], "string");
        assert_eq!(value["value"], "admin");
    }

    #[test]
    fn test_unknown_field_renders_null() {
        let mut params = ObjectParameters::new();
        params.insert("mystery", None);
        let value = params.to_json();
        assert!(value["mystery"].is_null());
    }
}
