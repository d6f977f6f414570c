//! Value conformance against the type model.
//!
//! [`check`] is the boolean predicate used by the merge protocol.
//! [`first_mismatch`] walks the same rules but reports where the value was
//! rejected, for diagnostics.

use serde_json::Value;

use crate::equality::values_equal;
use crate::model::{ArrayItems, ArrayType, ObjectType, PrimitiveKind, Schema, SchemaKind};

/// Where and why a value failed to conform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Dotted path to the offending value (`""` for the root).
    pub path: String,
    /// What was expected.
    pub message: String,
}

impl Mismatch {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Whether `value` conforms to `schema`. Never panics.
pub fn check(schema: &Schema, value: &Value) -> bool {
    first_mismatch(schema, value).is_none()
}

/// The first reason `value` does not conform to `schema`, if any.
pub fn first_mismatch(schema: &Schema, value: &Value) -> Option<Mismatch> {
    mismatch_at(schema, value, "")
}

fn child_path(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

fn mismatch_at(schema: &Schema, value: &Value, path: &str) -> Option<Mismatch> {
    match &schema.kind {
        SchemaKind::Primitive(kind) => {
            if primitive_accepts(*kind, value) {
                None
            } else {
                Some(Mismatch::new(path, format!("expected {}", kind)))
            }
        }
        SchemaKind::Literal(expected) => {
            if values_equal(expected, value) {
                None
            } else {
                Some(Mismatch::new(path, format!("expected constant {}", expected)))
            }
        }
        SchemaKind::Enum(values) => {
            if values.iter().any(|v| values_equal(v, value)) {
                None
            } else {
                Some(Mismatch::new(path, "value is not one of the enumerated values"))
            }
        }
        SchemaKind::Object(object) => object_mismatch(object, value, path),
        SchemaKind::Array(array) => array_mismatch(array, value, path),
        SchemaKind::Union(union) => {
            let matches = union
                .members
                .iter()
                .filter(|member| mismatch_at(member, value, path).is_none())
                .count();

            match (union.exclusive, matches) {
                (_, 0) => Some(Mismatch::new(path, "value matches no union member")),
                (true, 1) | (false, _) => None,
                (true, n) => Some(Mismatch::new(
                    path,
                    format!("value matches {} members of an exclusive union", n),
                )),
            }
        }
        SchemaKind::Intersect(members) => members
            .iter()
            .find_map(|member| mismatch_at(member, value, path)),
        SchemaKind::Not(inner) => {
            if mismatch_at(inner, value, path).is_some() {
                None
            } else {
                Some(Mismatch::new(path, "value matches a negated schema"))
            }
        }
        SchemaKind::Unknown => None,
    }
}

fn primitive_accepts(kind: PrimitiveKind, value: &Value) -> bool {
    match kind {
        PrimitiveKind::String => value.is_string(),
        PrimitiveKind::Number => value.is_number(),
        PrimitiveKind::Integer => is_integral(value),
        PrimitiveKind::Boolean => value.is_boolean(),
        PrimitiveKind::Null => value.is_null(),
    }
}

/// Whether `value` is a number without a fractional part.
pub fn is_integral(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

fn object_mismatch(object: &ObjectType, value: &Value, path: &str) -> Option<Mismatch> {
    let Some(map) = value.as_object() else {
        return Some(Mismatch::new(path, "expected object"));
    };

    for (name, property) in &object.properties {
        match map.get(name) {
            Some(field) => {
                if let Some(mismatch) = mismatch_at(&property.schema, field, &child_path(path, name)) {
                    return Some(mismatch);
                }
            }
            None if property.required => {
                return Some(Mismatch::new(
                    &child_path(path, name),
                    format!("missing required field '{}'", name),
                ));
            }
            None => {}
        }
    }

    if !object.additional_properties {
        if let Some(extra) = map.keys().find(|key| !object.properties.contains_key(*key)) {
            return Some(Mismatch::new(
                &child_path(path, extra),
                format!("unexpected field '{}'", extra),
            ));
        }
    }

    None
}

fn array_mismatch(array: &ArrayType, value: &Value, path: &str) -> Option<Mismatch> {
    let Some(elements) = value.as_array() else {
        return Some(Mismatch::new(path, "expected array"));
    };

    let len = elements.len() as u64;
    if array.min_items.is_some_and(|min| len < min) {
        return Some(Mismatch::new(path, format!("expected at least {:?} items", array.min_items)));
    }
    if array.max_items.is_some_and(|max| len > max) {
        return Some(Mismatch::new(path, format!("expected at most {:?} items", array.max_items)));
    }

    match &array.items {
        ArrayItems::Single(item) => elements
            .iter()
            .enumerate()
            .find_map(|(i, element)| mismatch_at(item, element, &child_path(path, &i.to_string()))),
        ArrayItems::Tuple(items) => items
            .iter()
            .zip(elements)
            .enumerate()
            .find_map(|(i, (item, element))| mismatch_at(item, element, &child_path(path, &i.to_string()))),
    }
}

impl Schema {
    /// Whether `value` conforms to this schema.
    pub fn check(&self, value: &Value) -> bool {
        check(self, value)
    }
}
