//! JSON Schema → type model compilation.
//!
//! Shape detection runs in a fixed precedence order because several keywords
//! may co-occur in one fragment; the first matching shape wins:
//!
//! | # | Shape | Trigger |
//! |---|-------|---------|
//! | 1 | boolean schema | `true` / `false` |
//! | 2 | object | `type: "object"` |
//! | 3 | enum | `enum` |
//! | 4 | anyOf | `anyOf` |
//! | 5 | allOf | `allOf` |
//! | 6 | oneOf | `oneOf` |
//! | 7 | not | `not` |
//! | 8 | array | `type: "array"` with `items` or `prefixItems` |
//! | 9 | multi-type | `type: [...]` |
//! | 10 | const | `const` |
//! | 11 | primitive | `type: "<name>"` |
//!
//! Keywords that do not shape the node end up in its annotations.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{SchemaError, SchemaResult};
use crate::model::{Annotations, ArrayItems, ArrayType, ObjectType, PrimitiveKind, Property, Schema, SchemaKind};

/// Keywords consumed by shape detection; never copied into annotations.
pub const STRUCTURAL_KEYWORDS: &[&str] = &[
    "type",
    "items",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "properties",
    "required",
    "const",
    "enum",
    "additionalProperties",
];

/// Structural only on array nodes.
const ARRAY_KEYWORDS: &[&str] = &["minItems", "maxItems", "prefixItems"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Object,
    Enum,
    AnyOf,
    AllOf,
    OneOf,
    Not,
    Array,
    MultiType,
    Const,
    Primitive,
}

fn detect_shape(map: &Map<String, Value>) -> Option<Shape> {
    let ty = map.get("type");
    if ty.and_then(Value::as_str) == Some("object") {
        Some(Shape::Object)
    } else if map.contains_key("enum") {
        Some(Shape::Enum)
    } else if map.contains_key("anyOf") {
        Some(Shape::AnyOf)
    } else if map.contains_key("allOf") {
        Some(Shape::AllOf)
    } else if map.contains_key("oneOf") {
        Some(Shape::OneOf)
    } else if map.contains_key("not") {
        Some(Shape::Not)
    } else if ty.and_then(Value::as_str) == Some("array")
        && (map.contains_key("items") || map.contains_key("prefixItems"))
    {
        Some(Shape::Array)
    } else if ty.is_some_and(Value::is_array) {
        Some(Shape::MultiType)
    } else if map.contains_key("const") {
        Some(Shape::Const)
    } else if ty.is_some_and(Value::is_string) {
        Some(Shape::Primitive)
    } else {
        None
    }
}

/// Compile a JSON Schema fragment into the type model.
///
/// # Errors
///
/// Returns [`SchemaError::UnsupportedSchema`] when the fragment, or any
/// fragment nested in it, matches no shape rule.
pub fn compile(fragment: &Value) -> SchemaResult<Schema> {
    Compiler { lenient: false }.node(fragment)
}

/// Compile, keeping fragments the compiler cannot model as opaque nodes.
///
/// Used for documents loaded from outside, which may carry `$ref` or
/// keywords without a compilation rule. Only the innermost offending fragment
/// becomes opaque: it re-emits verbatim and accepts any value, while the rest
/// of the tree compiles normally.
pub fn compile_lenient(fragment: &Value) -> Schema {
    match (Compiler { lenient: true }).node(fragment) {
        Ok(schema) => schema,
        Err(e) => {
            warn!(error = %e, "keeping schema fragment as an opaque node");
            Schema::opaque(fragment)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Compiler {
    lenient: bool,
}

impl Compiler {
    fn node(self, fragment: &Value) -> SchemaResult<Schema> {
        match self.shape(fragment) {
            Err(e) if self.lenient => {
                warn!(error = %e, "keeping schema fragment as an opaque node");
                Ok(Schema::opaque(fragment))
            }
            result => result,
        }
    }

    fn nodes<'a>(self, fragments: impl IntoIterator<Item = &'a Value>) -> SchemaResult<Vec<Schema>> {
        fragments.into_iter().map(|fragment| self.node(fragment)).collect()
    }

    fn shape(self, fragment: &Value) -> SchemaResult<Schema> {
        let map = match fragment {
            Value::Bool(true) => return Ok(Schema::unknown()),
            Value::Bool(false) => return Ok(Schema::not(Schema::unknown())),
            Value::Object(map) => map,
            other => {
                return Err(SchemaError::unsupported(
                    "a schema must be an object or a boolean",
                    other,
                ))
            }
        };

        let shape = detect_shape(map)
            .ok_or_else(|| SchemaError::unsupported("no recognised schema shape", fragment))?;

        let schema = match shape {
            Shape::Object => self.object(map, fragment)?,
            Shape::Enum => compile_enum(map, fragment)?,
            Shape::AnyOf => Schema::union(self.combinator(map, "anyOf", fragment)?),
            Shape::AllOf => Schema::intersect(self.combinator(map, "allOf", fragment)?),
            Shape::OneOf => Schema::one_of(self.combinator(map, "oneOf", fragment)?),
            Shape::Not => Schema::not(self.node(&map["not"])?),
            Shape::Array => self.array(map, fragment)?,
            Shape::MultiType => compile_multi_type(map, fragment)?,
            Shape::Const => compile_const(&map["const"], fragment)?,
            Shape::Primitive => {
                let name = map["type"].as_str().unwrap_or_default();
                compile_type_name(name, Some(map), fragment)?
            }
        };

        let bounds_consumed = matches!(schema.kind, SchemaKind::Array(_));
        Ok(schema.with_annotations(collect_annotations(map, bounds_consumed)))
    }

    fn object(self, map: &Map<String, Value>, fragment: &Value) -> SchemaResult<Schema> {
        let Some(properties) = map.get("properties") else {
            return Ok(Schema::unknown());
        };
        let properties = properties
            .as_object()
            .ok_or_else(|| SchemaError::unsupported("'properties' must be an object", fragment))?;

        let required: Vec<&str> = match map.get("required") {
            None => Vec::new(),
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            Some(_) => {
                return Err(SchemaError::unsupported(
                    "'required' must be an array of property names",
                    fragment,
                ))
            }
        };

        let mut object = ObjectType {
            properties: indexmap::IndexMap::with_capacity(properties.len()),
            additional_properties: !matches!(map.get("additionalProperties"), Some(Value::Bool(false))),
        };
        for (name, property) in properties {
            object.properties.insert(
                name.clone(),
                Property {
                    schema: self.node(property)?,
                    required: required.contains(&name.as_str()),
                },
            );
        }

        Ok(Schema::object(object))
    }

    fn combinator(self, map: &Map<String, Value>, keyword: &str, fragment: &Value) -> SchemaResult<Vec<Schema>> {
        let members = map[keyword]
            .as_array()
            .ok_or_else(|| SchemaError::unsupported(format!("'{}' must be an array", keyword), fragment))?;
        self.nodes(members)
    }

    fn array(self, map: &Map<String, Value>, fragment: &Value) -> SchemaResult<Schema> {
        let min_items = array_bound(map, "minItems");
        let max_items = array_bound(map, "maxItems");

        let Some(items) = map.get("items") else {
            let prefix = map["prefixItems"]
                .as_array()
                .ok_or_else(|| SchemaError::unsupported("'prefixItems' must be an array", fragment))?;
            return Ok(Schema::tuple(self.nodes(prefix)?, min_items, max_items));
        };

        let array = match items {
            // Positional items collapse to a bounded list of their union.
            Value::Array(tuple) => {
                let members = self.nodes(tuple)?;
                let len = members.len() as u64;
                ArrayType {
                    items: ArrayItems::Single(Box::new(Schema::union(members))),
                    min_items,
                    max_items: Some(max_items.map_or(len, |max| max.min(len))),
                }
            }
            items => ArrayType {
                items: ArrayItems::Single(Box::new(self.node(items)?)),
                min_items,
                max_items,
            },
        };

        Ok(Schema::new(SchemaKind::Array(array)))
    }
}

fn collect_annotations(map: &Map<String, Value>, bounds_consumed: bool) -> Annotations {
    map.iter()
        .filter(|(key, _)| !STRUCTURAL_KEYWORDS.contains(&key.as_str()))
        .filter(|(key, _)| !(bounds_consumed && ARRAY_KEYWORDS.contains(&key.as_str())))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn literal_value(value: &Value, fragment: &Value) -> SchemaResult<Value> {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(value.clone()),
        Value::Array(_) | Value::Object(_) => Err(SchemaError::unsupported(
            "only scalar values can be literals",
            fragment,
        )),
    }
}

fn compile_enum(map: &Map<String, Value>, fragment: &Value) -> SchemaResult<Schema> {
    let values = map["enum"]
        .as_array()
        .ok_or_else(|| SchemaError::unsupported("'enum' must be an array", fragment))?;

    let members = values
        .iter()
        .map(|value| literal_value(value, fragment).map(Schema::literal))
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(Schema::union(members))
}

fn array_bound(map: &Map<String, Value>, keyword: &str) -> Option<u64> {
    map.get(keyword).and_then(Value::as_u64)
}

fn compile_multi_type(map: &Map<String, Value>, fragment: &Value) -> SchemaResult<Schema> {
    let names = map["type"].as_array().map(Vec::as_slice).unwrap_or_default();
    if names.is_empty() {
        return Err(SchemaError::unsupported("'type' list must not be empty", fragment));
    }

    let members = names
        .iter()
        .map(|name| match name.as_str() {
            Some(name) => compile_type_name(name, None, fragment),
            None => Err(SchemaError::unsupported("type names must be strings", fragment)),
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(Schema::union(members))
}

fn compile_const(value: &Value, fragment: &Value) -> SchemaResult<Schema> {
    match value {
        Value::Array(values) => {
            let members = values
                .iter()
                .map(|value| literal_value(value, fragment).map(Schema::literal))
                .collect::<SchemaResult<Vec<_>>>()?;
            Ok(Schema::union(members))
        }
        Value::Object(_) => Err(SchemaError::unsupported("object constants are not supported", fragment)),
        scalar => Ok(Schema::literal(scalar.clone())),
    }
}

// `bounds` carries the enclosing keywords when the name is the whole schema.
fn compile_type_name(
    name: &str,
    bounds: Option<&Map<String, Value>>,
    fragment: &Value,
) -> SchemaResult<Schema> {
    if let Some(kind) = PrimitiveKind::from_name(name) {
        return Ok(Schema::primitive(kind));
    }

    match name {
        "array" => Ok(Schema::new(SchemaKind::Array(ArrayType {
            items: ArrayItems::Single(Box::new(Schema::unknown())),
            min_items: bounds.and_then(|map| array_bound(map, "minItems")),
            max_items: bounds.and_then(|map| array_bound(map, "maxItems")),
        }))),
        "object" => Ok(Schema::unknown()),
        other => Err(SchemaError::unsupported(format!("unknown type '{}'", other), fragment)),
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fragment = Value::deserialize(deserializer)?;
        Ok(compile_lenient(&fragment))
    }
}
