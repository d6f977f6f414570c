//! Type model → JSON Schema.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::model::{ArrayItems, ArrayType, ObjectType, Schema, SchemaKind};

impl Schema {
    /// Render this node as a JSON Schema value.
    ///
    /// An unannotated `Unknown` renders as `true`; an annotated one renders
    /// its annotations only. Compiling the result leniently gives back a
    /// structurally equal node.
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();

        match &self.kind {
            SchemaKind::Primitive(kind) => {
                out.insert("type".into(), json!(kind.as_str()));
            }
            SchemaKind::Literal(value) => {
                out.insert("const".into(), value.clone());
            }
            SchemaKind::Enum(values) => {
                out.insert("enum".into(), Value::Array(values.clone()));
            }
            SchemaKind::Object(object) => emit_object(object, &mut out),
            SchemaKind::Array(array) => emit_array(array, &mut out),
            SchemaKind::Union(union) => {
                let keyword = if union.exclusive { "oneOf" } else { "anyOf" };
                out.insert(keyword.into(), emit_all(&union.members));
            }
            SchemaKind::Intersect(members) => {
                out.insert("allOf".into(), emit_all(members));
            }
            SchemaKind::Not(inner) => {
                out.insert("not".into(), inner.to_json_schema());
            }
            SchemaKind::Unknown => {
                if self.annotations.is_empty() {
                    return Value::Bool(true);
                }
            }
        }

        for (key, value) in self.annotations.iter() {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }

        Value::Object(out)
    }
}

fn emit_all(members: &[Schema]) -> Value {
    Value::Array(members.iter().map(Schema::to_json_schema).collect())
}

fn emit_object(object: &ObjectType, out: &mut Map<String, Value>) {
    out.insert("type".into(), json!("object"));

    let properties: Map<String, Value> = object
        .properties
        .iter()
        .map(|(name, property)| (name.clone(), property.schema.to_json_schema()))
        .collect();
    out.insert("properties".into(), Value::Object(properties));

    let required: Vec<Value> = object.required_names().map(|name| json!(name)).collect();
    if !required.is_empty() {
        out.insert("required".into(), Value::Array(required));
    }
    if !object.additional_properties {
        out.insert("additionalProperties".into(), Value::Bool(false));
    }
}

fn emit_array(array: &ArrayType, out: &mut Map<String, Value>) {
    out.insert("type".into(), json!("array"));

    match &array.items {
        // Omitted so the output compiles through the bare `type: array` rule.
        ArrayItems::Single(item) if item.is_unknown() && item.annotations.is_empty() => {}
        ArrayItems::Single(item) => {
            out.insert("items".into(), item.to_json_schema());
        }
        ArrayItems::Tuple(items) => {
            out.insert("prefixItems".into(), emit_all(items));
        }
    }

    if let Some(min) = array.min_items {
        out.insert("minItems".into(), json!(min));
    }
    if let Some(max) = array.max_items {
        out.insert("maxItems".into(), json!(max));
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json_schema().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{compile, compile_lenient};
    use crate::equality::structurally_equal;
    use crate::infer::infer;
    use crate::model::ObjectType;

    fn round_trips(schema: &Schema) -> bool {
        structurally_equal(schema, &compile_lenient(&schema.to_json_schema()), &[])
    }

    #[test]
    fn test_emit_object() {
        let schema = Schema::object(
            ObjectType::closed()
                .property("id", Schema::integer())
                .optional("name", Schema::string()),
        )
        .with_annotation("title", json!("User"));

        assert_eq!(
            schema.to_json_schema(),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"}
                },
                "required": ["id"],
                "additionalProperties": false,
                "title": "User"
            })
        );
    }

    #[test]
    fn test_emit_empty_object_keeps_properties() {
        let schema = Schema::object(ObjectType::open());
        assert_eq!(schema.to_json_schema(), json!({"type": "object", "properties": {}}));
        assert!(round_trips(&schema));
    }

    #[test]
    fn test_emit_unknown() {
        assert_eq!(Schema::unknown().to_json_schema(), json!(true));
        assert_eq!(
            Schema::unknown().with_annotation("description", json!("any")).to_json_schema(),
            json!({"description": "any"})
        );
    }

    #[test]
    fn test_emit_arrays() {
        assert_eq!(Schema::array(Schema::unknown()).to_json_schema(), json!({"type": "array"}));
        assert_eq!(
            Schema::array(Schema::string()).to_json_schema(),
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            Schema::tuple(vec![Schema::integer(), Schema::null()], Some(0), Some(1000)).to_json_schema(),
            json!({
                "type": "array",
                "prefixItems": [{"type": "integer"}, {"type": "null"}],
                "minItems": 0,
                "maxItems": 1000
            })
        );
    }

    #[test]
    fn test_emit_combinators() {
        assert_eq!(
            Schema::one_of(vec![Schema::string(), Schema::literal(json!(1))]).to_json_schema(),
            json!({"oneOf": [{"type": "string"}, {"const": 1}]})
        );
        assert_eq!(
            Schema::intersect(vec![Schema::string()]).to_json_schema(),
            json!({"allOf": [{"type": "string"}]})
        );
        assert_eq!(
            Schema::enumeration(vec![json!("a")]).to_json_schema(),
            json!({"enum": ["a"]})
        );
    }

    #[test]
    fn test_emitted_inferred_schemas_round_trip() {
        let value = json!({
            "id": 7,
            "name": "Ada",
            "score": 1.5,
            "tags": ["x", "y"],
            "empty": [],
            "nested": {"ok": true, "none": null}
        });
        assert!(round_trips(&infer(&value)));
        assert!(round_trips(&infer(&json!([1, "mixed", null]))));
    }

    #[test]
    fn test_emitted_compiled_schemas_round_trip() {
        let fragment = json!({
            "type": "object",
            "properties": {
                "kind": {"enum": ["a", "b"]},
                "value": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                "list": {"type": "array", "items": {"type": "integer"}, "maxItems": 3},
                "either": {"oneOf": [{"type": "string"}, {"type": "boolean"}]},
                "both": {"allOf": [{"type": "string"}, {"minLength": 2, "type": "string"}]},
                "never": {"not": {"type": "null"}},
                "free": {"type": "object", "description": "anything"},
                "any": true
            },
            "required": ["kind"]
        });
        let schema = compile(&fragment).unwrap();
        assert!(round_trips(&schema));
    }

    #[test]
    fn test_serialize_schema() {
        let text = serde_json::to_string(&Schema::string().with_example(json!("x"))).unwrap();
        assert_eq!(text, r#"{"type":"string","example":"x"}"#);
    }
}
