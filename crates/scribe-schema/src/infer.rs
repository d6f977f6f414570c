//! Schema inference from observed JSON values.

use serde_json::Value;

use crate::check::is_integral;
use crate::equality::structurally_equal;
use crate::model::{Annotations, ObjectType, Property, Schema};

/// Upper length bound given to inferred tuples.
pub const TUPLE_MAX_ITEMS: u64 = 1000;

/// Infer the narrowest schema describing `value`.
///
/// Scalars carry the observed value as their `example`; objects are closed
/// with every observed key required.
pub fn infer(value: &Value) -> Schema {
    match value {
        Value::Null => Schema::null(),
        Value::Bool(_) => Schema::boolean().with_example(value.clone()),
        Value::String(_) => Schema::string().with_example(value.clone()),
        Value::Number(_) if is_integral(value) => Schema::integer().with_example(value.clone()),
        Value::Number(_) => Schema::number().with_example(value.clone()),
        Value::Array(elements) => infer_array(elements),
        Value::Object(map) => {
            let mut object = ObjectType::closed();
            for (key, field) in map {
                object.properties.insert(
                    key.clone(),
                    Property {
                        schema: infer(field),
                        required: true,
                    },
                );
            }
            Schema::object(object)
        }
    }
}

#[derive(PartialEq, Eq)]
enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

const fn value_kind(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Bool,
        Value::Number(_) => ValueKind::Number,
        Value::String(_) => ValueKind::String,
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
    }
}

fn infer_array(elements: &[Value]) -> Schema {
    let Some(first) = elements.first() else {
        return Schema::array(Schema::unknown());
    };

    let homogeneous = elements.iter().all(|e| value_kind(e) == value_kind(first));
    if !homogeneous {
        return Schema::tuple(
            elements.iter().map(infer).collect(),
            Some(0),
            Some(TUPLE_MAX_ITEMS),
        );
    }

    let mut distinct: Vec<Schema> = Vec::new();
    for element in elements {
        let schema = infer(element);
        if !distinct
            .iter()
            .any(|seen| structurally_equal(seen, &schema, &[Annotations::EXAMPLE]))
        {
            distinct.push(schema);
        }
    }

    if distinct.len() == 1 {
        Schema::array(distinct.remove(0))
    } else {
        Schema::array(Schema::union(distinct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArrayItems, PrimitiveKind, SchemaKind};
    use serde_json::json;

    fn items(schema: &Schema) -> &ArrayItems {
        match &schema.kind {
            SchemaKind::Array(array) => &array.items,
            other => panic!("expected array, got {}", other.name()),
        }
    }

    #[test]
    fn test_infer_scalars() {
        let null = infer(&json!(null));
        assert!(matches!(null.kind, SchemaKind::Primitive(PrimitiveKind::Null)));
        assert!(null.annotations.is_empty());

        let flag = infer(&json!(true));
        assert!(matches!(flag.kind, SchemaKind::Primitive(PrimitiveKind::Boolean)));
        assert_eq!(flag.annotations.example(), Some(&json!(true)));

        let name = infer(&json!("Ada"));
        assert_eq!(name.annotations.example(), Some(&json!("Ada")));
    }

    #[test]
    fn test_infer_numbers() {
        assert!(matches!(infer(&json!(42)).kind, SchemaKind::Primitive(PrimitiveKind::Integer)));
        assert!(matches!(infer(&json!(4.0)).kind, SchemaKind::Primitive(PrimitiveKind::Integer)));
        assert!(matches!(infer(&json!(4.5)).kind, SchemaKind::Primitive(PrimitiveKind::Number)));
        assert_eq!(infer(&json!(4.5)).annotations.example(), Some(&json!(4.5)));
    }

    #[test]
    fn test_infer_object_is_closed_and_required() {
        let value = json!({"id": 1, "name": "Ada"});
        let schema = infer(&value);
        let object = schema.as_object().unwrap();
        assert!(!object.additional_properties);
        assert_eq!(object.required_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert!(schema.check(&value));
        assert!(!schema.check(&json!({"id": 1, "name": "Ada", "extra": 0})));
    }

    #[test]
    fn test_infer_empty_array() {
        let schema = infer(&json!([]));
        assert!(matches!(items(&schema), ArrayItems::Single(item) if item.is_unknown()));
    }

    #[test]
    fn test_infer_homogeneous_array_dedups_ignoring_examples() {
        let schema = infer(&json!([1, 2, 3]));
        match items(&schema) {
            ArrayItems::Single(item) => {
                assert!(matches!(item.kind, SchemaKind::Primitive(PrimitiveKind::Integer)));
            }
            ArrayItems::Tuple(_) => panic!("expected single item schema"),
        }
    }

    #[test]
    fn test_infer_homogeneous_array_with_distinct_shapes() {
        let value = json!([1, 2.5]);
        let schema = infer(&value);
        match items(&schema) {
            ArrayItems::Single(item) => assert_eq!(item.union_members().map(<[_]>::len), Some(2)),
            ArrayItems::Tuple(_) => panic!("expected single item schema"),
        }
        assert!(schema.check(&value));

        let objects = json!([{"a": 1}, {"b": "x"}]);
        assert!(infer(&objects).check(&objects));
    }

    #[test]
    fn test_infer_mixed_array_is_tuple() {
        let value = json!([1, "a", null]);
        let schema = infer(&value);
        let SchemaKind::Array(array) = &schema.kind else {
            panic!("expected array");
        };
        assert!(matches!(&array.items, ArrayItems::Tuple(items) if items.len() == 3));
        assert_eq!(array.min_items, Some(0));
        assert_eq!(array.max_items, Some(TUPLE_MAX_ITEMS));
        assert!(schema.check(&value));
    }

    #[test]
    fn test_inferred_schema_accepts_its_value() {
        let value = json!({
            "users": [{"id": 1, "tags": ["a"]}, {"id": 2, "tags": []}],
            "total": 2,
            "next": null,
            "ratio": 0.5
        });
        assert!(infer(&value).check(&value));
    }
}
