//! Schema algebra used when observed samples disagree with a known schema.
//!
//! Rewrites always build new nodes; an operand's subtrees are cloned, so the
//! caller's schemas and any references recorded against their ids stay valid.

use std::collections::BTreeSet;

use crate::equality::structurally_equal;
use crate::error::{SchemaError, SchemaResult};
use crate::model::{Annotations, ArrayItems, ArrayType, ObjectType, Property, Schema, SchemaKind, UnionType};

/// Names of the properties a value is guaranteed to carry.
///
/// Objects contribute their required names, intersections the union over
/// their members. Every other shape guarantees nothing.
pub fn required_set(schema: &Schema) -> BTreeSet<String> {
    match &schema.kind {
        SchemaKind::Object(object) => object.required_names().map(str::to_string).collect(),
        SchemaKind::Intersect(members) => members.iter().flat_map(required_set).collect(),
        _ => BTreeSet::new(),
    }
}

/// Intersect `a` and `b` so that values of either remain acceptable.
///
/// Only properties required by both operands stay required. Objects reachable
/// through intersection members are opened, since each side may carry keys
/// the other does not declare.
pub fn merge_as_intersection(a: &Schema, b: &Schema) -> Schema {
    let shared: BTreeSet<String> = required_set(a).intersection(&required_set(b)).cloned().collect();
    Schema::intersect(vec![relax(a, &shared), relax(b, &shared)])
}

fn relax(schema: &Schema, shared: &BTreeSet<String>) -> Schema {
    match &schema.kind {
        SchemaKind::Object(object) => {
            let properties = object
                .properties
                .iter()
                .map(|(name, property)| {
                    (
                        name.clone(),
                        Property {
                            schema: property.schema.clone(),
                            required: property.required && shared.contains(name),
                        },
                    )
                })
                .collect();
            Schema::object(ObjectType {
                properties,
                additional_properties: true,
            })
            .with_annotations(schema.annotations.clone())
        }
        SchemaKind::Intersect(members) => {
            Schema::intersect(members.iter().map(|member| relax(member, shared)).collect())
                .with_annotations(schema.annotations.clone())
        }
        _ => schema.clone(),
    }
}

/// Simplify nested intersections.
///
/// Nested intersections are hoisted into their parent, taking along any
/// annotations the parent lacks. Members equal to an earlier member
/// (ignoring `example`) are dropped and a single survivor replaces the
/// intersection. Objects, arrays, unions and negations are
/// simplified recursively. Applying it twice gives the same result as once.
///
/// # Errors
///
/// Returns [`SchemaError::UnsupportedSchema`] when an intersection has a
/// negated member.
pub fn flatten_intersection(schema: &Schema) -> SchemaResult<Schema> {
    let flattened = match &schema.kind {
        SchemaKind::Intersect(members) => return flatten_members(schema, members),
        SchemaKind::Object(object) => {
            let mut properties = indexmap::IndexMap::with_capacity(object.properties.len());
            for (name, property) in &object.properties {
                properties.insert(
                    name.clone(),
                    Property {
                        schema: flatten_intersection(&property.schema)?,
                        required: property.required,
                    },
                );
            }
            SchemaKind::Object(ObjectType {
                properties,
                additional_properties: object.additional_properties,
            })
        }
        SchemaKind::Array(array) => SchemaKind::Array(ArrayType {
            items: match &array.items {
                ArrayItems::Single(item) => ArrayItems::Single(Box::new(flatten_intersection(item)?)),
                ArrayItems::Tuple(items) => {
                    ArrayItems::Tuple(items.iter().map(flatten_intersection).collect::<SchemaResult<_>>()?)
                }
            },
            min_items: array.min_items,
            max_items: array.max_items,
        }),
        SchemaKind::Union(union) => SchemaKind::Union(UnionType {
            members: union
                .members
                .iter()
                .map(flatten_intersection)
                .collect::<SchemaResult<_>>()?,
            exclusive: union.exclusive,
        }),
        SchemaKind::Not(inner) => SchemaKind::Not(Box::new(flatten_intersection(inner)?)),
        SchemaKind::Primitive(_) | SchemaKind::Literal(_) | SchemaKind::Enum(_) | SchemaKind::Unknown => {
            return Ok(schema.clone())
        }
    };

    Ok(Schema::new(flattened).with_annotations(schema.annotations.clone()))
}

fn flatten_members(schema: &Schema, members: &[Schema]) -> SchemaResult<Schema> {
    let mut annotations = schema.annotations.clone();
    let mut hoisted = Vec::with_capacity(members.len());
    for member in members {
        let member = flatten_intersection(member)?;
        match member.kind {
            SchemaKind::Intersect(nested) => {
                inherit(&mut annotations, &member.annotations);
                hoisted.extend(nested);
            }
            _ => hoisted.push(member),
        }
    }

    let mut kept: Vec<Schema> = Vec::with_capacity(hoisted.len());
    for member in hoisted {
        if matches!(member.kind, SchemaKind::Not(_)) {
            return Err(SchemaError::unsupported_node(
                "negated members cannot be flattened into an intersection",
                &member,
            ));
        }
        if !kept
            .iter()
            .any(|seen| structurally_equal(seen, &member, &[Annotations::EXAMPLE]))
        {
            kept.push(member);
        }
    }

    if kept.len() == 1 {
        let mut survivor = kept.remove(0);
        inherit(&mut survivor.annotations, &annotations);
        return Ok(survivor);
    }

    Ok(Schema::intersect(kept).with_annotations(annotations))
}

fn inherit(target: &mut Annotations, source: &Annotations) {
    for (key, value) in source.iter() {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Add `incoming` as an alternative to `existing`.
///
/// A union gains a member and keeps its exclusivity; any other schema becomes
/// the first member of a new two-member union. Members are not deduplicated.
pub fn merge_as_union(existing: &Schema, incoming: &Schema) -> Schema {
    match &existing.kind {
        SchemaKind::Union(union) => {
            let mut members = union.members.clone();
            members.push(incoming.clone());
            Schema::new(SchemaKind::Union(UnionType {
                members,
                exclusive: union.exclusive,
            }))
            .with_annotations(existing.annotations.clone())
        }
        _ => Schema::union(vec![existing.clone(), incoming.clone()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::infer;
    use serde_json::json;

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_required_set() {
        let object = Schema::object(
            ObjectType::closed()
                .property("a", Schema::string())
                .optional("b", Schema::string()),
        );
        assert_eq!(names(&required_set(&object)), vec!["a"]);

        let both = Schema::intersect(vec![
            object,
            Schema::object(ObjectType::open().property("c", Schema::string())),
        ]);
        assert_eq!(names(&required_set(&both)), vec!["a", "c"]);
        assert!(required_set(&Schema::string()).is_empty());
    }

    #[test]
    fn test_merge_as_intersection_keeps_shared_required() {
        let a = infer(&json!({"a": 1, "b": 2}));
        let b = infer(&json!({"a": 3, "c": 4}));
        let merged = merge_as_intersection(&a, &b);

        assert_eq!(merged.intersect_members().unwrap().len(), 2);
        assert_eq!(names(&required_set(&merged)), vec!["a"]);
        assert!(merged.check(&json!({"a": 1, "b": 2})));
        assert!(merged.check(&json!({"a": 3, "c": 4})));
        assert!(!merged.check(&json!({"b": 2})));
    }

    #[test]
    fn test_merge_as_intersection_leaves_operands_untouched() {
        let a = infer(&json!({"a": 1}));
        let b = infer(&json!({"b": 1}));
        let _ = merge_as_intersection(&a, &b);
        assert!(a.as_object().unwrap().properties["a"].required);
        assert!(!a.as_object().unwrap().additional_properties);
    }

    #[test]
    fn test_flatten_hoists_and_dedups() {
        let nested = Schema::intersect(vec![
            Schema::string(),
            Schema::intersect(vec![Schema::string().with_example(json!("x")), Schema::integer()]),
        ]);
        let flat = flatten_intersection(&nested).unwrap();
        let members = flat.intersect_members().unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.intersect_members().is_none()));
    }

    #[test]
    fn test_flatten_keeps_annotations_of_hoisted_intersections() {
        let inner = Schema::intersect(vec![Schema::integer(), Schema::string()])
            .with_annotation("description", json!("inner"))
            .with_annotation("title", json!("Inner"));
        let outer = Schema::intersect(vec![Schema::boolean(), inner]).with_annotation("title", json!("Outer"));

        let flat = flatten_intersection(&outer).unwrap();
        assert_eq!(flat.intersect_members().map(<[_]>::len), Some(3));
        assert_eq!(flat.annotations.get("description"), Some(&json!("inner")));
        assert_eq!(flat.annotations.get("title"), Some(&json!("Outer")));
    }

    #[test]
    fn test_flatten_collapses_single_survivor() {
        let same = Schema::intersect(vec![
            infer(&json!({"a": 1})),
            infer(&json!({"a": 2})),
        ]);
        let flat = flatten_intersection(&same).unwrap();
        assert!(flat.as_object().is_some());
    }

    #[test]
    fn test_flatten_recurses_into_properties() {
        let schema = Schema::object(ObjectType::closed().property(
            "inner",
            Schema::intersect(vec![Schema::string(), Schema::string()]),
        ));
        let flat = flatten_intersection(&schema).unwrap();
        let inner = &flat.as_object().unwrap().properties["inner"].schema;
        assert!(matches!(inner.kind, SchemaKind::Primitive(_)));
    }

    #[test]
    fn test_flatten_rejects_negated_members() {
        let schema = Schema::intersect(vec![Schema::string(), Schema::not(Schema::null())]);
        let err = flatten_intersection(&schema).unwrap_err();
        assert_eq!(err.fragment(), &json!({"not": {"type": "null"}}));

        assert!(flatten_intersection(&Schema::not(Schema::null())).is_ok());
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let schema = merge_as_intersection(
            &merge_as_intersection(&infer(&json!({"a": 1})), &infer(&json!({"a": 1, "b": true}))),
            &infer(&json!({"c": [1, 2]})),
        );
        let once = flatten_intersection(&schema).unwrap();
        let twice = flatten_intersection(&once).unwrap();
        assert!(structurally_equal(&once, &twice, &[]));
    }

    #[test]
    fn test_merge_as_union() {
        let first = infer(&json!({"a": "x", "b": "y"}));
        let second = infer(&json!({"a": "z"}));
        let union = merge_as_union(&first, &second);
        assert_eq!(union.union_members().unwrap().len(), 2);
        assert!(union.check(&json!({"a": "x", "b": "y"})));
        assert!(union.check(&json!({"a": "z"})));

        let grown = merge_as_union(&union, &infer(&json!(1)));
        assert_eq!(grown.union_members().unwrap().len(), 3);
    }

    #[test]
    fn test_merge_as_union_preserves_exclusivity() {
        let one_of = Schema::one_of(vec![Schema::string()]);
        let grown = merge_as_union(&one_of, &Schema::integer());
        assert!(matches!(&grown.kind, SchemaKind::Union(u) if u.exclusive && u.members.len() == 2));
    }
}
