//! Algebraic properties of compilation, inference and the schema algebra.

use proptest::prelude::*;
use scribe_schema::{
    compile, compile_lenient, flatten_intersection, infer, merge_as_intersection, merge_as_union, required_set,
    structurally_equal,
};
use serde_json::{json, Map, Value};

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6..1.0e6f64).prop_map(|f| json!(f)),
        "[a-z]{0,8}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]{1,3}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn json_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", json_value(), 0..5)
        .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>()))
}

proptest! {
    #[test]
    fn inferred_schema_accepts_its_value(value in json_value()) {
        prop_assert!(infer(&value).check(&value));
    }

    #[test]
    fn emission_round_trips_through_compiler(value in json_value()) {
        let schema = infer(&value);
        let back = compile_lenient(&schema.to_json_schema());
        prop_assert!(structurally_equal(&schema, &back, &[]));
    }

    #[test]
    fn compilation_is_idempotent(value in json_value()) {
        let fragment = infer(&value).to_json_schema();
        if let (Ok(first), Ok(second)) = (compile(&fragment), compile(&fragment)) {
            prop_assert!(structurally_equal(&first, &second, &[]));
        }
    }

    #[test]
    fn flatten_is_idempotent(a in json_object(), b in json_object(), c in json_object()) {
        let merged = merge_as_intersection(
            &merge_as_intersection(&infer(&a), &infer(&b)),
            &infer(&c),
        );
        let once = flatten_intersection(&merged).unwrap();
        let twice = flatten_intersection(&once).unwrap();
        prop_assert!(structurally_equal(&once, &twice, &[]));
    }

    #[test]
    fn merging_never_grows_the_required_set(a in json_object(), b in json_object()) {
        let (left, right) = (infer(&a), infer(&b));
        let shared: Vec<String> = required_set(&left)
            .intersection(&required_set(&right))
            .cloned()
            .collect();

        let merged = flatten_intersection(&merge_as_intersection(&left, &right)).unwrap();
        for name in required_set(&merged) {
            prop_assert!(shared.contains(&name), "{} became required", name);
        }
    }

    #[test]
    fn union_accepts_both_samples(a in json_value(), b in json_value()) {
        let union = merge_as_union(&infer(&a), &infer(&b));
        prop_assert!(union.check(&a));
        prop_assert!(union.check(&b));
    }

    #[test]
    fn check_never_panics(value in json_value(), other in json_value()) {
        let _ = infer(&value).check(&other);
    }
}
