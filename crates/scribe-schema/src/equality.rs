//! Structural equality over schema nodes.
//!
//! Two schemas are structurally equal when their kinds, children and
//! annotations match. Node identities never participate. Ordered sequences
//! (union/intersect members, tuple items, enum values) compare element-wise
//! in order; object properties and annotations compare as maps.

use serde_json::{Number, Value};

use crate::model::{Annotations, ArrayItems, Schema, SchemaKind};

/// Deep equality, skipping annotation keys listed in `ignored` at every depth.
pub fn structurally_equal(a: &Schema, b: &Schema, ignored: &[&str]) -> bool {
    annotations_equal(&a.annotations, &b.annotations, ignored) && kinds_equal(&a.kind, &b.kind, ignored)
}

/// JSON value equality where numbers compare by numeric value.
///
/// `1` and `1.0` are equal. A NaN compares equal to another NaN so that
/// equality stays reflexive on both sides.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => floats_equal(x, y),
        _ => false,
    }
}

/// Float equality with NaN == NaN.
pub fn floats_equal(a: f64, b: f64) -> bool {
    #[allow(clippy::float_cmp)]
    let equal = a == b;
    equal || (a.is_nan() && b.is_nan())
}

fn annotations_equal(a: &Annotations, b: &Annotations, ignored: &[&str]) -> bool {
    let considered = |(key, _): &(&String, &Value)| !ignored.contains(&key.as_str());
    let left: Vec<_> = a.iter().filter(considered).collect();
    let right_len = b.iter().filter(considered).count();

    left.len() == right_len
        && left
            .into_iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| values_equal(value, other)))
}

fn all_equal(a: &[Schema], b: &[Schema], ignored: &[&str]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| structurally_equal(x, y, ignored))
}

fn kinds_equal(a: &SchemaKind, b: &SchemaKind, ignored: &[&str]) -> bool {
    match (a, b) {
        (SchemaKind::Primitive(x), SchemaKind::Primitive(y)) => x == y,
        (SchemaKind::Literal(x), SchemaKind::Literal(y)) => values_equal(x, y),
        (SchemaKind::Enum(xs), SchemaKind::Enum(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (SchemaKind::Object(x), SchemaKind::Object(y)) => {
            x.additional_properties == y.additional_properties
                && x.properties.len() == y.properties.len()
                && x.properties.iter().all(|(name, px)| {
                    y.properties.get(name).is_some_and(|py| {
                        px.required == py.required && structurally_equal(&px.schema, &py.schema, ignored)
                    })
                })
        }
        (SchemaKind::Array(x), SchemaKind::Array(y)) => {
            x.min_items == y.min_items
                && x.max_items == y.max_items
                && match (&x.items, &y.items) {
                    (ArrayItems::Single(ix), ArrayItems::Single(iy)) => structurally_equal(ix, iy, ignored),
                    (ArrayItems::Tuple(tx), ArrayItems::Tuple(ty)) => all_equal(tx, ty, ignored),
                    _ => false,
                }
        }
        (SchemaKind::Union(x), SchemaKind::Union(y)) => {
            x.exclusive == y.exclusive && all_equal(&x.members, &y.members, ignored)
        }
        (SchemaKind::Intersect(xs), SchemaKind::Intersect(ys)) => all_equal(xs, ys, ignored),
        (SchemaKind::Not(x), SchemaKind::Not(y)) => structurally_equal(x, y, ignored),
        (SchemaKind::Unknown, SchemaKind::Unknown) => true,
        _ => false,
    }
}
