//! Deep merge of JSON values, used to overlay instance metadata on a seed.

use serde_json::Value;

/// Merge `overlay` into `base`.
///
/// Where both sides hold an object the keys merge recursively. Otherwise the
/// overlay value replaces the base value; `null` in the overlay is a value
/// like any other.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
