//! # Scribe Schema
//!
//! The typed schema model behind Scribe's document synthesis.
//!
//! This crate provides:
//! - **Type model**: [`Schema`], a closed set of shapes with annotations
//! - **Compilation** of JSON Schema fragments ([`compile`], [`compile_lenient`])
//! - **Inference** of schemas from observed JSON values ([`infer`])
//! - **Conformance** checks ([`check`]) and structural equality
//!   ([`structurally_equal`])
//! - **Schema algebra** for reconciling diverging samples
//!   ([`merge_as_intersection`], [`flatten_intersection`], [`merge_as_union`])
//! - **Emission** back to JSON Schema ([`Schema::to_json_schema`])
//!
//! ## Quick Start
//!
//! ```rust
//! use scribe_schema::{compile, infer, merge_as_union};
//! use serde_json::json;
//!
//! let declared = compile(&json!({
//!     "type": "object",
//!     "properties": {"id": {"type": "integer"}},
//!     "required": ["id"]
//! }))?;
//! assert!(declared.check(&json!({"id": 1})));
//!
//! let observed = infer(&json!({"id": "abc"}));
//! assert!(!declared.check(&json!({"id": "abc"})));
//!
//! let widened = merge_as_union(&declared, &observed);
//! assert!(widened.check(&json!({"id": "abc"})));
//! # Ok::<(), scribe_schema::SchemaError>(())
//! ```

mod algebra;
mod check;
mod compile;
mod emit;
mod equality;
mod error;
mod infer;
mod model;

pub use algebra::{flatten_intersection, merge_as_intersection, merge_as_union, required_set};
pub use check::{check, first_mismatch, is_integral, Mismatch};
pub use compile::{compile, compile_lenient, STRUCTURAL_KEYWORDS};
pub use equality::{floats_equal, structurally_equal, values_equal};
pub use error::{SchemaError, SchemaResult};
pub use infer::{infer, TUPLE_MAX_ITEMS};
pub use model::{
    Annotations, ArrayItems, ArrayType, NodeId, ObjectType, PrimitiveKind, Property, Schema, SchemaKind,
    UnionType,
};
