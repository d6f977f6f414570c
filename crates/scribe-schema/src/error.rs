//! Error types for schema compilation and the schema algebra.

use serde_json::Value;
use thiserror::Error;

use crate::Schema;

/// Errors raised while compiling or transforming schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A fragment or type-model shape has no compilation or flattening rule.
    #[error("unsupported schema: {reason} (fragment: {fragment})")]
    UnsupportedSchema {
        /// Why the shape was rejected.
        reason: String,
        /// The offending fragment.
        fragment: Value,
    },
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

impl SchemaError {
    /// Reject a JSON Schema fragment.
    pub fn unsupported(reason: impl Into<String>, fragment: &Value) -> Self {
        Self::UnsupportedSchema {
            reason: reason.into(),
            fragment: fragment.clone(),
        }
    }

    /// Reject a type-model node; the node is emitted as the fragment.
    pub fn unsupported_node(reason: impl Into<String>, schema: &Schema) -> Self {
        Self::UnsupportedSchema {
            reason: reason.into(),
            fragment: schema.to_json_schema(),
        }
    }

    /// The offending fragment.
    pub const fn fragment(&self) -> &Value {
        match self {
            Self::UnsupportedSchema { fragment, .. } => fragment,
        }
    }
}
