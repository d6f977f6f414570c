//! Error types for the document synthesis crate.
//!
//! Errors here abort only the call in progress. The sampler never returns
//! them; it reports a [`SampleOutcome`](crate::SampleOutcome) instead.

use std::path::PathBuf;

use scribe_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur while building or (de)serializing a document.
#[derive(Debug, Error)]
pub enum DocsError {
    /// A schema could not be compiled or transformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// No free parameter name was found within the probe bound.
    #[error("no free reference name for '{base}' after {attempts} attempts")]
    ReferenceNamingExhausted {
        /// The first name probed.
        base: String,
        /// How many names were probed.
        attempts: usize,
    },

    /// A response already carries an inline schema that sampling must not touch.
    #[error("response {method} {path} {status} ({content_type}) has an inline schema; refusing to merge samples into it")]
    NonReferencedSchemaConflict {
        /// Route path.
        path: String,
        /// HTTP method.
        method: String,
        /// Response status.
        status: String,
        /// Response content type.
        content_type: String,
    },

    /// JSON (de)serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization failed.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Reading a document file failed.
    #[error("failed to read {path}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Not an HTTP method the document model knows.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
}

impl DocsError {
    /// Create a new I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for document operations.
pub type DocsResult<T> = Result<T, DocsError>;
