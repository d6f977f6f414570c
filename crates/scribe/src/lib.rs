//! # Scribe
//!
//! **Schema inference and incremental OpenAPI synthesis**
//!
//! Scribe builds an OpenAPI 3.1 document for a running service:
//!
//! - **Declared schemas** for parameters and request bodies are recorded once
//!   per operation, deduplicated into `components`
//! - **Response schemas** are inferred from sampled traffic and widened as new
//!   shapes appear, by intersection or by union
//! - **Export** as JSON or YAML at any time, optionally starting from a seed
//!   document
//!
//! ## Quick Start
//!
//! ```rust
//! use scribe::prelude::*;
//!
//! let scribe = Scribe::builder().rng_seed(1).build()?;
//!
//! scribe.declare_operation(
//!     "/pets/:id",
//!     HttpMethod::Get,
//!     DeclaredOperation::new().path_params(serde_json::json!({
//!         "type": "object",
//!         "properties": {"id": {"type": "integer"}}
//!     })),
//! )?;
//!
//! let body = br#"{"id": 7, "name": "Rex"}"#;
//! let outcome = scribe.observe_response(
//!     &Observation::new("/pets/:id", HttpMethod::Get, 200)
//!         .content_type("application/json")
//!         .body(body),
//! );
//! assert!(matches!(outcome, SampleOutcome::Registered { .. }));
//!
//! let yaml = scribe.serialize(DocumentFormat::Yaml)?;
//! assert!(yaml.contains("id_path"));
//! # Ok::<(), scribe::Error>(())
//! ```
//!
//! ## Crates
//!
//! ```text
//! scribe-schema     type model, compiler, inference, algebra, emission
//!       ↑
//! scribe-docs       document model, reference store, synthesizer
//!       ↑
//! scribe            facade ← scribe-config, scribe-telemetry
//! ```

#![doc(html_root_url = "https://docs.rs/scribe/0.1.0")]

mod error;
mod instance;

pub use error::{Error, Result};
pub use instance::{
    initial_document, log_config, route_policy, sampling_mode, sampling_policy, Scribe, ScribeBuilder,
    SharedSynthesizer,
};

// Re-export the schema engine
pub use scribe_schema as schema;

// Re-export document synthesis
pub use scribe_docs as docs;

// Re-export configuration
pub use scribe_config as config;

// Re-export logging setup
pub use scribe_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use scribe::prelude::*;
///
/// let config = ScribeConfig::development();
/// let scribe = Scribe::from_config(config)?;
/// assert!(scribe.document().paths.is_empty());
/// # Ok::<(), scribe::Error>(())
/// ```
pub mod prelude {
    pub use crate::{Error, Result, Scribe, ScribeBuilder, SharedSynthesizer};

    // Schema engine
    pub use scribe_schema::{compile, compile_lenient, infer, Schema, SchemaError, SchemaKind};

    // Document synthesis
    pub use scribe_docs::{
        DeclaredBody, DeclaredOperation, DocsError, Document, DocumentFormat, DocumentSynthesizer, HttpMethod,
        Observation, ParameterLocation, SampleOutcome, SamplingMode, SamplingPolicy, SkipReason,
    };

    // Configuration
    pub use scribe_config::{ConfigError, ConfigLoader, ScribeConfig};

    // Logging
    pub use scribe_telemetry::{init_logging, LogConfig};
}
