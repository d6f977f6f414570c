//! # Scribe Docs
//!
//! Incremental OpenAPI document synthesis.
//!
//! This crate provides:
//! - **Document model**: [`Document`], an OpenAPI 3.1 document with schemas
//!   and parameters stored once in `components` and referenced from `paths`
//! - **Reference store**: [`ReferenceStore`], stable and deduplicated
//!   component names
//! - **Synthesizer**: [`DocumentSynthesizer`], which records declared
//!   request schemas and evolves response schemas from sampled traffic
//! - **Export** as JSON or YAML, and seeding from an existing document
//!
//! ## Quick Start
//!
//! ```rust
//! use scribe_docs::{Document, DocumentSynthesizer, HttpMethod, Observation, SampleOutcome};
//!
//! let mut synthesizer = DocumentSynthesizer::new(Document::new("Pets", "1.0.0"));
//!
//! let body = br#"{"id": 1, "name": "Rex"}"#;
//! let observation = Observation::new("/pets/:id", HttpMethod::Get, 200)
//!     .content_type("application/json")
//!     .body(body);
//! let outcome = synthesizer.observe_response(&observation);
//! assert!(matches!(outcome, SampleOutcome::Registered { .. }));
//!
//! let json = synthesizer.to_json()?;
//! assert!(json.contains("PetsIdResponse_get_application_json_200"));
//! # Ok::<(), scribe_docs::DocsError>(())
//! ```

mod document;
mod error;
mod overlay;
mod policy;
mod reference;
mod synthesizer;

pub use document::{
    Components, DanglingReference, Document, DocumentFormat, Example, HttpMethod, Info, MediaType, Operation,
    ParameterDescriptor, ParameterEntry, ParameterLocation, PathItem, Reference, RequestBody, Response, SchemaEntry, SchemaRef,
    OPENAPI_VERSION, PARAMETER_REF_PREFIX, SCHEMA_REF_PREFIX,
};
pub use error::{DocsError, DocsResult};
pub use overlay::deep_merge;
pub use policy::{SamplingMode, SamplingPolicy, DEFAULT_SAMPLING_INTERVAL};
pub use reference::{body_component_name, BodyDirection, ParameterSpec, RefContext, ReferenceStore, MAX_NAME_ATTEMPTS};
pub use synthesizer::{
    content_type_essence, openapi_path, path_parameter_names, DeclaredBody, DeclaredOperation, DocumentSynthesizer,
    Observation, SampleOutcome, SkipReason,
};
