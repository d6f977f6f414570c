//! Incremental document synthesis.
//!
//! [`DocumentSynthesizer`] owns the document and folds two kinds of input
//! into it:
//!
//! - **Declarations** from the routing layer ([`DocumentSynthesizer::declare_operation`]):
//!   parameter and request body schemas, written once per operation.
//! - **Observations** of live responses ([`DocumentSynthesizer::observe_response`]):
//!   sampled, inferred and merged into the response schema components.
//!
//! ## Sampling protocol
//!
//! For each observed response:
//!
//! 1. The sampling gate decides whether to inspect it. A response with no
//!    sample count yet is always inspected; otherwise it is skipped once the
//!    count reaches the limit, or when a uniform draw exceeds the interval.
//! 2. The body is decoded (JSON, or `text/*` as a string) and its schema is
//!    inferred.
//! 3. The first sample registers a new schema component.
//! 4. Later samples leave the component alone when it already describes
//!    them, and otherwise widen it by intersection or union depending on
//!    the sampling mode.
//!
//! The synthesizer is a plain `&mut self` state machine; hosts that observe
//! from several threads wrap it in a lock.

use std::collections::HashMap;
use std::sync::OnceLock;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use scribe_schema::{
    compile, first_mismatch, flatten_intersection, infer, merge_as_intersection, merge_as_union, structurally_equal,
    Annotations, Mismatch, Schema, SchemaError, SchemaKind,
};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::document::{
    Document, DocumentFormat, HttpMethod, MediaType, ParameterEntry, ParameterLocation, Reference, RequestBody,
    Response, SchemaEntry, SchemaRef,
};
use crate::error::{DocsError, DocsResult};
use crate::policy::{SamplingMode, SamplingPolicy};
use crate::reference::{body_component_name, BodyDirection, ParameterSpec, RefContext, ReferenceStore};

/// A response seen by the host.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// Route path (`/users/{id}` or `/users/:id`).
    pub path: &'a str,
    /// Request method.
    pub method: HttpMethod,
    /// Response status.
    pub status: u16,
    /// Response `Content-Type`, parameters allowed.
    pub content_type: &'a str,
    /// Raw response body.
    pub body: &'a [u8],
}

impl<'a> Observation<'a> {
    /// An observation with no content type and an empty body.
    pub const fn new(path: &'a str, method: HttpMethod, status: u16) -> Self {
        Self {
            path,
            method,
            status,
            content_type: "",
            body: &[],
        }
    }

    /// Set the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = content_type;
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: &'a [u8]) -> Self {
        self.body = body;
        self
    }
}

/// Why an observation was not folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The sample count reached the limit.
    MaxCountReached,
    /// The random draw exceeded the sampling interval.
    NotDrawn,
    /// The body was empty.
    EmptyBody,
    /// The content type is neither JSON nor text.
    UnsupportedContentType,
    /// The body did not decode as its content type.
    Undecodable,
}

/// What happened to an observation.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// Not inspected.
    Skipped(SkipReason),
    /// First sample; a new component was registered.
    Registered {
        /// The new component.
        component: String,
    },
    /// The referenced component was missing and was recreated from the sample.
    Repaired {
        /// The recreated component.
        component: String,
    },
    /// The sample's schema equals the component's.
    Unchanged {
        /// The component.
        component: String,
    },
    /// The component already accepts the sample.
    Subsumed {
        /// The component.
        component: String,
    },
    /// The component was widened to accept the sample.
    Merged {
        /// The component.
        component: String,
        /// How it was widened.
        mode: SamplingMode,
        /// Where the component first rejected the sample.
        rejected_at: Mismatch,
    },
    /// The response holds an inline schema, which sampling never touches.
    Conflict,
    /// An internal error; the document is unchanged.
    Failed {
        /// What went wrong.
        reason: String,
    },
}

/// A request body declared by the routing layer.
#[derive(Debug, Clone)]
pub struct DeclaredBody {
    /// Content type of the body.
    pub content_type: String,
    /// JSON Schema of the body.
    pub schema: Value,
    /// Whether the body is required.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
}

impl DeclaredBody {
    /// A required body.
    pub fn new(content_type: impl Into<String>, schema: Value) -> Self {
        Self {
            content_type: content_type.into(),
            schema,
            required: true,
            description: None,
        }
    }
}

/// Schemas the routing layer declares for one operation.
///
/// Parameter schemas are JSON Schema objects; each property becomes one
/// parameter, required when listed in `required`.
#[derive(Debug, Clone, Default)]
pub struct DeclaredOperation {
    /// Query parameters.
    pub query: Option<Value>,
    /// Header parameters.
    pub headers: Option<Value>,
    /// Cookie parameters.
    pub cookies: Option<Value>,
    /// Path parameters.
    pub path: Option<Value>,
    /// Request body.
    pub request_body: Option<DeclaredBody>,
    /// Sampling settings for this route.
    pub sampling: Option<SamplingPolicy>,
}

impl DeclaredOperation {
    /// An empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare query parameters.
    #[must_use]
    pub fn query(mut self, schema: Value) -> Self {
        self.query = Some(schema);
        self
    }

    /// Declare header parameters.
    #[must_use]
    pub fn headers(mut self, schema: Value) -> Self {
        self.headers = Some(schema);
        self
    }

    /// Declare cookie parameters.
    #[must_use]
    pub fn cookies(mut self, schema: Value) -> Self {
        self.cookies = Some(schema);
        self
    }

    /// Declare path parameters.
    #[must_use]
    pub fn path_params(mut self, schema: Value) -> Self {
        self.path = Some(schema);
        self
    }

    /// Declare the request body.
    #[must_use]
    pub fn request_body(mut self, body: DeclaredBody) -> Self {
        self.request_body = Some(body);
        self
    }

    /// Override sampling for this route.
    #[must_use]
    pub fn sampling(mut self, policy: SamplingPolicy) -> Self {
        self.sampling = Some(policy);
        self
    }
}

fn colon_param_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":([A-Za-z0-9_]+)").expect("valid regex"))
}

fn brace_param_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}/]+)\}").expect("valid regex"))
}

/// Rewrite `:name` segments as `{name}`.
pub fn openapi_path(path: &str) -> String {
    colon_param_regex().replace_all(path, "{$1}").into_owned()
}

/// Names of the `{name}` / `:name` parameters in a path template, in order.
pub fn path_parameter_names(path: &str) -> Vec<String> {
    brace_param_regex()
        .captures_iter(&openapi_path(path))
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Lowercase media type without parameters.
pub fn content_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(essence: &str) -> bool {
    essence == "application/json" || essence.ends_with("+json")
}

fn decode(body: &[u8], essence: &str) -> Result<Value, SkipReason> {
    if body.is_empty() {
        return Err(SkipReason::EmptyBody);
    }
    if is_json(essence) {
        serde_json::from_slice(body).map_err(|_| SkipReason::Undecodable)
    } else if essence.starts_with("text/") {
        std::str::from_utf8(body)
            .map(|text| Value::String(text.to_string()))
            .map_err(|_| SkipReason::Undecodable)
    } else {
        Err(SkipReason::UnsupportedContentType)
    }
}

/// Builds and evolves one API instance's document.
#[derive(Debug)]
pub struct DocumentSynthesizer {
    document: Document,
    references: ReferenceStore,
    policy: SamplingPolicy,
    routes: HashMap<(String, HttpMethod), SamplingPolicy>,
    rng: StdRng,
}

impl DocumentSynthesizer {
    /// Synthesize into `document` with the built-in sampling defaults.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            references: ReferenceStore::new(),
            policy: SamplingPolicy::unset(),
            routes: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Set the instance sampling policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SamplingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Seed the sampling gate's random source.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Override sampling for one route.
    pub fn set_route_policy(&mut self, path: &str, method: HttpMethod, policy: SamplingPolicy) {
        self.routes.insert((openapi_path(path), method), policy);
    }

    /// The sampling settings in force for a route.
    pub fn effective_policy(&self, path: &str, method: HttpMethod) -> SamplingPolicy {
        let instance = self.policy;
        self.routes
            .get(&(openapi_path(path), method))
            .map_or(instance, |route| route.or(&instance))
    }

    /// The document built so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Give up the synthesizer, keeping the document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// The reference store.
    pub fn references(&self) -> &ReferenceStore {
        &self.references
    }

    /// Compile a schema declared by the routing layer.
    pub fn compile_declared_schema(&self, fragment: &Value) -> DocsResult<Schema> {
        Ok(compile(fragment)?)
    }

    /// Register a parameter component.
    pub fn register_parameter(&mut self, spec: ParameterSpec) -> DocsResult<String> {
        self.references.register_parameter(&mut self.document, spec)
    }

    /// Register a body schema component.
    pub fn register_body(&mut self, name: &str, context: RefContext, schema: &Schema) -> String {
        self.references.register_body(&mut self.document, name, context, schema)
    }

    /// Record the declared schemas of an operation.
    ///
    /// Parameters and the request body are attached only when the operation
    /// has none yet; later declarations of the same operation do not replace
    /// them. Path template parameters without a declared schema become
    /// required string parameters.
    ///
    /// On error the document, the reference store and the route policies are
    /// left as they were.
    pub fn declare_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        declared: DeclaredOperation,
    ) -> DocsResult<()> {
        let path = openapi_path(path);

        let existing = self.document.operation(&path, method);
        let needs_parameters = existing.map_or(true, |op| op.parameters.is_empty());
        let needs_body = existing.map_or(true, |op| op.request_body.is_none());

        let mut specs = Vec::new();
        if needs_parameters {
            let declared_locations = [
                (ParameterLocation::Query, &declared.query),
                (ParameterLocation::Header, &declared.headers),
                (ParameterLocation::Cookie, &declared.cookies),
                (ParameterLocation::Path, &declared.path),
            ];
            for (location, fragment) in declared_locations {
                if let Some(fragment) = fragment {
                    specs.extend(parameter_specs(fragment, location)?);
                }
            }

            for name in path_parameter_names(&path) {
                let has_schema = specs
                    .iter()
                    .any(|spec| spec.location == ParameterLocation::Path && spec.name == name);
                if !has_schema {
                    specs.push(ParameterSpec::new(name, ParameterLocation::Path, Schema::string(), true));
                }
            }
        }

        let body = declared
            .request_body
            .filter(|_| needs_body)
            .map(|body| compile(&body.schema).map(|schema| (body, schema)))
            .transpose()?;

        if !specs.is_empty() {
            let parameters = self.register_parameters(specs)?;
            self.document.operation_mut(&path, method).parameters = parameters;
        }

        if let Some((body, schema)) = body {
            let name = body_component_name(&path, method, BodyDirection::Request, None);
            let name = self
                .references
                .register_body(&mut self.document, &name, RefContext::RequestBody, &schema);

            let mut content = IndexMap::new();
            content.insert(content_type_essence(&body.content_type), MediaType::referencing(&name, None));
            self.document.operation_mut(&path, method).request_body = Some(RequestBody {
                description: body.description,
                required: body.required,
                content,
            });
        }

        if let Some(policy) = declared.sampling {
            self.routes.insert((path.clone(), method), policy);
        }
        self.document.operation_mut(&path, method);
        debug!(path = %path, method = %method, "declared operation");
        Ok(())
    }

    // All or nothing: a naming failure part way through drops the
    // components registered before it.
    fn register_parameters(&mut self, specs: Vec<ParameterSpec>) -> DocsResult<Vec<ParameterEntry>> {
        let saved_store = self.references.clone();
        let saved_components = self.document.components.parameters.clone();

        let mut parameters = Vec::with_capacity(specs.len());
        for spec in specs {
            match self.references.register_parameter(&mut self.document, spec) {
                Ok(name) => parameters.push(Reference::parameter(&name).into()),
                Err(e) => {
                    self.references = saved_store;
                    self.document.components.parameters = saved_components;
                    return Err(e);
                }
            }
        }
        Ok(parameters)
    }

    /// Fold an observed response into the document. Never fails; the
    /// outcome says what happened.
    pub fn observe_response(&mut self, observation: &Observation<'_>) -> SampleOutcome {
        let path = openapi_path(observation.path);
        let method = observation.method;
        let status = observation.status.to_string();
        let content_type = content_type_essence(observation.content_type);
        let policy = self.effective_policy(&path, method);

        let existing = self
            .document
            .response_media(&path, method, &status, &content_type)
            .and_then(|media| media.schema.clone());

        if let Some(SchemaEntry::Reference(SchemaRef {
            sample_count: Some(count),
            ..
        })) = &existing
        {
            if policy.max_count().is_some_and(|max| *count >= max) {
                return SampleOutcome::Skipped(SkipReason::MaxCountReached);
            }
            let draw: f64 = self.rng.gen();
            if draw > policy.interval() {
                return SampleOutcome::Skipped(SkipReason::NotDrawn);
            }
        }

        let value = match decode(observation.body, &content_type) {
            Ok(value) => value,
            Err(reason) => {
                debug!(path = %path, method = %method, status = %status, content_type = %content_type, reason = ?reason, "skipping response sample");
                return SampleOutcome::Skipped(reason);
            }
        };
        let inferred = infer(&value);

        let route = Route {
            path: &path,
            method,
            status: &status,
            content_type: &content_type,
        };
        match existing {
            None => self.register_first_sample(&route, &inferred),
            Some(SchemaEntry::Inline(_)) => {
                let conflict = DocsError::NonReferencedSchemaConflict {
                    path: path.clone(),
                    method: method.to_string(),
                    status: status.clone(),
                    content_type: content_type.clone(),
                };
                warn!(error = %conflict, "leaving inline response schema untouched");
                SampleOutcome::Conflict
            }
            Some(SchemaEntry::Reference(schema_ref)) => {
                self.fold_sample(&route, &schema_ref, &value, &inferred, policy.mode())
            }
        }
    }

    fn register_first_sample(&mut self, route: &Route<'_>, inferred: &Schema) -> SampleOutcome {
        let name = body_component_name(
            route.path,
            route.method,
            BodyDirection::Response,
            Some((route.content_type, route.status)),
        );
        let name = self
            .references
            .register_body(&mut self.document, &name, RefContext::ResponseBody, inferred);
        self.media_mut(route).schema = Some(SchemaEntry::Reference(SchemaRef::new(&name, Some(1))));

        debug!(path = %route.path, method = %route.method, status = %route.status, component = %name, "registered response schema");
        SampleOutcome::Registered { component: name }
    }

    fn fold_sample(
        &mut self,
        route: &Route<'_>,
        schema_ref: &SchemaRef,
        value: &Value,
        inferred: &Schema,
        mode: SamplingMode,
    ) -> SampleOutcome {
        let Some(name) = schema_ref.component_name().map(str::to_string) else {
            error!(reference = %schema_ref.reference, "response references a schema outside components");
            return SampleOutcome::Failed {
                reason: format!("unresolvable reference {}", schema_ref.reference),
            };
        };
        let count = schema_ref.sample_count.unwrap_or(0) + 1;

        let outcome = match self.document.schema(&name) {
            None => {
                warn!(component = %name, "repairing dangling response reference");
                self.references
                    .register_body(&mut self.document, &name, RefContext::ResponseBody, inferred);
                SampleOutcome::Repaired { component: name.clone() }
            }
            Some(current) if structurally_equal(current, inferred, &[Annotations::EXAMPLE]) => {
                SampleOutcome::Unchanged { component: name.clone() }
            }
            Some(current) => match first_mismatch(current, value) {
                None => SampleOutcome::Subsumed { component: name.clone() },
                Some(mismatch) => match widen(current, inferred, mode) {
                    Ok(widened) => {
                        self.references
                            .register_body(&mut self.document, &name, RefContext::ResponseBody, &widened);
                        debug!(
                            component = %name,
                            mode = ?mode,
                            at = %mismatch.path,
                            reason = %mismatch.message,
                            "widened response schema"
                        );
                        SampleOutcome::Merged {
                            component: name.clone(),
                            mode,
                            rejected_at: mismatch,
                        }
                    }
                    Err(e) => {
                        error!(component = %name, error = %e, "failed to merge response sample");
                        return SampleOutcome::Failed { reason: e.to_string() };
                    }
                },
            },
        };

        if let Some(SchemaEntry::Reference(stored)) = &mut self.media_mut(route).schema {
            stored.sample_count = Some(count);
        }
        outcome
    }

    fn media_mut(&mut self, route: &Route<'_>) -> &mut MediaType {
        self.document
            .operation_mut(route.path, route.method)
            .responses
            .entry(route.status.to_string())
            .or_insert_with(|| Response::for_status(route.status))
            .content
            .entry(route.content_type.to_string())
            .or_default()
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        self.document.to_json()
    }

    /// Serialize the document as YAML.
    pub fn to_yaml(&self) -> DocsResult<String> {
        self.document.to_yaml()
    }

    /// Serialize the document in `format`.
    pub fn serialize(&self, format: DocumentFormat) -> DocsResult<String> {
        self.document.serialize_as(format)
    }
}

struct Route<'a> {
    path: &'a str,
    method: HttpMethod,
    status: &'a str,
    content_type: &'a str,
}

fn widen(current: &Schema, inferred: &Schema, mode: SamplingMode) -> Result<Schema, SchemaError> {
    match mode {
        SamplingMode::Combine => flatten_intersection(&merge_as_intersection(current, inferred)),
        SamplingMode::Individual => Ok(merge_as_union(current, inferred)),
    }
}

fn parameter_specs(fragment: &Value, location: ParameterLocation) -> DocsResult<Vec<ParameterSpec>> {
    let schema = compile(fragment)?;
    let object = match schema.kind {
        SchemaKind::Object(object) => object,
        SchemaKind::Unknown => return Ok(Vec::new()),
        _ => {
            return Err(SchemaError::unsupported(
                format!("{} parameters must be declared as an object schema", location),
                fragment,
            )
            .into())
        }
    };

    Ok(object
        .properties
        .into_iter()
        .map(|(name, property)| {
            let description = property
                .schema
                .annotations
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string);
            let required = property.required || location == ParameterLocation::Path;
            let spec = ParameterSpec::new(name, location, property.schema, required);
            match description {
                Some(description) => spec.with_description(description),
                None => spec,
            }
        })
        .collect())
}
