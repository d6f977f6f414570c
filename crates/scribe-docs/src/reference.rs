//! Reference store: stable component names for schemas and parameters.
//!
//! The store remembers which component name a schema node was registered
//! under, per usage context. Registering the same node again is a lookup.
//! Parameters are additionally deduplicated by content: a new node whose
//! schema and requiredness match an existing component reuses its name.

use std::collections::HashMap;

use scribe_schema::{structurally_equal, Annotations, NodeId, Schema};
use serde_json::Value;
use tracing::debug;

use crate::document::{Document, Example, HttpMethod, ParameterDescriptor, ParameterLocation};
use crate::error::{DocsError, DocsResult};

/// Names probed for a parameter before giving up.
pub const MAX_NAME_ATTEMPTS: usize = 2000;

/// Where a schema is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefContext {
    /// Request body.
    RequestBody,
    /// Response body.
    ResponseBody,
    /// Query parameter.
    Query,
    /// Header parameter.
    Header,
    /// Cookie parameter.
    Cookie,
    /// Path parameter.
    Path,
}

impl From<ParameterLocation> for RefContext {
    fn from(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Query => Self::Query,
            ParameterLocation::Header => Self::Header,
            ParameterLocation::Cookie => Self::Cookie,
            ParameterLocation::Path => Self::Path,
        }
    }
}

/// Which side of an exchange a body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDirection {
    /// Request body.
    Request,
    /// Response body.
    Response,
}

impl BodyDirection {
    /// Name fragment used in generated component names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::Response => "Response",
        }
    }
}

/// A parameter to register.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    pub location: ParameterLocation,
    /// Parameter schema.
    pub schema: Schema,
    /// Whether required.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
}

impl ParameterSpec {
    /// A parameter with no description.
    pub fn new(name: impl Into<String>, location: ParameterLocation, schema: Schema, required: bool) -> Self {
        Self {
            name: name.into(),
            location,
            schema,
            required,
            description: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn matches(&self, existing: &ParameterDescriptor) -> bool {
        existing.name == self.name
            && existing.location == self.location
            && existing.required == self.required
            && structurally_equal(&existing.schema, &self.schema, &[])
    }

    fn into_descriptor(self) -> ParameterDescriptor {
        let example = self.schema.annotations.example().cloned();
        let examples = match (&example, self.schema.annotations.examples()) {
            (None, Some(Value::Array(values))) if !values.is_empty() => Some(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, value)| (format!("example{}", i + 1), Example { value: value.clone() }))
                    .collect(),
            ),
            _ => None,
        };

        ParameterDescriptor {
            name: self.name,
            location: self.location,
            description: self.description,
            required: self.required,
            schema: self.schema,
            example,
            examples,
        }
    }
}

/// Out-of-band map from `(schema node, usage context)` to component name.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    names: HashMap<(NodeId, RefContext), String>,
}

impl ReferenceStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The name `schema` was registered under in `context`.
    pub fn lookup(&self, schema: &Schema, context: RefContext) -> Option<&str> {
        self.names.get(&(schema.id(), context)).map(String::as_str)
    }

    /// Number of recorded `(node, context)` entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    // An entry is written once and never replaced.
    fn record(&mut self, schema: &Schema, context: RefContext, name: &str) {
        self.names
            .entry((schema.id(), context))
            .or_insert_with(|| name.to_string());
    }

    /// Register a parameter in `components.parameters` and return its name.
    ///
    /// Probes `{name}_{location}`, then `{name}_{location}0`,
    /// `{name}_{location}1`, ... An occupied name is reused when its entry
    /// has a structurally equal schema and the same requiredness.
    pub fn register_parameter(&mut self, doc: &mut Document, spec: ParameterSpec) -> DocsResult<String> {
        let context = RefContext::from(spec.location);
        // Clones share a node id, so the recorded component must also be
        // this parameter.
        if let Some(name) = self.lookup(&spec.schema, context) {
            let same_parameter = doc
                .components
                .parameters
                .get(name)
                .is_some_and(|existing| existing.name == spec.name && existing.required == spec.required);
            if same_parameter {
                return Ok(name.to_string());
            }
        }

        let base = format!("{}_{}", spec.name, spec.location);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                format!("{}{}", base, attempt - 1)
            };

            match doc.components.parameters.get(&candidate) {
                Some(existing) if spec.matches(existing) => {
                    debug!(parameter = %candidate, "reusing parameter component");
                    self.record(&spec.schema, context, &candidate);
                    return Ok(candidate);
                }
                Some(_) => continue,
                None => {
                    debug!(parameter = %candidate, "registering parameter component");
                    self.record(&spec.schema, context, &candidate);
                    doc.components
                        .parameters
                        .insert(candidate.clone(), spec.into_descriptor());
                    return Ok(candidate);
                }
            }
        }

        Err(DocsError::ReferenceNamingExhausted {
            base,
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    /// Register a body schema under `name` in `components.schemas`.
    ///
    /// A node already registered in `context` keeps its name and the document
    /// is left alone. Otherwise the component is inserted, replacing any
    /// schema previously stored under `name`.
    pub fn register_body(&mut self, doc: &mut Document, name: &str, context: RefContext, schema: &Schema) -> String {
        if let Some(existing) = self.lookup(schema, context) {
            return existing.to_string();
        }

        debug!(schema = %name, context = ?context, "registering schema component");
        doc.components.schemas.insert(name.to_string(), schema.clone());
        self.record(schema, context, name);
        name.to_string()
    }
}

/// Generated name of a body schema component.
///
/// `{CapitalizedPath}{Request|Response}_{method}`, with
/// `_{contentType}_{status}` appended when `variant` is given. The path part
/// joins the capitalized alphanumeric segments (`/` becomes `Root`); the
/// content type is reduced to `[A-Za-z0-9_]`.
pub fn body_component_name(
    path: &str,
    method: HttpMethod,
    direction: BodyDirection,
    variant: Option<(&str, &str)>,
) -> String {
    let mut name = capitalized_path(path);
    name.push_str(direction.as_str());
    name.push('_');
    name.push_str(method.as_str());

    if let Some((content_type, status)) = variant {
        name.push('_');
        name.push_str(&sanitize(content_type));
        name.push('_');
        name.push_str(status);
    }

    name
}

fn capitalized_path(path: &str) -> String {
    let joined: String = path
        .split('/')
        .map(|segment| segment.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect();

    if joined.is_empty() {
        "Root".to_string()
    } else {
        joined
    }
}

fn sanitize(content_type: &str) -> String {
    content_type
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn language(schema: Schema) -> ParameterSpec {
        ParameterSpec::new("languageCode", ParameterLocation::Query, schema, true)
    }

    #[test]
    fn test_same_node_registers_once() {
        let mut doc = Document::new("t", "1");
        let mut store = ReferenceStore::new();
        let schema = Schema::string();

        let first = store.register_parameter(&mut doc, language(schema.clone())).unwrap();
        let second = store.register_parameter(&mut doc, language(schema)).unwrap();

        assert_eq!(first, "languageCode_query");
        assert_eq!(first, second);
        assert_eq!(doc.components.parameters.len(), 1);
    }

    #[test]
    fn test_location_separates_parameters() {
        let mut doc = Document::new("t", "1");
        let mut store = ReferenceStore::new();
        let schema = Schema::string();

        let query = store.register_parameter(&mut doc, language(schema.clone())).unwrap();
        let header = store
            .register_parameter(
                &mut doc,
                ParameterSpec::new("languageCode", ParameterLocation::Header, schema, true),
            )
            .unwrap();

        assert_eq!(query, "languageCode_query");
        assert_eq!(header, "languageCode_header");
        assert_eq!(doc.components.parameters.len(), 2);
    }

    #[test]
    fn test_collisions_are_disambiguated_and_reused() {
        let mut doc = Document::new("t", "1");
        let mut store = ReferenceStore::new();
        let spec = |schema| ParameterSpec::new("lang", ParameterLocation::Query, schema, false);

        let first = store.register_parameter(&mut doc, spec(Schema::string())).unwrap();
        let second = store.register_parameter(&mut doc, spec(Schema::integer())).unwrap();
        let third = store.register_parameter(&mut doc, spec(Schema::integer())).unwrap();

        assert_eq!(first, "lang_query");
        assert_eq!(second, "lang_query0");
        assert_eq!(third, "lang_query0");
        assert_eq!(doc.components.parameters.len(), 2);
    }

    #[test]
    fn test_requiredness_prevents_reuse() {
        let mut doc = Document::new("t", "1");
        let mut store = ReferenceStore::new();

        store
            .register_parameter(&mut doc, ParameterSpec::new("page", ParameterLocation::Query, Schema::integer(), true))
            .unwrap();
        let optional = store
            .register_parameter(&mut doc, ParameterSpec::new("page", ParameterLocation::Query, Schema::integer(), false))
            .unwrap();
        assert_eq!(optional, "page_query0");
    }

    #[test]
    fn test_cloned_schema_registers_distinct_parameters() {
        let mut doc = Document::new("t", "1");
        let mut store = ReferenceStore::new();
        let shared = Schema::string();

        let a = store
            .register_parameter(&mut doc, ParameterSpec::new("a", ParameterLocation::Query, shared.clone(), true))
            .unwrap();
        let b = store
            .register_parameter(&mut doc, ParameterSpec::new("b", ParameterLocation::Query, shared.clone(), false))
            .unwrap();

        assert_eq!(a, "a_query");
        assert_eq!(b, "b_query");
        assert_eq!(doc.components.parameters["b_query"].name, "b");
        assert!(!doc.components.parameters["b_query"].required);

        // Same name, other requiredness: a new component, not `a_query`.
        let a_optional = store
            .register_parameter(&mut doc, ParameterSpec::new("a", ParameterLocation::Query, shared, false))
            .unwrap();
        assert_eq!(a_optional, "a_query0");
        assert_eq!(doc.components.parameters.len(), 3);
    }

    #[test]
    fn test_naming_exhaustion() {
        let mut doc = Document::new("t", "1");
        let mut store = ReferenceStore::new();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                "id_path".to_string()
            } else {
                format!("id_path{}", attempt - 1)
            };
            doc.components.parameters.insert(
                name,
                ParameterSpec::new("id", ParameterLocation::Path, Schema::boolean(), true).into_descriptor(),
            );
        }

        let err = store
            .register_parameter(&mut doc, ParameterSpec::new("id", ParameterLocation::Path, Schema::string(), true))
            .unwrap_err();
        assert!(matches!(
            err,
            DocsError::ReferenceNamingExhausted { ref base, attempts } if base == "id_path" && attempts == MAX_NAME_ATTEMPTS
        ));
    }

    #[test]
    fn test_parameter_examples_come_from_annotations() {
        let mut doc = Document::new("t", "1");
        let mut store = ReferenceStore::new();

        let schema = Schema::string().with_example(json!("en"));
        let name = store.register_parameter(&mut doc, language(schema)).unwrap();
        assert_eq!(doc.components.parameters[&name].example, Some(json!("en")));

        let schema = Schema::integer().with_annotation(Annotations::EXAMPLES, json!([1, 2]));
        let name = store
            .register_parameter(
                &mut doc,
                ParameterSpec::new("limit", ParameterLocation::Query, schema, false).with_description("page size"),
            )
            .unwrap();
        let descriptor = &doc.components.parameters[&name];
        assert_eq!(descriptor.description.as_deref(), Some("page size"));
        let examples = descriptor.examples.as_ref().unwrap();
        assert_eq!(examples["example2"].value, json!(2));
    }

    #[test]
    fn test_register_body_fast_path_and_overwrite() {
        let mut doc = Document::new("t", "1");
        let mut store = ReferenceStore::new();
        let schema = Schema::string();

        let name = store.register_body(&mut doc, "Thing", RefContext::ResponseBody, &schema);
        assert_eq!(name, "Thing");

        // Same node: the recorded name wins over the one passed in.
        let again = store.register_body(&mut doc, "Other", RefContext::ResponseBody, &schema);
        assert_eq!(again, "Thing");
        assert!(doc.schema("Other").is_none());

        let replacement = Schema::integer();
        store.register_body(&mut doc, "Thing", RefContext::ResponseBody, &replacement);
        assert!(structurally_equal(doc.schema("Thing").unwrap(), &replacement, &[]));
    }

    #[test]
    fn test_body_component_names() {
        assert_eq!(
            body_component_name("/users/{id}", HttpMethod::Get, BodyDirection::Response, Some(("application/json", "200"))),
            "UsersIdResponse_get_application_json_200"
        );
        assert_eq!(
            body_component_name("/", HttpMethod::Post, BodyDirection::Request, None),
            "RootRequest_post"
        );
        assert_eq!(
            body_component_name("/v1/order-items", HttpMethod::Put, BodyDirection::Request, None),
            "V1OrderitemsRequest_put"
        );
        assert_eq!(
            body_component_name("/feed", HttpMethod::Get, BodyDirection::Response, Some(("application/vnd.api+json", "404"))),
            "FeedResponse_get_application_vnd_api_json_404"
        );
    }
}
