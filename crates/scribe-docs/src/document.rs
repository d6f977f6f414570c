//! OpenAPI document model.
//!
//! The document is the output of synthesis: request-side entries are written
//! once when operations are declared, response-side entries evolve as
//! samples are observed. Schemas live in `components` and are pointed to
//! from `paths` by reference.
//!
//! ## OpenAPI 3.1 Compliance
//!
//! Field names and layout follow the OpenAPI 3.1 specification:
//! <https://spec.openapis.org/oas/v3.1.0>. Keys the model does not name are
//! preserved in `extensions` maps so seeded documents survive a round trip.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use scribe_schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocsError, DocsResult};
use crate::overlay::deep_merge;

/// OpenAPI version written into new documents.
pub const OPENAPI_VERSION: &str = "3.1.0";

/// Prefix of references into `components.schemas`.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Prefix of references into `components.parameters`.
pub const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// OpenAPI document root object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// OpenAPI version.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Reusable schemas and parameters.
    #[serde(default)]
    pub components: Components,
    /// Operations by path and method.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Top-level keys the model does not name (servers, tags, ...).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// API metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Other info keys (contact, license, ...).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Reusable components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    /// Schemas by reference name.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    /// Parameters by reference name.
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterDescriptor>,
    /// Other component sections.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Operations of one path.
///
/// Path-level keys (`parameters`, `summary`, `servers`, ...) are kept in
/// `extensions` and written back unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// Path-level keys the model does not name.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl PathItem {
    /// The operation for `method`.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// The slot holding the operation for `method`.
    pub fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        }
    }

    /// Present operations, in method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

/// HTTP methods an OpenAPI path item can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET.
    Get,
    /// PUT.
    Put,
    /// POST.
    Post,
    /// DELETE.
    Delete,
    /// OPTIONS.
    Options,
    /// HEAD.
    Head,
    /// PATCH.
    Patch,
    /// TRACE.
    Trace,
}

impl HttpMethod {
    /// Every method, in path item order.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Lowercase name, as used for path item keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            "HEAD" => Ok(Self::Head),
            "PATCH" => Ok(Self::Patch),
            "TRACE" => Ok(Self::Trace),
            _ => Err(DocsError::InvalidMethod(s.to_string())),
        }
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string parameter.
    Query,
    /// HTTP header.
    Header,
    /// URL path parameter.
    Path,
    /// Cookie.
    Cookie,
}

impl ParameterLocation {
    /// Lowercase name, as used in `in` and in generated names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
            Self::Path => "path",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter stored in `components.parameters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    pub schema: Schema,
    /// A single example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Named examples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, Example>>,
}

/// A named example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// The example value.
    pub value: Value,
}

/// A bare `$ref` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    /// Reference target.
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl Reference {
    /// Reference a parameter component.
    pub fn parameter(name: &str) -> Self {
        Self {
            reference: format!("{}{}", PARAMETER_REF_PREFIX, name),
        }
    }
}

/// An entry of an operation's `parameters` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterEntry {
    /// Pointer into `components.parameters`.
    Reference(Reference),
    /// A parameter object written in place, as found in a seed.
    Inline(Value),
}

impl ParameterEntry {
    /// The reference target, for referencing entries.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Reference(reference) => Some(&reference.reference),
            Self::Inline(_) => None,
        }
    }
}

impl From<Reference> for ParameterEntry {
    fn from(reference: Reference) -> Self {
        Self::Reference(reference)
    }
}

/// An API operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Parameters, by reference or inline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterEntry>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    /// Other operation keys (summary, operationId, tags, ...).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Response definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Description (required by OpenAPI).
    pub description: String,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    /// Other response keys (headers, links, ...).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Response {
    /// An empty response for `status`.
    pub fn for_status(status: &str) -> Self {
        Self {
            description: format!("{} response", status),
            content: IndexMap::new(),
            extensions: IndexMap::new(),
        }
    }
}

/// Media type content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaEntry>,
    /// Other media type keys (example, encoding, ...).
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl MediaType {
    /// Media type pointing at a schema component.
    pub fn referencing(name: &str, sample_count: Option<u64>) -> Self {
        Self {
            schema: Some(SchemaEntry::Reference(SchemaRef::new(name, sample_count))),
            extensions: IndexMap::new(),
        }
    }
}

/// A media type schema: a component reference or an inline schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaEntry {
    /// `{"$ref": ..., "x-sample-count": n}`.
    Reference(SchemaRef),
    /// A schema written in place.
    Inline(Schema),
}

/// Reference to a schema component, with the number of samples folded into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    /// Reference target.
    #[serde(rename = "$ref")]
    pub reference: String,
    /// Samples observed for this response so far.
    #[serde(default, rename = "x-sample-count", skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u64>,
}

impl SchemaRef {
    /// Reference the schema component `name`.
    pub fn new(name: &str, sample_count: Option<u64>) -> Self {
        Self {
            reference: format!("{}{}", SCHEMA_REF_PREFIX, name),
            sample_count,
        }
    }

    /// The component name, when this points into `components.schemas`.
    pub fn component_name(&self) -> Option<&str> {
        self.reference.strip_prefix(SCHEMA_REF_PREFIX)
    }
}

/// A reference in `paths` with no matching component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Path holding the reference.
    pub path: String,
    /// Method holding the reference.
    pub method: HttpMethod,
    /// The unresolved target.
    pub reference: String,
}

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension (`.yaml`/`.yml` → YAML, else JSON).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

impl Document {
    /// An empty document.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: title.into(),
                version: version.into(),
                description: None,
                extensions: IndexMap::new(),
            },
            components: Components::default(),
            paths: IndexMap::new(),
            extensions: IndexMap::new(),
        }
    }

    /// Build a document from a seed with `overlay` deep-merged on top.
    ///
    /// Objects merge key by key; any other overlay value replaces the seed's.
    /// Schemas the compiler cannot model are kept verbatim.
    pub fn seeded(mut seed: Value, overlay: Value) -> DocsResult<Self> {
        deep_merge(&mut seed, overlay);
        Ok(serde_json::from_value(seed)?)
    }

    /// Read a seed document from a JSON or YAML file (by extension).
    pub fn read_seed(path: impl AsRef<Path>) -> DocsResult<Value> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;
        match DocumentFormat::from_path(path) {
            DocumentFormat::Json => Ok(serde_json::from_str(&text)?),
            DocumentFormat::Yaml => Ok(serde_yaml::from_str(&text)?),
        }
    }

    /// Parse a document.
    pub fn parse(text: &str, format: DocumentFormat) -> DocsResult<Self> {
        match format {
            DocumentFormat::Json => Ok(serde_json::from_str(text)?),
            DocumentFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        }
    }

    /// The operation at `path` and `method`.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.operation(method))
    }

    /// The operation at `path` and `method`, created empty if missing.
    pub fn operation_mut(&mut self, path: &str, method: HttpMethod) -> &mut Operation {
        self.paths
            .entry(path.to_string())
            .or_default()
            .slot_mut(method)
            .get_or_insert_with(Operation::default)
    }

    /// The media type for a response, if present.
    pub fn response_media(
        &self,
        path: &str,
        method: HttpMethod,
        status: &str,
        content_type: &str,
    ) -> Option<&MediaType> {
        self.operation(path, method)?
            .responses
            .get(status)?
            .content
            .get(content_type)
    }

    /// A schema component by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.schemas.get(name)
    }

    /// Every reference in `paths` whose target component does not exist.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        for (path, item) in &self.paths {
            for (method, operation) in item.operations() {
                let mut report = |reference: &str| {
                    dangling.push(DanglingReference {
                        path: path.clone(),
                        method,
                        reference: reference.to_string(),
                    });
                };

                for reference in operation.parameters.iter().filter_map(ParameterEntry::reference) {
                    let resolved = reference
                        .strip_prefix(PARAMETER_REF_PREFIX)
                        .is_some_and(|name| self.components.parameters.contains_key(name));
                    if !resolved {
                        report(reference);
                    }
                }

                let request_media = operation
                    .request_body
                    .iter()
                    .flat_map(|body| body.content.values());
                let response_media = operation
                    .responses
                    .values()
                    .flat_map(|response| response.content.values());

                for media in request_media.chain(response_media) {
                    if let Some(SchemaEntry::Reference(schema_ref)) = &media.schema {
                        let resolved = schema_ref
                            .component_name()
                            .is_some_and(|name| self.components.schemas.contains_key(name));
                        if !resolved {
                            report(&schema_ref.reference);
                        }
                    }
                }
            }
        }

        dangling
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        serde_json::to_string_pretty(self).map_err(DocsError::from)
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> DocsResult<String> {
        serde_yaml::to_string(self).map_err(DocsError::from)
    }

    /// Serialize in `format`.
    pub fn serialize_as(&self, format: DocumentFormat) -> DocsResult<String> {
        match format {
            DocumentFormat::Json => self.to_json(),
            DocumentFormat::Yaml => self.to_yaml(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_schema::ObjectType;
    use serde_json::json;

    fn sample_document() -> Document {
        let mut doc = Document::new("Pets", "1.0.0");
        doc.components.schemas.insert(
            "Pet".to_string(),
            Schema::object(ObjectType::closed().property("id", Schema::integer())),
        );
        doc.operation_mut("/pets", HttpMethod::Get)
            .responses
            .entry("200".to_string())
            .or_insert_with(|| Response::for_status("200"))
            .content
            .insert("application/json".to_string(), MediaType::referencing("Pet", Some(3)));
        doc
    }

    #[test]
    fn test_http_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!(matches!("FETCH".parse::<HttpMethod>(), Err(DocsError::InvalidMethod(m)) if m == "FETCH"));
    }

    #[test]
    fn test_parameter_location_serialization() {
        assert_eq!(serde_json::to_string(&ParameterLocation::Query).unwrap(), "\"query\"");
        assert_eq!(serde_json::to_string(&ParameterLocation::Cookie).unwrap(), "\"cookie\"");
    }

    #[test]
    fn test_document_layout() {
        let json: Value = serde_json::from_str(&sample_document().to_json().unwrap()).unwrap();

        assert_eq!(json["openapi"], "3.1.0");
        assert_eq!(json["info"]["title"], "Pets");
        assert_eq!(
            json["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
            json!({"$ref": "#/components/schemas/Pet", "x-sample-count": 3})
        );
        assert_eq!(json["components"]["schemas"]["Pet"]["additionalProperties"], false);
    }

    #[test]
    fn test_yaml_round_trip() {
        let doc = sample_document();
        let parsed = Document::parse(&doc.to_yaml().unwrap(), DocumentFormat::Yaml).unwrap();
        assert_eq!(parsed.to_json().unwrap(), doc.to_json().unwrap());
    }

    #[test]
    fn test_json_round_trip_preserves_unknown_keys() {
        let text = json!({
            "openapi": "3.1.0",
            "info": {"title": "T", "version": "1", "contact": {"name": "ops"}},
            "servers": [{"url": "https://api.example.com"}],
            "paths": {
                "/a": {"get": {"operationId": "getA", "responses": {"200": {"description": "ok"}}}}
            }
        })
        .to_string();

        let doc = Document::parse(&text, DocumentFormat::Json).unwrap();
        assert!(doc.extensions.contains_key("servers"));
        assert!(doc.info.extensions.contains_key("contact"));
        assert_eq!(
            doc.operation("/a", HttpMethod::Get).unwrap().extensions["operationId"],
            "getA"
        );

        let back: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back["servers"][0]["url"], "https://api.example.com");
    }

    #[test]
    fn test_inline_schema_entry() {
        let media: MediaType = serde_json::from_value(json!({"schema": {"type": "string"}})).unwrap();
        assert!(matches!(media.schema, Some(SchemaEntry::Inline(_))));

        let media: MediaType =
            serde_json::from_value(json!({"schema": {"$ref": "#/components/schemas/X", "x-sample-count": 2}}))
                .unwrap();
        match media.schema {
            Some(SchemaEntry::Reference(r)) => {
                assert_eq!(r.component_name(), Some("X"));
                assert_eq!(r.sample_count, Some(2));
            }
            other => panic!("expected reference, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_references() {
        let mut doc = sample_document();
        assert!(doc.dangling_references().is_empty());

        doc.operation_mut("/pets", HttpMethod::Get)
            .parameters
            .push(Reference::parameter("limit_query").into());
        doc.components.schemas.shift_remove("Pet");

        let dangling = doc.dangling_references();
        assert_eq!(dangling.len(), 2);
        assert!(dangling.iter().all(|d| d.path == "/pets" && d.method == HttpMethod::Get));
        assert!(dangling.iter().any(|d| d.reference == "#/components/schemas/Pet"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("seed.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("seed.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("seed.json")), DocumentFormat::Json);
    }

    #[test]
    fn test_seeded_document_overlays_info() {
        let seed = json!({
            "openapi": "3.1.0",
            "info": {"title": "Seed", "version": "0.1", "description": "from seed"},
            "components": {"schemas": {"Ext": {"$ref": "other.json#/Ext"}}}
        });
        let doc = Document::seeded(seed, json!({"info": {"title": "Live", "version": "2.0"}})).unwrap();

        assert_eq!(doc.info.title, "Live");
        assert_eq!(doc.info.version, "2.0");
        assert_eq!(doc.info.description.as_deref(), Some("from seed"));
        assert_eq!(
            doc.schema("Ext").unwrap().to_json_schema(),
            json!({"$ref": "other.json#/Ext"})
        );
    }

    #[test]
    fn test_seed_with_path_level_keys() {
        let seed = json!({
            "openapi": "3.1.0",
            "info": {"title": "Seed", "version": "1"},
            "paths": {
                "/users/{id}": {
                    "summary": "One user",
                    "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
                    "servers": [{"url": "https://users.example.com"}],
                    "get": {"responses": {"200": {"description": "ok"}}}
                }
            }
        });
        let doc = Document::seeded(seed.clone(), json!({})).unwrap();

        let item = &doc.paths["/users/{id}"];
        assert_eq!(item.extensions["summary"], "One user");
        assert!(item.operation(HttpMethod::Get).is_some());
        assert!(item.operation(HttpMethod::Post).is_none());

        let json: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["paths"], seed["paths"]);
    }

    #[test]
    fn test_seed_with_inline_operation_parameters() {
        let inline = json!({"name": "q", "in": "query", "style": "form", "schema": {"type": "string"}});
        let described = json!({"$ref": "#/components/parameters/gone", "description": "legacy"});
        let seed = json!({
            "openapi": "3.1.0",
            "info": {"title": "Seed", "version": "1"},
            "paths": {
                "/search": {"get": {
                    "parameters": [inline, {"$ref": "#/components/parameters/page"}, described],
                    "responses": {"200": {"description": "ok"}}
                }}
            }
        });
        let doc = Document::seeded(seed, json!({})).unwrap();

        let parameters = &doc.operation("/search", HttpMethod::Get).unwrap().parameters;
        assert_eq!(parameters[0], ParameterEntry::Inline(inline.clone()));
        assert_eq!(parameters[1].reference(), Some("#/components/parameters/page"));
        assert_eq!(parameters[2], ParameterEntry::Inline(described));

        let dangling = doc.dangling_references();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].reference, "#/components/parameters/page");

        let json: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["paths"]["/search"]["get"]["parameters"][0], inline);
    }
}
