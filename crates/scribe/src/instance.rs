//! A configured synthesis instance.
//!
//! [`Scribe`] wires a [`ScribeConfig`] to a [`DocumentSynthesizer`]: it builds
//! the starting document (fresh, or a seed file with the configured `info`
//! laid over it), installs the instance and per-route sampling policies, and
//! optionally sets up logging. The synthesizer sits behind a
//! [`SharedSynthesizer`] so request handlers on any thread can feed it.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use scribe_config::{LogFormat, LoggingConfig, RouteSamplingConfig, SamplingConfig, SamplingModeConfig, ScribeConfig};
use scribe_docs::{
    DeclaredOperation, DocsError, Document, DocumentFormat, DocumentSynthesizer, HttpMethod, Observation,
    SampleOutcome, SamplingMode, SamplingPolicy,
};
use scribe_telemetry::LogConfig;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::Result;

/// A synthesizer shared between threads.
pub type SharedSynthesizer = Arc<Mutex<DocumentSynthesizer>>;

/// Map a configured mode onto the synthesizer's.
pub const fn sampling_mode(mode: SamplingModeConfig) -> SamplingMode {
    match mode {
        SamplingModeConfig::Combine => SamplingMode::Combine,
        SamplingModeConfig::Individual => SamplingMode::Individual,
    }
}

/// The instance sampling policy for a `[sampling]` section.
pub fn sampling_policy(config: &SamplingConfig) -> SamplingPolicy {
    let policy = SamplingPolicy::unset()
        .with_interval(config.interval)
        .with_mode(sampling_mode(config.mode));
    match config.max_count {
        Some(max_count) => policy.with_max_count(max_count),
        None => policy,
    }
}

/// The route sampling layer for one `[routes]` entry.
pub fn route_policy(config: &RouteSamplingConfig) -> SamplingPolicy {
    SamplingPolicy {
        interval: config.interval,
        max_count: config.max_count,
        mode: config.mode.map(sampling_mode),
    }
}

/// Logging settings for a `[logging]` section.
pub fn log_config(config: &LoggingConfig) -> LogConfig {
    let base = match config.format {
        LogFormat::Json => LogConfig::production(),
        LogFormat::Pretty => LogConfig::development(),
    };
    LogConfig {
        enabled: config.enabled,
        level: config.level.clone(),
        file_line_info: config.include_location,
        ..base
    }
}

/// The starting document for a configuration.
///
/// With a seed path the seed is read and the configured title, version and
/// description are merged over its `info`; otherwise a fresh document is
/// created.
pub fn initial_document(config: &ScribeConfig) -> Result<Document> {
    let document = &config.document;

    let Some(seed_path) = &document.seed_path else {
        let mut fresh = Document::new(&document.title, &document.version);
        fresh.info.description = document.description.clone();
        return Ok(fresh);
    };

    let seed = Document::read_seed(seed_path)?;
    let mut info = Map::new();
    info.insert("title".to_string(), Value::String(document.title.clone()));
    info.insert("version".to_string(), Value::String(document.version.clone()));
    if let Some(description) = &document.description {
        info.insert("description".to_string(), Value::String(description.clone()));
    }

    debug!(seed = %seed_path.display(), "seeding document");
    Ok(Document::seeded(seed, json!({ "info": info }))?)
}

/// Builder for [`Scribe`].
#[derive(Debug, Default)]
pub struct ScribeBuilder {
    config: ScribeConfig,
    document: Option<Document>,
    rng_seed: Option<u64>,
    init_logging: bool,
}

impl ScribeBuilder {
    /// Create a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config`.
    #[must_use]
    pub fn config(mut self, config: ScribeConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from `document` instead of the configured seed.
    #[must_use]
    pub fn document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    /// Seed the sampling gate for reproducible runs.
    #[must_use]
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Install the global log subscriber from the `[logging]` section.
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// Build the instance.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, the seed cannot be read, or
    /// logging cannot be installed.
    pub fn build(self) -> Result<Scribe> {
        self.config.validate()?;

        if self.init_logging {
            scribe_telemetry::init_logging(&log_config(&self.config.logging))?;
        }

        let document = match self.document {
            Some(document) => document,
            None => initial_document(&self.config)?,
        };

        let mut synthesizer = DocumentSynthesizer::new(document).with_policy(sampling_policy(&self.config.sampling));
        if let Some(seed) = self.rng_seed {
            synthesizer = synthesizer.with_seed(seed);
        }
        for (key, route) in self.config.route_overrides()? {
            let method: HttpMethod = key.method.parse()?;
            synthesizer.set_route_policy(&key.path, method, route_policy(route));
        }

        info!(
            title = %self.config.document.title,
            routes = self.config.routes.len(),
            "scribe instance ready"
        );
        Ok(Scribe {
            synthesizer: Arc::new(Mutex::new(synthesizer)),
        })
    }
}

/// A configured synthesis instance. Cloning shares the synthesizer.
#[derive(Debug, Clone)]
pub struct Scribe {
    synthesizer: SharedSynthesizer,
}

impl Scribe {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> ScribeBuilder {
        ScribeBuilder::new()
    }

    /// Build an instance from `config`.
    pub fn from_config(config: ScribeConfig) -> Result<Self> {
        ScribeBuilder::new().config(config).build()
    }

    /// The shared synthesizer.
    pub fn synthesizer(&self) -> SharedSynthesizer {
        Arc::clone(&self.synthesizer)
    }

    /// Record the declared schemas of an operation.
    pub fn declare_operation(&self, path: &str, method: HttpMethod, declared: DeclaredOperation) -> Result<()> {
        Ok(self.synthesizer.lock().declare_operation(path, method, declared)?)
    }

    /// Fold an observed response into the document.
    pub fn observe_response(&self, observation: &Observation<'_>) -> SampleOutcome {
        self.synthesizer.lock().observe_response(observation)
    }

    /// A snapshot of the document.
    pub fn document(&self) -> Document {
        self.synthesizer.lock().document().clone()
    }

    /// Serialize the document in `format`.
    pub fn serialize(&self, format: DocumentFormat) -> Result<String> {
        Ok(self.synthesizer.lock().serialize(format)?)
    }

    /// Write the document to `path`, as YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.serialize(DocumentFormat::from_path(path))?;
        std::fs::write(path, text).map_err(|e| DocsError::io(path, e))?;
        debug!(path = %path.display(), "wrote document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_policy_conversion() {
        let policy = sampling_policy(&SamplingConfig {
            interval: 0.5,
            max_count: Some(9),
            mode: SamplingModeConfig::Combine,
        });
        assert_eq!(policy.max_count(), Some(9));
        assert_eq!(policy.mode(), SamplingMode::Combine);
        assert!((policy.interval() - 0.5).abs() < f64::EPSILON);

        let unlimited = sampling_policy(&SamplingConfig::default());
        assert_eq!(unlimited.max_count(), None);
    }

    #[test]
    fn test_route_policy_keeps_unset_fields() {
        let policy = route_policy(&RouteSamplingConfig {
            max_count: Some(1),
            ..Default::default()
        });
        assert_eq!(policy, SamplingPolicy::unset().with_max_count(1));
    }

    #[test]
    fn test_log_config_conversion() {
        let config = log_config(&LoggingConfig {
            enabled: true,
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
        });
        assert!(!config.json_format);
        assert!(!config.file_line_info);
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn test_initial_document_without_seed() {
        let mut config = ScribeConfig::default();
        config.document.title = "Pets".to_string();
        config.document.description = Some("pet store".to_string());

        let document = initial_document(&config).unwrap();
        assert_eq!(document.info.title, "Pets");
        assert_eq!(document.info.description.as_deref(), Some("pet store"));
        assert!(document.paths.is_empty());
    }

    #[test]
    fn test_build_applies_route_overrides() {
        let config = ScribeConfig::builder()
            .route(
                "get /pets/:id",
                RouteSamplingConfig {
                    max_count: Some(2),
                    ..Default::default()
                },
            )
            .build();
        let scribe = Scribe::from_config(config).unwrap();

        let synthesizer = scribe.synthesizer();
        let policy = synthesizer.lock().effective_policy("/pets/{id}", HttpMethod::Get);
        assert_eq!(policy.max_count(), Some(2));
    }
}
