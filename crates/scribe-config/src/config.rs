//! Main configuration types.
//!
//! This module provides the top-level [`ScribeConfig`] struct, its builder,
//! and the [`RouteKey`] format used by per-route sampling overrides.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, DocumentConfig, LogFormat, LoggingConfig, RouteSamplingConfig, SamplingConfig};

/// Methods accepted in route keys.
pub const ROUTE_METHODS: [&str; 8] = ["GET", "PUT", "POST", "DELETE", "OPTIONS", "HEAD", "PATCH", "TRACE"];

/// Complete Scribe configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use scribe_config::ScribeConfig;
///
/// let config = ScribeConfig::default();
/// assert_eq!(config.document.title, "API");
/// assert!(config.routes.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ScribeConfig {
    /// Document metadata and seed.
    #[serde(default)]
    pub document: DocumentConfig,

    /// Instance-wide sampling.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Sampling overrides keyed by `"METHOD /path"`.
    #[serde(default)]
    pub routes: BTreeMap<String, RouteSamplingConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScribeConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_config::{DocumentConfig, ScribeConfig};
    ///
    /// let config = ScribeConfig::builder()
    ///     .document(DocumentConfig {
    ///         title: "Pets".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.document.title, "Pets");
    /// ```
    #[must_use]
    pub fn builder() -> ScribeConfigBuilder {
        ScribeConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The title or version is empty
    /// - A sampling interval is not in 0.0..=1.0
    /// - A route key is not `METHOD /path`
    /// - The log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document.title.trim().is_empty() {
            return Err(ConfigError::invalid_value("document.title", "must not be empty"));
        }
        if self.document.version.trim().is_empty() {
            return Err(ConfigError::invalid_value("document.version", "must not be empty"));
        }

        check_interval("sampling.interval", self.sampling.interval)?;

        for (key, route) in &self.routes {
            key.parse::<RouteKey>()?;
            if let Some(interval) = route.interval {
                check_interval(&format!("routes.\"{}\".interval", key), interval)?;
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        Ok(())
    }

    /// Route overrides with parsed keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRouteKey` for the first malformed key.
    pub fn route_overrides(&self) -> Result<Vec<(RouteKey, &RouteSamplingConfig)>, ConfigError> {
        self.routes
            .iter()
            .map(|(key, route)| Ok((key.parse()?, route)))
            .collect()
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting with source locations
    /// - Debug log level
    /// - Every response inspected
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_config::ScribeConfig;
    ///
    /// let config = ScribeConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config.sampling.interval = 1.0;
        config.sampling.max_count = None;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON log formatting
    /// - Info log level
    /// - One response in ten inspected, at most 1000 per response
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_config::{LogFormat, ScribeConfig};
    ///
    /// let config = ScribeConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// assert_eq!(config.sampling.max_count, Some(1000));
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;

        config.sampling.interval = 0.1;
        config.sampling.max_count = Some(1000);

        config
    }
}

fn check_interval(field: &str, interval: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&interval) {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(field, "must be between 0.0 and 1.0"))
    }
}

/// A parsed `"METHOD /path"` route key.
///
/// # Example
///
/// ```
/// use scribe_config::RouteKey;
///
/// let key: RouteKey = "get /users/:id".parse().unwrap();
/// assert_eq!(key.method, "GET");
/// assert_eq!(key.path, "/users/:id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    /// Uppercase method.
    pub method: String,
    /// Route path as written.
    pub path: String,
}

impl FromStr for RouteKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((method, path)) = s.trim().split_once(char::is_whitespace) else {
            return Err(ConfigError::invalid_route_key(s, "expected 'METHOD /path'"));
        };

        let method = method.to_ascii_uppercase();
        if !ROUTE_METHODS.contains(&method.as_str()) {
            return Err(ConfigError::invalid_route_key(s, format!("unknown method '{}'", method)));
        }

        let path = path.trim();
        if !path.starts_with('/') {
            return Err(ConfigError::invalid_route_key(s, "path must start with '/'"));
        }

        Ok(Self {
            method,
            path: path.to_string(),
        })
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Builder for [`ScribeConfig`].
#[derive(Debug, Default)]
pub struct ScribeConfigBuilder {
    document: Option<DocumentConfig>,
    sampling: Option<SamplingConfig>,
    routes: BTreeMap<String, RouteSamplingConfig>,
    logging: Option<LoggingConfig>,
}

impl ScribeConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document configuration.
    #[must_use]
    pub fn document(mut self, document: DocumentConfig) -> Self {
        self.document = Some(document);
        self
    }

    /// Set the sampling configuration.
    #[must_use]
    pub fn sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = Some(sampling);
        self
    }

    /// Add a route override.
    #[must_use]
    pub fn route(mut self, key: impl Into<String>, route: RouteSamplingConfig) -> Self {
        self.routes.insert(key.into(), route);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> ScribeConfig {
        ScribeConfig {
            document: self.document.unwrap_or_default(),
            sampling: self.sampling.unwrap_or_default(),
            routes: self.routes,
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<ScribeConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
