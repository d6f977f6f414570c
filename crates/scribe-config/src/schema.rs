//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Document section.
///
/// Metadata written into the synthesized document's `info` object, and the
/// optional seed document the synthesis starts from.
///
/// # Example
///
/// ```
/// use scribe_config::DocumentConfig;
///
/// let config = DocumentConfig {
///     title: "Pets API".to_string(),
///     seed_path: Some("openapi.yaml".into()),
///     ..Default::default()
/// };
/// assert_eq!(config.version, "1.0.0");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocumentConfig {
    /// API title.
    #[serde(default = "default_title")]
    pub title: String,

    /// API version.
    #[serde(default = "default_version")]
    pub version: String,

    /// API description.
    #[serde(default)]
    pub description: Option<String>,

    /// Seed document (JSON, or YAML for `.yaml`/`.yml`).
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: None,
            seed_path: None,
        }
    }
}

fn default_title() -> String {
    "API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// How response samples the current schema rejects are folded in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SamplingModeConfig {
    /// Intersect with the current schema.
    Combine,
    /// Add another union member.
    #[default]
    Individual,
}

/// Instance-wide sampling section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    /// Probability (0.0 to 1.0) that a response is inspected.
    #[serde(default = "default_interval")]
    pub interval: f64,

    /// Stop inspecting a response after this many samples. None is unlimited.
    #[serde(default)]
    pub max_count: Option<u64>,

    /// Merge mode.
    #[serde(default)]
    pub mode: SamplingModeConfig,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            max_count: None,
            mode: SamplingModeConfig::default(),
        }
    }
}

fn default_interval() -> f64 {
    1.0
}

/// Sampling override for one route. Unset fields use the instance section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RouteSamplingConfig {
    /// Inspection probability for this route.
    #[serde(default)]
    pub interval: Option<f64>,

    /// Sample limit for this route.
    #[serde(default)]
    pub max_count: Option<u64>,

    /// Merge mode for this route.
    #[serde(default)]
    pub mode: Option<SamplingModeConfig>,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, or `scribe_docs=debug,warn`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
