//! Errors raised while loading or validating a [`ScribeConfig`](crate::ScribeConfig).

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("no configuration file at {path}")]
    Missing {
        /// Where the file was expected.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read configuration file {path}")]
    Unreadable {
        /// The file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, or a field the schema does not know.
    #[error("malformed TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or a field the schema does not know.
    #[error("malformed JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither `toml` nor `json`.
    #[error("unsupported configuration format '{0}' (expected toml or json)")]
    UnsupportedFormat(String),

    /// A value outside its allowed range.
    #[error("{field} {reason}")]
    InvalidValue {
        /// Dotted path of the field, e.g. `sampling.interval`.
        field: String,
        /// What the value must satisfy.
        reason: String,
    },

    /// A `routes` key that is not `METHOD /path`.
    #[error("invalid route key '{key}': {reason}")]
    InvalidRouteKey {
        /// The offending key.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable whose value does not parse.
    #[error("environment override {var}: {reason}")]
    Env {
        /// Variable name.
        var: String,
        /// Expected shape of the value.
        reason: String,
    },

    /// A `.env` file that exists but does not parse.
    #[error("cannot load .env: {0}")]
    Dotenv(String),
}

impl ConfigError {
    pub(crate) fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// A field that fails validation.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_route_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRouteKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
