//! Typed configuration for Scribe.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`ScribeConfig`] holds every section:
//!
//! - [`DocumentConfig`] - document title, version, description and seed file
//! - [`SamplingConfig`] - instance-wide response sampling
//! - `routes` - [`RouteSamplingConfig`] overrides keyed by `"METHOD /path"`
//! - [`LoggingConfig`] - log level and format
//!
//! # Example
//!
//! ```no_run
//! use scribe_config::ConfigLoader;
//!
//! # fn main() -> Result<(), scribe_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("scribe.toml")?
//!     .with_env_prefix("SCRIBE")
//!     .load()?;
//!
//! println!("Sampling {} of responses", config.sampling.interval);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [document]
//! title = "Pets API"
//! version = "2.1.0"
//! seed_path = "openapi.seed.yaml"
//!
//! [sampling]
//! interval = 0.2
//! max_count = 500
//! mode = "individual"
//!
//! [routes."GET /pets/:id"]
//! interval = 1.0
//! mode = "combine"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Scalar values can be overridden via environment variables using the
//! format `PREFIX__SECTION__KEY`. For example:
//!
//! - `SCRIBE__DOCUMENT__TITLE=Pets`
//! - `SCRIBE__SAMPLING__INTERVAL=0.5`
//! - `SCRIBE__LOGGING__FORMAT=pretty`

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::*;
