//! Logging setup for Scribe.
//!
//! Scribe's crates emit `tracing` events and never install a subscriber
//! themselves. Hosts that want those events call [`init_logging`] once at
//! startup, or install their own subscriber.
//!
//! # Example
//!
//! ```rust,no_run
//! use scribe_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().with_level("scribe_docs=debug,info"))?;
//! # Ok::<(), scribe_telemetry::TelemetryError>(())
//! ```

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
