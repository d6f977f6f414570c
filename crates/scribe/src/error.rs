//! Facade error type.

use thiserror::Error;

/// Any error a Scribe crate can return.
#[derive(Debug, Error)]
pub enum Error {
    /// Schema compilation error.
    #[error(transparent)]
    Schema(#[from] scribe_schema::SchemaError),

    /// Document synthesis or export error.
    #[error(transparent)]
    Docs(#[from] scribe_docs::DocsError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] scribe_config::ConfigError),

    /// Logging setup error.
    #[error(transparent)]
    Telemetry(#[from] scribe_telemetry::TelemetryError),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_convert_transparently() {
        let err: Error = scribe_docs::DocsError::InvalidMethod("FETCH".to_string()).into();
        assert!(matches!(err, Error::Docs(_)));
        assert!(err.to_string().contains("FETCH"));

        let err: Error = scribe_config::ConfigError::invalid_value("document.title", "must not be empty").into();
        assert_eq!(err.to_string(), "document.title must not be empty");
    }
}
