//! Layered loading: preset, then file, then `PREFIX__SECTION__KEY` variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, SamplingModeConfig, ScribeConfig};

/// Prefix for override variables when none is given.
pub const DEFAULT_ENV_PREFIX: &str = "SCRIBE";

/// Builds a [`ScribeConfig`] from a preset, an optional file and environment
/// overrides. Validation runs once, in [`load`](Self::load).
///
/// # Example
///
/// ```no_run
/// use scribe_config::ConfigLoader;
///
/// # fn main() -> Result<(), scribe_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("scribe.toml")?
///     .with_env_prefix("SCRIBE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: ScribeConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader starting from [`ScribeConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ScribeConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to the defaults.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = ScribeConfig::default();
        self
    }

    /// Reset to [`ScribeConfig::development`].
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ScribeConfig::development();
        self
    }

    /// Reset to [`ScribeConfig::production`]: one sample in ten, capped at 1000.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ScribeConfig::production();
        self
    }

    /// Replace the configuration with the contents of `path`.
    ///
    /// `.toml` and `.json` are accepted. Sections missing from the file take
    /// their defaults, not the values of an earlier layer.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::missing(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Replace the configuration with `content`, parsed as `format`
    /// (`"toml"` or `"json"`).
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [document]
    ///     title = "Pets"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.document.title, "Pets");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::UnsupportedFormat(format.to_string())),
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "SCRIBE":
    /// - `SCRIBE__DOCUMENT__TITLE=Pets`
    /// - `SCRIBE__SAMPLING__INTERVAL=0.25`
    /// - `SCRIBE__SAMPLING__MAX_COUNT=none`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file for environment variables.
    ///
    /// A missing `.env` file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::Dotenv(e.to_string())),
        }
    }

    /// Apply environment overrides, when a prefix is set, then validate.
    pub fn load(mut self) -> Result<ScribeConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without validation.
    #[must_use]
    pub fn load_unvalidated(self) -> ScribeConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<ScribeConfig, ConfigError> {
        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or_default().to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let section_prefix = format!("{prefix}__");
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(&section_prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            // Document section
            ["DOCUMENT", "TITLE"] => {
                self.config.document.title = value.to_string();
            }
            ["DOCUMENT", "VERSION"] => {
                self.config.document.version = value.to_string();
            }
            ["DOCUMENT", "DESCRIPTION"] => {
                self.config.document.description = non_empty(value);
            }
            ["DOCUMENT", "SEED_PATH"] => {
                self.config.document.seed_path = non_empty(value).map(Into::into);
            }

            // Sampling section
            ["SAMPLING", "INTERVAL"] => {
                self.config.sampling.interval = value
                    .parse()
                    .map_err(|_| ConfigError::env(key, "expected float"))?;
            }
            ["SAMPLING", "MAX_COUNT"] => {
                self.config.sampling.max_count = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(
                        value
                            .parse()
                            .map_err(|_| ConfigError::env(key, "expected integer or 'none'"))?,
                    )
                };
            }
            ["SAMPLING", "MODE"] => {
                self.config.sampling.mode = match value.to_lowercase().as_str() {
                    "combine" => SamplingModeConfig::Combine,
                    "individual" => SamplingModeConfig::Individual,
                    _ => return Err(ConfigError::env(key, "expected 'combine' or 'individual'")),
                };
            }

            // Logging section
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled =
                    parse_bool(value).ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env(key, "expected 'json' or 'pretty'")),
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location =
                    parse_bool(value).ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }

            // Unknown keys are left to other consumers of the prefix.
            _ => {}
        }

        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
