//! File and environment layering tests for [`ConfigLoader`].

use std::fs;

use scribe_config::{ConfigError, ConfigLoader, LogFormat, SamplingModeConfig};

/// Write `content` to `name` inside a fresh temp dir.
fn write_config(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn test_toml_file() {
    let (_dir, path) = write_config(
        "scribe.toml",
        r#"
            [document]
            title = "Orders"
            seed_path = "seed.json"

            [sampling]
            interval = 0.3
            mode = "combine"

            [routes."POST /orders"]
            max_count = 10

            [logging]
            format = "pretty"
        "#,
    );

    let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();

    assert_eq!(config.document.title, "Orders");
    assert_eq!(config.document.seed_path.as_deref(), Some(std::path::Path::new("seed.json")));
    assert_eq!(config.sampling.mode, SamplingModeConfig::Combine);
    assert_eq!(config.routes["POST /orders"].max_count, Some(10));
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_json_file() {
    let (_dir, path) = write_config(
        "scribe.json",
        r#"{"document": {"title": "Orders", "version": "3"}, "sampling": {"max_count": 7}}"#,
    );

    let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
    assert_eq!(config.document.version, "3");
    assert_eq!(config.sampling.max_count, Some(7));
}

#[test]
fn test_unknown_field_in_file() {
    let (_dir, path) = write_config("scribe.toml", "[sampling]\nratio = 0.5\n");
    let result = ConfigLoader::new().with_file(&path);
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_unsupported_extension() {
    let (_dir, path) = write_config("scribe.ini", "title=x");
    let result = ConfigLoader::new().with_file(&path);
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(f)) if f == "ini"));
}

#[test]
fn test_bad_route_key_in_file() {
    let (_dir, path) = write_config("scribe.toml", "[routes.\"FETCH /x\"]\nmax_count = 1\n");
    let result = ConfigLoader::new().with_file(&path).unwrap().load();
    assert!(matches!(result, Err(ConfigError::InvalidRouteKey { .. })));
}

#[test]
fn test_env_overrides_file() {
    let (_dir, path) = write_config("scribe.toml", "[document]\ntitle = \"From file\"\n");

    // A prefix no other test uses, so parallel tests do not see these.
    std::env::set_var("SCRIBE_IT_LAYERING__DOCUMENT__TITLE", "From env");
    std::env::set_var("SCRIBE_IT_LAYERING__SAMPLING__INTERVAL", "0.75");

    let config = ConfigLoader::new()
        .with_file(&path)
        .unwrap()
        .with_env_prefix("scribe_it_layering")
        .load()
        .unwrap();

    assert_eq!(config.document.title, "From env");
    assert!((config.sampling.interval - 0.75).abs() < f64::EPSILON);
}

#[test]
fn test_env_override_is_validated() {
    std::env::set_var("SCRIBE_IT_INVALID__SAMPLING__INTERVAL", "2.5");

    let result = ConfigLoader::new().with_env_prefix("SCRIBE_IT_INVALID").load();
    assert!(matches!(result, Err(ConfigError::InvalidValue { field, .. }) if field == "sampling.interval"));
}
