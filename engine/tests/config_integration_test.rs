//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be loaded from disk,
//! validated, and processed with path expansion.

use concierge_engine::config::Config;
use sdk::errors::EngineError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_toml_parsing() {
    let file = write_config(
        r#"
[core]
log_level = "debug"
venue_data = "/srv/venues/riverside.json"

[invoker]
timeout_ms = 2500

[planning.route]
per_stop_minutes = 12
per_floor_minutes = 4

[planning.schedule]
travel_buffer_minutes = 10
min_stop_minutes = 20

[planning.schedule.base_minutes]
Food = 45
Arcade = 30

[planning.constraints]
lower_floor_threshold = 3
"#,
    );

    let config = Config::load_from_path(file.path()).unwrap();

    assert_eq!(config.core.log_level, "debug");
    assert_eq!(
        config.core.venue_data.as_deref(),
        Some(std::path::Path::new("/srv/venues/riverside.json"))
    );
    assert_eq!(config.invoker.timeout_ms, 2500);
    assert_eq!(config.planning.route.per_stop_minutes, 12);
    // unspecified keys keep their defaults
    assert_eq!(config.planning.route.accessible_per_stop_minutes, 20);
    assert_eq!(config.planning.schedule.travel_buffer_minutes, 10);
    assert_eq!(config.planning.schedule.base_for("food"), 45);
    assert_eq!(config.planning.schedule.base_for("ARCADE"), 30);
    assert_eq!(config.planning.constraints.lower_floor_threshold, 3);
}

#[test]
fn test_empty_config_uses_defaults() {
    let file = write_config("");
    let config = Config::load_from_path(file.path()).unwrap();

    assert_eq!(config.core.log_level, "info");
    assert!(config.core.venue_data.is_none());
    assert_eq!(config.invoker.timeout_ms, 10_000);
    assert_eq!(config.planning.route.per_stop_minutes, 15);
    assert_eq!(config.planning.route.per_floor_minutes, 3);
    assert_eq!(config.planning.schedule.base_for("Food"), 60);
    assert_eq!(config.planning.schedule.base_for("Jewelry"), 35);
    assert_eq!(config.planning.schedule.base_for("Pet Supplies"), 25);
    assert_eq!(config.planning.constraints.lower_floor_threshold, 2);
}

#[test]
fn test_invalid_log_level() {
    let file = write_config("[core]\nlog_level = \"loud\"\n");
    let err = Config::load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, EngineError::Config(msg) if msg.contains("Invalid log level")));
}

#[test]
fn test_zero_timeout_rejected() {
    let file = write_config("[invoker]\ntimeout_ms = 0\n");
    assert!(Config::load_from_path(file.path()).is_err());
}

#[test]
fn test_malformed_toml() {
    let file = write_config("[core\nlog_level = ");
    let err = Config::load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, EngineError::Config(msg) if msg.contains("Failed to parse")));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load_from_path(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn test_tilde_expansion() {
    let file = write_config("[core]\nvenue_data = \"~/venues/plaza.json\"\n");
    let config = Config::load_from_path(file.path()).unwrap();

    let venue = config.core.venue_data.unwrap();
    assert!(!venue.to_string_lossy().starts_with('~'));
    assert!(venue.ends_with("venues/plaza.json"));
}
