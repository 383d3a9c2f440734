//! Tests for configuration loading and defaults
//!
//! Tests the config system including:
//! - Config defaults
//! - Tester section parsing and conversion to options
//! - Adapter settings lookup
//! - Save/load round trips and error cases

use crate::config::{Config, Directories, TesterConfig};
use crate::tester::{EMPTY_QUERY, TesterOptions};
use crate::Error;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(!config.tester.download);
    assert!(config.tester.color);
    assert_eq!(config.tester.search_limit, 3);
    assert_eq!(config.tester.empty_query, EMPTY_QUERY);
    assert!(config.adapters.is_empty());
}

#[test]
fn test_config_parse_minimal() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_parse_partial_tester() {
    let json = r#"{
        "tester": {
            "download": true,
            "searchLimit": 10
        }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert!(config.tester.download);
    assert_eq!(config.tester.search_limit, 10);
    assert!(config.tester.color);
    assert_eq!(config.tester.empty_query, EMPTY_QUERY);
}

#[test]
fn test_adapter_settings_lookup() {
    let json = r#"{
        "adapters": {
            "private": {"username": "alice", "password": "hunter2"}
        }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    let settings = config.settings_for("private");
    assert_eq!(settings.get("username").map(String::as_str), Some("alice"));
    assert!(config.settings_for("unknown").is_empty());
}

#[test]
fn test_tester_options_from_config() {
    let config = TesterConfig {
        download: true,
        color: false,
        search_limit: 7,
        empty_query: "zzzz".to_string(),
    };

    let options = TesterOptions::from(&config);
    assert!(options.download);
    assert!(!options.color);
    assert_eq!(options.search_limit, 7);
    assert_eq!(options.empty_query, "zzzz");
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load(&temp_dir.path().join("nope.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_invalid_json_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("config.json"));
}

#[test]
fn test_load_tolerates_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, r#"{"tester": {"download": true, "typo": 1}, "extra": {}}"#).unwrap();

    let config = Config::load(&path).unwrap();
    assert!(config.tester.download);
}

#[test]
fn test_save_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let dirs = Directories::with_base(temp_dir.path().to_path_buf());
    dirs.ensure_exists().unwrap();

    let mut config = Config::default();
    config.tester.download = true;
    config
        .adapters
        .entry("private".to_string())
        .or_default()
        .insert("cookie".to_string(), "session=1".to_string());

    config.save(&dirs.config_file).unwrap();
    let loaded = Config::load(&dirs.config_file).unwrap();

    assert_eq!(loaded, config);
}
