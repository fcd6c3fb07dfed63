use std::fs;
use tempfile::TempDir;
use votegraph_core::{ConfigError, ConfigManager, VoteGraphConfig};

/// Keep the host environment from overriding file values.
fn clear_env_overrides() {
    for var in [
        "VOTEGRAPH_LOG_LEVEL",
        "RUST_LOG",
        "VOTEGRAPH_LOG_FORMAT",
        "VOTEGRAPH_OUTPUT_FORMAT",
        "VOTEGRAPH_TOP",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
fn test_default_config_file_loads_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.toml");

    ConfigManager::create_default_config(&path).unwrap();
    assert!(path.exists());

    let manager = ConfigManager::from_path(&path).unwrap();
    assert_eq!(manager.config_path(), Some(path.as_path()));
    assert_eq!(manager.config().output.top, None);
}

#[test]
fn test_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[logging]
level = "debug"
format = "compact"

[output]
format = "json"
top = 25
"#,
    )
    .unwrap();

    clear_env_overrides();
    let manager = ConfigManager::from_path(&path).unwrap();
    let config = manager.config();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "compact");
    assert_eq!(config.output.format, "json");
    assert_eq!(config.output.top, Some(25));
}

#[test]
fn test_invalid_output_format_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[output]\nformat = \"csv\"\n").unwrap();

    clear_env_overrides();

    match ConfigManager::from_path(&path) {
        Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("csv")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("csv output format should be rejected"),
    }
}

#[test]
fn test_zero_top_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[output]\ntop = 0\n").unwrap();

    assert!(matches!(
        ConfigManager::from_path(&path),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[logging\nlevel = ").unwrap();

    assert!(matches!(
        ConfigManager::from_path(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_config_serialization() {
    let config = VoteGraphConfig::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("[logging]"));
    assert!(toml_str.contains("[output]"));

    let parsed: VoteGraphConfig = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed.logging.format, config.logging.format);
    assert_eq!(parsed.output.format, config.output.format);
}
