use super::*;
use std::collections::HashMap;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = StreamConfig::default();
    assert_eq!(config.buffer_capacity, 4096);
    assert_eq!(config.shell, PathBuf::from("/bin/sh"));
    assert_eq!(config.log_level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = StreamConfig::from_toml_str("buffer_capacity = 16\n").unwrap();
    assert_eq!(config.buffer_capacity, 16);
    assert_eq!(config.shell, PathBuf::from(DEFAULT_SHELL));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = StreamConfig::from_toml_str("buffer_capacity = \"lots\"").unwrap_err();
    assert!(matches!(err, StreamError::Config { .. }));
    assert_eq!(err.code(), ErrorCode::CONFIG_PARSE_ERROR);

    let err = StreamConfig::from_toml_str("buffer_capacity = [").unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_PARSE_ERROR);
    assert!(err.user_message().starts_with("[E1002]"));
}

#[test]
fn test_env_overrides() {
    let vars: HashMap<&str, &str> = [
        ("STREAMIO_BUFFER_SIZE", "128"),
        ("STREAMIO_SHELL", "/bin/bash"),
        ("STREAMIO_LOG_LEVEL", "trace"),
    ]
    .into_iter()
    .collect();

    let mut config = StreamConfig::default();
    config.merge_env_from(|key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(config.buffer_capacity, 128);
    assert_eq!(config.shell, PathBuf::from("/bin/bash"));
    assert_eq!(config.log_level, "trace");
}

#[test]
fn test_unparsable_env_size_is_ignored() {
    let mut config = StreamConfig::default();
    config.merge_env_from(|key| (key == "STREAMIO_BUFFER_SIZE").then(|| "big".to_string()));
    assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
}

#[test]
fn test_zero_capacity_rejected() {
    let config = StreamConfig::default().with_buffer_capacity(0);
    let err = config.validate().unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
}

#[test]
fn test_empty_shell_rejected() {
    let mut config = StreamConfig::default();
    config.shell = PathBuf::new();
    let err = config.validate().unwrap_err();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    assert_eq!(
        err.user_message(),
        "[E1003] configuration error: shell must not be empty"
    );
}

#[test]
fn test_load_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("streamio.toml");
    fs::write(&path, "buffer_capacity = 64\nlog_level = \"debug\"\n").unwrap();

    let config = StreamConfig::from_file(&path).unwrap();
    assert_eq!(config.buffer_capacity, 64);
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let result = StreamConfig::load(Some(&temp_dir.path().join("absent.toml")));
    let err = result.unwrap_err();
    assert!(matches!(err, StreamError::Config { .. }));
    assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    assert!(err.to_string().contains("absent.toml"));
}
