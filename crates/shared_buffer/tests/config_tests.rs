use shared_buffer::{BufferConfig, ConfigError, SharedBuffer};
use std::io::Write;
use std::time::Duration;
use tracing_test::traced_test;

#[test]
#[traced_test]
fn loads_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
    writeln!(file, "wait_timeout_ms = 75").expect("should write");
    writeln!(file, "initial_capacity = 32").expect("should write");

    let config = BufferConfig::from_path(file.path()).expect("should load config");
    assert_eq!(Duration::from_millis(75), config.wait_timeout);
    assert_eq!(32, config.initial_capacity);
    assert!(logs_contain("loaded shared buffer config"));

    let buffer = SharedBuffer::<u8>::from_config(&config);
    assert_eq!(Duration::from_millis(75), buffer.default_wait());
}

#[test]
fn rejects_missing_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let missing = dir.path().join("buffer.toml");

    let result = BufferConfig::from_path(missing.clone());
    match result {
        Err(ConfigError::InvalidPath(path)) => assert_eq!(missing, path),
        other => panic!("expected InvalidPath, got {other:?}"),
    }
}

#[test]
fn rejects_directory_path() {
    let dir = tempfile::tempdir().expect("should create temp dir");

    let result = BufferConfig::from_path(dir.path());
    assert!(matches!(result, Err(ConfigError::InvalidPath(_))));
}

#[test]
fn reports_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
    writeln!(file, "initial_capacity = [").expect("should write");

    let result = BufferConfig::from_path(file.path());
    let err = result.expect_err("should fail to parse");

    assert!(matches!(err, ConfigError::DeserializationFailed(_)));
    assert!(err.to_string().starts_with("DeserializationFailed"));
}
