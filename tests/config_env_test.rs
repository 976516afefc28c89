//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Config::from_env() also loads a .env file
//! via dotenvy when one exists, so these tests only assert on variables they
//! set themselves.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use qa_advisor::config::{Config, LogFormat};
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn test_config_from_env_loads_successfully() {
    let result = Config::from_env();
    assert!(result.is_ok(), "Config::from_env() should succeed with defaults");
}

#[test]
#[serial]
fn test_config_from_env_custom_database() {
    env::set_var("DATABASE_PATH", "/custom/path.db");
    env::set_var("DATABASE_MAX_CONNECTIONS", "10");

    let config = Config::from_env().unwrap();
    assert_eq!(config.database.path.to_str().unwrap(), "/custom/path.db");
    assert_eq!(config.database.max_connections, 10);

    env::remove_var("DATABASE_PATH");
    env::remove_var("DATABASE_MAX_CONNECTIONS");
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    env::set_var("LOG_FORMAT", "JSON");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "something-else");
    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Pretty);

    env::remove_var("LOG_FORMAT");
}

#[test]
#[serial]
fn test_config_from_env_server_address() {
    env::set_var("SERVER_HOST", "0.0.0.0");
    env::set_var("SERVER_PORT", "9100");

    let config = Config::from_env().unwrap();
    let addr = config.server.socket_addr().unwrap();
    assert_eq!(addr.to_string(), "0.0.0.0:9100");

    env::remove_var("SERVER_HOST");
    env::remove_var("SERVER_PORT");
}

#[test]
#[serial]
fn test_config_from_env_invalid_host_is_error() {
    env::set_var("SERVER_HOST", "not a host");

    let result = Config::from_env();
    assert!(result.is_err(), "Unparsable bind address should be rejected");

    env::remove_var("SERVER_HOST");
}

#[test]
#[serial]
fn test_config_from_env_invalid_numbers_fall_back() {
    env::set_var("SERVER_PORT", "not-a-port");
    env::set_var("MAX_UPLOAD_BYTES", "-1");
    env::set_var("CONTEXT_CHAR_LIMIT", "lots");

    let config = Config::from_env().unwrap();
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.limits.max_upload_bytes, 10_485_760);
    assert_eq!(config.limits.context_char_limit, 50_000);

    env::remove_var("SERVER_PORT");
    env::remove_var("MAX_UPLOAD_BYTES");
    env::remove_var("CONTEXT_CHAR_LIMIT");
}

#[test]
#[serial]
fn test_config_from_env_cors_origins() {
    env::set_var("CORS_ALLOWED_ORIGINS", "https://qa.example.com, https://pm.example.com");

    let config = Config::from_env().unwrap();
    assert_eq!(
        config.server.cors_origins,
        vec!["https://qa.example.com", "https://pm.example.com"]
    );
    assert!(!config.server.allows_any_origin());

    env::set_var("CORS_ALLOWED_ORIGINS", "*");
    let config = Config::from_env().unwrap();
    assert!(config.server.allows_any_origin());

    env::remove_var("CORS_ALLOWED_ORIGINS");
}

#[test]
#[serial]
fn test_config_from_env_custom_limits() {
    env::set_var("MAX_UPLOAD_BYTES", "2048");
    env::set_var("CONTEXT_CHAR_LIMIT", "100");

    let config = Config::from_env().unwrap();
    assert_eq!(config.limits.max_upload_bytes, 2048);
    assert_eq!(config.limits.context_char_limit, 100);

    env::remove_var("MAX_UPLOAD_BYTES");
    env::remove_var("CONTEXT_CHAR_LIMIT");
}
