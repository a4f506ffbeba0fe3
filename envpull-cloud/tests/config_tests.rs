use envpull_cloud::config::*;
use envpull_cloud::PullError;
use serial_test::serial;
use std::path::PathBuf;

fn clear_env() {
    for name in [
        ENV_API_URL,
        ENV_KEYS_HOST,
        ENV_WORKSPACE_FILE,
        ENV_OUTPUT_FILE,
        ENV_CREDENTIALS,
        ENV_TIMEOUT_SECS,
        ENV_TOKEN,
    ] {
        // SAFETY: env-mutating tests are serialized with #[serial].
        unsafe { std::env::remove_var(name) };
    }
}

fn set(name: &str, value: &str) {
    // SAFETY: env-mutating tests are serialized with #[serial].
    unsafe { std::env::set_var(name, value) };
}

#[test]
fn default_output_file() {
    assert_eq!(PullConfig::default().output_file, ".env");
}

#[test]
fn default_workspace_file() {
    assert_eq!(PullConfig::default().workspace_file, PathBuf::from(".envpull"));
}

#[test]
fn default_timeout() {
    assert_eq!(PullConfig::default().request_timeout_secs, 30);
}

#[test]
fn default_credentials_path_ends_with_store_name() {
    assert!(default_credentials_path().ends_with(".envpull/credentials.json"));
}

#[test]
fn default_is_valid() {
    PullConfig::default().validate().unwrap();
}

#[test]
fn base_url_trims_trailing_slash() {
    let config = PullConfig {
        api_base_url: "http://localhost:8080/".into(),
        ..PullConfig::default()
    };
    assert_eq!(config.base_url(), "http://localhost:8080");
}

#[test]
fn validate_rejects_non_http_url() {
    let config = PullConfig {
        api_base_url: "ftp://example.com".into(),
        ..PullConfig::default()
    };
    assert!(matches!(config.validate(), Err(PullError::Config(_))));
}

#[test]
fn validate_rejects_zero_timeout() {
    let config = PullConfig {
        request_timeout_secs: 0,
        ..PullConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_output_path() {
    let config = PullConfig {
        output_file: "../.env".into(),
        ..PullConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn serialization_skips_access_token() {
    let config = PullConfig {
        access_token: Some("secret-token".into()),
        ..PullConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains("secret-token"));

    let back: PullConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.api_base_url, config.api_base_url);
    assert!(back.access_token.is_none());
}

#[test]
fn debug_redacts_access_token() {
    let config = PullConfig {
        access_token: Some("secret-token".into()),
        ..PullConfig::default()
    };
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("secret-token"));
    assert!(rendered.contains("REDACTED"));
}

#[test]
#[serial]
fn from_env_overrides_defaults() {
    clear_env();
    set(ENV_API_URL, "http://127.0.0.1:9999");
    set(ENV_KEYS_HOST, "ci");
    set(ENV_OUTPUT_FILE, "secrets.env");
    set(ENV_TIMEOUT_SECS, "7");
    set(ENV_TOKEN, "tok");

    let config = PullConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
    assert_eq!(config.keys_host, "ci");
    assert_eq!(config.output_file, "secrets.env");
    assert_eq!(config.request_timeout_secs, 7);
    assert_eq!(config.access_token.as_deref(), Some("tok"));
}

#[test]
#[serial]
fn from_env_ignores_blank_values() {
    clear_env();
    set(ENV_KEYS_HOST, "   ");

    let config = PullConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.keys_host, PullConfig::default().keys_host);
}

#[test]
#[serial]
fn from_env_rejects_bad_timeout() {
    clear_env();
    set(ENV_TIMEOUT_SECS, "soon");

    let result = PullConfig::from_env();
    clear_env();

    assert!(matches!(result, Err(PullError::Config(msg)) if msg.contains(ENV_TIMEOUT_SECS)));
}
