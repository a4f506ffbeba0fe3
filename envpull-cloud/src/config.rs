//! Pull configuration.

use crate::error::{PullError, PullResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_API_URL: &str = "ENVPULL_API_URL";
pub const ENV_KEYS_HOST: &str = "ENVPULL_KEYS_HOST";
pub const ENV_WORKSPACE_FILE: &str = "ENVPULL_WORKSPACE_FILE";
pub const ENV_OUTPUT_FILE: &str = "ENVPULL_OUTPUT_FILE";
pub const ENV_CREDENTIALS: &str = "ENVPULL_CREDENTIALS";
pub const ENV_TIMEOUT_SECS: &str = "ENVPULL_TIMEOUT_SECS";
pub const ENV_TOKEN: &str = "ENVPULL_TOKEN";

/// Configuration for a pull run.
#[derive(Clone, Serialize, Deserialize)]
pub struct PullConfig {
    /// Base URL for the secrets API (e.g., "https://api.envpull.dev").
    pub api_base_url: String,

    /// Host name the private key is stored under in the credential store.
    pub keys_host: String,

    /// Local marker file holding the workspace id.
    pub workspace_file: PathBuf,

    /// Name of the file the plaintext document is written to.
    pub output_file: String,

    /// JSON credential store (host -> private key).
    pub credentials_path: PathBuf,

    /// Whole-request timeout for bundle fetches (seconds).
    pub request_timeout_secs: u64,

    /// Bearer token sent with API requests.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for PullConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullConfig")
            .field("api_base_url", &self.api_base_url)
            .field("keys_host", &self.keys_host)
            .field("workspace_file", &self.workspace_file)
            .field("output_file", &self.output_file)
            .field("credentials_path", &self.credentials_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.envpull.dev".to_string(),
            keys_host: "envpull".to_string(),
            workspace_file: PathBuf::from(".envpull"),
            output_file: ".env".to_string(),
            credentials_path: default_credentials_path(),
            request_timeout_secs: 30,
            access_token: None,
        }
    }
}

/// `~/.envpull/credentials.json`, or a relative path when no home
/// directory can be resolved.
pub fn default_credentials_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".envpull"))
        .unwrap_or_else(|| PathBuf::from(".envpull-home"))
        .join("credentials.json")
}

impl PullConfig {
    /// Defaults overlaid with any `ENVPULL_*` environment variables.
    pub fn from_env() -> PullResult<Self> {
        let mut config = Self::default();

        if let Some(url) = env_var(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(host) = env_var(ENV_KEYS_HOST) {
            config.keys_host = host;
        }
        if let Some(path) = env_var(ENV_WORKSPACE_FILE) {
            config.workspace_file = PathBuf::from(path);
        }
        if let Some(name) = env_var(ENV_OUTPUT_FILE) {
            config.output_file = name;
        }
        if let Some(path) = env_var(ENV_CREDENTIALS) {
            config.credentials_path = PathBuf::from(path);
        }
        if let Some(secs) = env_var(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = secs.parse().map_err(|e| {
                PullError::Config(format!("{ENV_TIMEOUT_SECS} must be a number of seconds: {e}"))
            })?;
        }
        if let Some(token) = env_var(ENV_TOKEN) {
            config.access_token = Some(token);
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects values no pull could succeed with.
    pub fn validate(&self) -> PullResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(PullError::Config("api_base_url is empty".into()));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(PullError::Config(format!(
                "api_base_url must be an http(s) URL, got {}",
                self.api_base_url
            )));
        }
        if self.keys_host.trim().is_empty() {
            return Err(PullError::Config("keys_host is empty".into()));
        }
        if self.workspace_file.as_os_str().is_empty() {
            return Err(PullError::Config("workspace_file is empty".into()));
        }
        if self.output_file.trim().is_empty() {
            return Err(PullError::Config("output_file is empty".into()));
        }
        if self.output_file.contains(['/', '\\']) {
            return Err(PullError::Config(format!(
                "output_file must be a bare file name, got {}",
                self.output_file
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(PullError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// API base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
