//! Private-key lookup for the requesting identity.
//!
//! The store is a JSON document mapping a keys host to the private key
//! registered for it:
//!
//! ```json
//! { "envpull": { "email": "dev@example.com", "private_key": "<base64>" } }
//! ```

use crate::error::AuthError;
use base64::{Engine, engine::general_purpose::STANDARD};
use envpull_crypto::{PrivateKey, X25519_KEY_SIZE};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

/// The caller's credential for one run.
///
/// Holds the only copy of the private key the pipeline sees; dropping it
/// zeroes the key.
#[derive(Debug)]
pub struct Credential {
    pub account: Option<String>,
    private_key: PrivateKey,
}

impl Credential {
    pub fn new(account: Option<String>, private_key: PrivateKey) -> Self {
        Self {
            account,
            private_key,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

/// Supplies the caller's private key for a keys host.
pub trait CredentialProvider: Send + Sync {
    fn get_credentials(&self, host: &str) -> Result<Credential, AuthError>;
}

#[derive(Deserialize)]
struct StoredCredential {
    #[serde(default)]
    email: Option<String>,
    private_key: String,
}

/// Reads credentials from a JSON file on every lookup.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for FileCredentialStore {
    fn get_credentials(&self, host: &str) -> Result<Credential, AuthError> {
        let raw = std::fs::read_to_string(&self.path)
            .map(Zeroizing::new)
            .map_err(|e| AuthError::StoreUnavailable {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let mut store: HashMap<String, StoredCredential> = serde_json::from_str(&raw)
            .map_err(|e| AuthError::MalformedStore(e.to_string()))?;

        let result = match store.get(host) {
            Some(stored) => decode_private_key(&stored.private_key)
                .map(|key| Credential::new(stored.email.clone(), key)),
            None => Err(AuthError::UnknownHost(host.to_string())),
        };

        for stored in store.values_mut() {
            stored.private_key.zeroize();
        }

        if result.is_ok() {
            debug!("resolved credentials for host {host}");
        }
        result
    }
}

/// Decodes a base64 X25519 private key.
pub fn decode_private_key(encoded: &str) -> Result<PrivateKey, AuthError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map(Zeroizing::new)
        .map_err(|e| AuthError::InvalidPrivateKey(format!("invalid base64: {e}")))?;

    if bytes.len() != X25519_KEY_SIZE {
        return Err(AuthError::InvalidPrivateKey(format!(
            "expected {X25519_KEY_SIZE} bytes, got {}",
            bytes.len()
        )));
    }

    PrivateKey::from_slice(&bytes).map_err(|e| AuthError::InvalidPrivateKey(e.to_string()))
}

/// Serves one fixed key for one host. Useful when the key comes from an
/// environment variable or a test fixture rather than a file.
pub struct StaticCredentials {
    host: String,
    account: Option<String>,
    key_bytes: Zeroizing<[u8; X25519_KEY_SIZE]>,
}

impl StaticCredentials {
    pub fn new(host: impl Into<String>, key_bytes: [u8; X25519_KEY_SIZE]) -> Self {
        Self {
            host: host.into(),
            account: None,
            key_bytes: Zeroizing::new(key_bytes),
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn get_credentials(&self, host: &str) -> Result<Credential, AuthError> {
        if host != self.host {
            return Err(AuthError::UnknownHost(host.to_string()));
        }
        Ok(Credential::new(
            self.account.clone(),
            PrivateKey::from_bytes(*self.key_bytes),
        ))
    }
}
