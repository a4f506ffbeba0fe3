//! Pull error types.

use envpull_crypto::DecryptionError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pull operations.
pub type PullResult<T> = Result<T, PullError>;

/// Result type for bundle fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Credential lookup failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential store not readable at {}: {reason}", .path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    #[error("credential store is malformed: {0}")]
    MalformedStore(String),

    #[error("no credentials stored for host {0}")]
    UnknownHost(String),

    #[error("stored private key is invalid: {0}")]
    InvalidPrivateKey(String),

    #[error("credential lookup aborted: {0}")]
    LookupAborted(String),
}

/// Remote bundle retrieval failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not authorized to read workspace {0}")]
    Unauthorized(String),

    #[error("workspace bundle not found: {0}")]
    NotFound(String),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed bundle: {0}")]
    Malformed(String),
}

/// The single run-level failure reported by a pull.
#[derive(Debug, Error)]
pub enum PullError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("decryption failed: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("workspace marker {}: {reason}", .path.display())]
    Workspace { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}
