//! Crypto error types.

use thiserror::Error;

/// Result type for key handling and sealing.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from key construction and sealing.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error(transparent)]
    Decryption(#[from] DecryptionError),
}

/// Opening failures. Variants carry no detail so nothing about the key or
/// ciphertext leaks through the error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionError {
    #[error("symmetric key recovery failed")]
    KeyRecoveryFailed,

    #[error("payload authentication failed")]
    PayloadAuthFailed,
}
