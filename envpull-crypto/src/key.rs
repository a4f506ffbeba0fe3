//! Key material held for the lifetime of a single pull.

use crate::error::{CryptoError, CryptoResult};
use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use crypto_box::{PublicKey, SecretKey};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the per-bundle symmetric key (AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of an X25519 public or secret key.
pub const X25519_KEY_SIZE: usize = 32;

/// The per-bundle symmetric key recovered from a wrapped key.
///
/// Zeroed on drop. Never cloned by the pipeline: every payload in a run
/// borrows the same instance.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Copies a key out of a slice, rejecting anything that is not exactly
    /// [`KEY_SIZE`] bytes.
    pub fn from_slice(slice: &[u8]) -> CryptoResult<Self> {
        if slice.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self { bytes })
    }

    /// Generates a random key. Used when sealing fixtures.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// The caller's long-term X25519 private key.
///
/// The inner `SecretKey` zeroes itself on drop (from crypto_box).
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; X25519_KEY_SIZE]) -> Self {
        Self {
            secret: SecretKey::from(bytes),
        }
    }

    pub fn from_slice(slice: &[u8]) -> CryptoResult<Self> {
        if slice.len() != X25519_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: X25519_KEY_SIZE,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; X25519_KEY_SIZE];
        bytes.copy_from_slice(slice);
        let key = Self::from_bytes(bytes);
        bytes.zeroize();
        Ok(key)
    }

    pub fn generate() -> Self {
        Self {
            secret: SecretKey::generate(&mut OsRng),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }

    /// Returns the public key as a raw 32-byte array.
    pub fn public_bytes(&self) -> [u8; X25519_KEY_SIZE] {
        *self.secret.public_key().as_bytes()
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public", &self.public_bytes())
            .finish_non_exhaustive()
    }
}
