//! AES-256-GCM payload cipher with a detached authentication tag.

use crate::error::{CryptoError, CryptoResult, DecryptionError};
use crate::key::SymmetricKey;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{AeadInPlace, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use zeroize::Zeroizing;

/// AES-GCM IV size (96 bits).
pub const IV_SIZE: usize = 12;

/// AES-GCM authentication tag size.
pub const TAG_SIZE: usize = 16;

/// One symmetrically encrypted unit: a whole file, a secret name or a
/// secret value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedPayload {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_SIZE],
    pub tag: [u8; TAG_SIZE],
}

fn cipher_for(key: &SymmetricKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Decrypts a sealed payload with the run's symmetric key.
///
/// The tag is verified before any plaintext is returned. On failure the
/// working buffer is zeroed and only [`DecryptionError::PayloadAuthFailed`]
/// escapes.
pub fn decrypt_payload(
    payload: &SealedPayload,
    key: &SymmetricKey,
) -> Result<Zeroizing<Vec<u8>>, DecryptionError> {
    let mut buffer = Zeroizing::new(payload.ciphertext.clone());

    cipher_for(key)
        .decrypt_in_place_detached(
            Nonce::from_slice(&payload.iv),
            b"",
            buffer.as_mut_slice(),
            Tag::from_slice(&payload.tag),
        )
        .map_err(|_| DecryptionError::PayloadAuthFailed)?;

    Ok(buffer)
}

/// Encrypts `plaintext` under `key` with a fresh random IV.
pub fn seal_payload(plaintext: &[u8], key: &SymmetricKey) -> CryptoResult<SealedPayload> {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher_for(key)
        .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", ciphertext.as_mut_slice())
        .map_err(|e| CryptoError::Encryption(format!("payload seal failed: {e}")))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(SealedPayload {
        ciphertext,
        iv,
        tag: tag_bytes,
    })
}
