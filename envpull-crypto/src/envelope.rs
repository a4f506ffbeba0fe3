//! Wrapped-key recovery.
//!
//! The per-bundle symmetric key travels as an X25519 + XSalsa20-Poly1305 box
//! from the sender's key pair to the requester's. Opening the box needs the
//! requester's secret key and the sender's declared public key.

use crate::error::{CryptoError, CryptoResult, DecryptionError};
use crate::key::{PrivateKey, SymmetricKey, X25519_KEY_SIZE};
use crypto_box::aead::{Aead, AeadCore, OsRng};
use crypto_box::{PublicKey, SalsaBox};
use zeroize::Zeroizing;

/// XSalsa20 nonce size.
pub const BOX_NONCE_SIZE: usize = 24;

/// A symmetric key sealed for one recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedKey {
    /// XSalsa20-Poly1305 ciphertext including the Poly1305 tag.
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; BOX_NONCE_SIZE],
    /// Public key of the party that sealed the box.
    pub sender_public_key: [u8; X25519_KEY_SIZE],
}

/// Recovers the bundle's symmetric key.
///
/// Any failure, including a recovered key of the wrong length, is reported
/// as [`DecryptionError::KeyRecoveryFailed`]. The opened plaintext is zeroed
/// before this function returns on every path.
pub fn decrypt_key(
    wrapped: &WrappedKey,
    credential: &PrivateKey,
) -> Result<SymmetricKey, DecryptionError> {
    let sender_pk = PublicKey::from(wrapped.sender_public_key);
    let salsa_box = SalsaBox::new(&sender_pk, credential.secret());

    let opened = salsa_box
        .decrypt(
            crypto_box::Nonce::from_slice(&wrapped.nonce),
            wrapped.ciphertext.as_ref(),
        )
        .map(Zeroizing::new)
        .map_err(|_| DecryptionError::KeyRecoveryFailed)?;

    SymmetricKey::from_slice(&opened).map_err(|_| DecryptionError::KeyRecoveryFailed)
}

/// Seals a symmetric key for `recipient_pk` with the sender's key pair.
pub fn seal_key(
    key: &SymmetricKey,
    recipient_pk: &[u8; X25519_KEY_SIZE],
    sender: &PrivateKey,
) -> CryptoResult<WrappedKey> {
    let recipient_pk = PublicKey::from(*recipient_pk);
    let salsa_box = SalsaBox::new(&recipient_pk, sender.secret());
    let nonce = SalsaBox::generate_nonce(&mut OsRng);

    let ciphertext = salsa_box
        .encrypt(&nonce, key.as_bytes().as_ref())
        .map_err(|e| CryptoError::Encryption(format!("key seal failed: {e}")))?;

    let mut nonce_bytes = [0u8; BOX_NONCE_SIZE];
    nonce_bytes.copy_from_slice(&nonce);

    Ok(WrappedKey {
        ciphertext,
        nonce: nonce_bytes,
        sender_public_key: sender.public_bytes(),
    })
}
