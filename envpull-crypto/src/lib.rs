//! Decryption layer for envpull.
//!
//! A pulled bundle is protected by two tiers of encryption:
//!
//! 1. **Wrapped key**: a per-bundle AES-256 key sealed with X25519 +
//!    XSalsa20-Poly1305 from the sender's key pair to the requester's.
//!
//! 2. **Sealed payloads**: the file body, or every secret name and value,
//!    encrypted with AES-256-GCM under that key with a detached tag.
//!
//! Opening a bundle means recovering the key once with the requester's
//! private key, then opening every payload with the same key. All key
//! material zeroes itself on drop.

mod cipher;
mod envelope;
mod error;
mod key;

pub use cipher::{decrypt_payload, seal_payload, SealedPayload, IV_SIZE, TAG_SIZE};
pub use envelope::{decrypt_key, seal_key, WrappedKey, BOX_NONCE_SIZE};
pub use error::{CryptoError, CryptoResult, DecryptionError};
pub use key::{PrivateKey, SymmetricKey, KEY_SIZE, X25519_KEY_SIZE};
