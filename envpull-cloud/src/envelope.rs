//! Bundle decryption.
//!
//! Wraps the envpull-crypto primitives: one key recovery per bundle, then
//! every sealed payload opened with that same key.

use crate::assembler::{DecryptedBundle, DecryptedSecret};
use crate::credential_manager::Credential;
use crate::types::Bundle;
use envpull_crypto::{DecryptionError, SymmetricKey, decrypt_key, decrypt_payload};

/// Recovers the bundle's symmetric key with the caller's credential.
pub fn recover_key(bundle: &Bundle, credential: &Credential) -> Result<SymmetricKey, DecryptionError> {
    decrypt_key(bundle.wrapped_key(), credential.private_key())
}

/// Opens every payload in the bundle.
///
/// Stops at the first payload that fails authentication and returns that
/// error; anything decrypted before it is dropped and zeroed.
pub fn decrypt_payloads(
    bundle: &Bundle,
    key: &SymmetricKey,
) -> Result<DecryptedBundle, DecryptionError> {
    match bundle {
        Bundle::File(file) => Ok(DecryptedBundle::File(decrypt_payload(&file.latest_file, key)?)),
        Bundle::Secrets(secrets) => {
            let pairs = secrets
                .secrets
                .iter()
                .map(|pair| {
                    Ok(DecryptedSecret {
                        name: decrypt_payload(&pair.name, key)?,
                        value: decrypt_payload(&pair.value, key)?,
                    })
                })
                .collect::<Result<Vec<_>, DecryptionError>>()?;
            Ok(DecryptedBundle::Secrets(pairs))
        }
    }
}
