//! Payload cipher tests (AES-256-GCM, detached tag).

use envpull_crypto::{decrypt_payload, seal_payload, DecryptionError, SymmetricKey};

#[test]
fn wrong_key_fails_authentication() {
    let key = SymmetricKey::generate();
    let other = SymmetricKey::generate();

    let sealed = seal_payload(b"DATABASE_URL=postgres://localhost", &key).unwrap();

    assert_eq!(
        decrypt_payload(&sealed, &other).unwrap_err(),
        DecryptionError::PayloadAuthFailed
    );
}

#[test]
fn tampered_ciphertext_fails_authentication() {
    let key = SymmetricKey::generate();
    let mut sealed = seal_payload(b"PORT=8080", &key).unwrap();
    sealed.ciphertext[0] ^= 0x80;

    assert_eq!(
        decrypt_payload(&sealed, &key).unwrap_err(),
        DecryptionError::PayloadAuthFailed
    );
}

#[test]
fn tampered_iv_fails_authentication() {
    let key = SymmetricKey::generate();
    let mut sealed = seal_payload(b"PORT=8080", &key).unwrap();
    sealed.iv[11] ^= 0x01;

    assert!(decrypt_payload(&sealed, &key).is_err());
}

#[test]
fn empty_plaintext_roundtrips() {
    let key = SymmetricKey::generate();
    let sealed = seal_payload(b"", &key).unwrap();
    assert!(sealed.ciphertext.is_empty());

    let opened = decrypt_payload(&sealed, &key).unwrap();
    assert!(opened.is_empty());
}

#[test]
fn same_key_opens_many_payloads() {
    let key = SymmetricKey::generate();
    let sealed: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|s| seal_payload(s.as_bytes(), &key).unwrap())
        .collect();

    let opened: Vec<Vec<u8>> = sealed
        .iter()
        .map(|p| decrypt_payload(p, &key).unwrap().to_vec())
        .collect();
    assert_eq!(opened, vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec()]);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn seal_open_always_roundtrips(
            key_bytes in any::<[u8; 32]>(),
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let key = SymmetricKey::from_bytes(key_bytes);
            let sealed = seal_payload(&plaintext, &key).unwrap();
            let opened = decrypt_payload(&sealed, &key).unwrap();
            prop_assert_eq!(opened.as_slice(), plaintext.as_slice());
        }
    }
}
