//! Shared test helpers: key pairs, sealed bundles and their JSON forms.

#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::STANDARD};
use envpull_cloud::types::*;
use envpull_crypto::{PrivateKey, SymmetricKey, seal_key, seal_payload};

pub const HOST: &str = "envpull-test";
pub const WORKSPACE_ID: &str = "ws-5f2c9a";

/// Sender (the party that uploaded the bundle) and recipient (us).
pub struct Parties {
    pub sender: PrivateKey,
    pub recipient: PrivateKey,
    pub recipient_bytes: [u8; 32],
}

pub fn parties() -> Parties {
    let recipient_bytes = [0x42; 32];
    Parties {
        sender: PrivateKey::generate(),
        recipient: PrivateKey::from_bytes(recipient_bytes),
        recipient_bytes,
    }
}

/// Seals `content` as a file-mode bundle for the recipient.
pub fn file_bundle(parties: &Parties, content: &[u8]) -> FileBundle {
    let key = SymmetricKey::generate();
    FileBundle {
        key: seal_key(&key, &parties.recipient.public_bytes(), &parties.sender).unwrap(),
        latest_file: seal_payload(content, &key).unwrap(),
    }
}

/// Seals `pairs` as a secrets-mode bundle for the recipient, in order.
pub fn secrets_bundle(parties: &Parties, pairs: &[(&str, &str)]) -> SecretsBundle {
    let key = SymmetricKey::generate();
    SecretsBundle {
        key: seal_key(&key, &parties.recipient.public_bytes(), &parties.sender).unwrap(),
        secrets: pairs
            .iter()
            .map(|(name, value)| SecretPair {
                name: seal_payload(name.as_bytes(), &key).unwrap(),
                value: seal_payload(value.as_bytes(), &key).unwrap(),
            })
            .collect(),
    }
}

pub fn file_json(bundle: &FileBundle) -> serde_json::Value {
    serde_json::to_value(FileResponse::from(bundle)).unwrap()
}

pub fn secrets_json(bundle: &SecretsBundle) -> serde_json::Value {
    serde_json::to_value(SecretsResponse::from(bundle)).unwrap()
}

/// Credential store JSON holding the recipient key under [`HOST`].
pub fn credential_store_json(parties: &Parties) -> String {
    serde_json::json!({
        HOST: {
            "email": "dev@example.com",
            "private_key": STANDARD.encode(parties.recipient_bytes),
        }
    })
    .to_string()
}
