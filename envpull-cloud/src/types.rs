//! Bundle types: the JSON shapes returned by the API and the decoded
//! binary forms the decryptor works on.

use crate::error::{FetchError, FetchResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use envpull_crypto::{SealedPayload, WrappedKey};
use serde::{Deserialize, Serialize};

/// Which bundle variant a pull asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullMode {
    /// One sealed payload holding the whole file.
    File,
    /// An ordered list of sealed name/value pairs.
    Secrets,
}

impl std::fmt::Display for PullMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullMode::File => f.write_str("file"),
            PullMode::Secrets => f.write_str("secrets"),
        }
    }
}

// ── Wire format ──

/// Party that sealed the bundle key.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSender {
    pub public_key: String,
}

/// Wrapped key as sent by the API (base64 fields).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireKey {
    pub encrypted_key: String,
    pub nonce: String,
    pub sender: WireSender,
}

/// Sealed payload as sent by the API (base64 fields).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePayload {
    pub ciphertext: String,
    pub iv: String,
    pub tag: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSecret {
    pub secret_key: WirePayload,
    pub secret_value: WirePayload,
}

/// Response body of the file endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub key: WireKey,
    pub latest_file: WirePayload,
}

/// Response body of the secrets endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsResponse {
    pub key: WireKey,
    #[serde(default)]
    pub secrets: Vec<WireSecret>,
}

fn decode_field(field: &str, value: &str) -> FetchResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| FetchError::Malformed(format!("{field}: invalid base64: {e}")))
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> FetchResult<[u8; N]> {
    let bytes = decode_field(field, value)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        FetchError::Malformed(format!("{field}: expected {N} bytes, got {}", bytes.len()))
    })
}

impl WireKey {
    pub fn decode(&self) -> FetchResult<WrappedKey> {
        Ok(WrappedKey {
            ciphertext: decode_field("key.encryptedKey", &self.encrypted_key)?,
            nonce: decode_fixed("key.nonce", &self.nonce)?,
            sender_public_key: decode_fixed("key.sender.publicKey", &self.sender.public_key)?,
        })
    }
}

impl From<&WrappedKey> for WireKey {
    fn from(key: &WrappedKey) -> Self {
        Self {
            encrypted_key: STANDARD.encode(&key.ciphertext),
            nonce: STANDARD.encode(key.nonce),
            sender: WireSender {
                public_key: STANDARD.encode(key.sender_public_key),
            },
        }
    }
}

impl WirePayload {
    pub fn decode(&self, field: &str) -> FetchResult<SealedPayload> {
        Ok(SealedPayload {
            ciphertext: decode_field(&format!("{field}.ciphertext"), &self.ciphertext)?,
            iv: decode_fixed(&format!("{field}.iv"), &self.iv)?,
            tag: decode_fixed(&format!("{field}.tag"), &self.tag)?,
        })
    }
}

impl From<&SealedPayload> for WirePayload {
    fn from(payload: &SealedPayload) -> Self {
        Self {
            ciphertext: STANDARD.encode(&payload.ciphertext),
            iv: STANDARD.encode(payload.iv),
            tag: STANDARD.encode(payload.tag),
        }
    }
}

// ── Decoded bundles ──

/// One logical secret: sealed name and sealed value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretPair {
    pub name: SealedPayload,
    pub value: SealedPayload,
}

/// File-mode bundle: one wrapped key, one sealed file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileBundle {
    pub key: WrappedKey,
    pub latest_file: SealedPayload,
}

/// Secrets-mode bundle: one wrapped key, pairs in server order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretsBundle {
    pub key: WrappedKey,
    pub secrets: Vec<SecretPair>,
}

/// Everything fetched for one pull. The two variants never mix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bundle {
    File(FileBundle),
    Secrets(SecretsBundle),
}

impl Bundle {
    pub fn mode(&self) -> PullMode {
        match self {
            Bundle::File(_) => PullMode::File,
            Bundle::Secrets(_) => PullMode::Secrets,
        }
    }

    pub fn wrapped_key(&self) -> &WrappedKey {
        match self {
            Bundle::File(b) => &b.key,
            Bundle::Secrets(b) => &b.key,
        }
    }

    /// Number of sealed payloads the bundle carries.
    pub fn payload_count(&self) -> usize {
        match self {
            Bundle::File(_) => 1,
            Bundle::Secrets(b) => b.secrets.len() * 2,
        }
    }
}

impl TryFrom<FileResponse> for FileBundle {
    type Error = FetchError;

    fn try_from(resp: FileResponse) -> FetchResult<Self> {
        Ok(Self {
            key: resp.key.decode()?,
            latest_file: resp.latest_file.decode("latestFile")?,
        })
    }
}

impl TryFrom<SecretsResponse> for SecretsBundle {
    type Error = FetchError;

    fn try_from(resp: SecretsResponse) -> FetchResult<Self> {
        let secrets = resp
            .secrets
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                Ok(SecretPair {
                    name: s.secret_key.decode(&format!("secrets[{idx}].secretKey"))?,
                    value: s.secret_value.decode(&format!("secrets[{idx}].secretValue"))?,
                })
            })
            .collect::<FetchResult<Vec<_>>>()?;

        Ok(Self {
            key: resp.key.decode()?,
            secrets,
        })
    }
}

impl From<&FileBundle> for FileResponse {
    fn from(bundle: &FileBundle) -> Self {
        Self {
            key: WireKey::from(&bundle.key),
            latest_file: WirePayload::from(&bundle.latest_file),
        }
    }
}

impl From<&SecretsBundle> for SecretsResponse {
    fn from(bundle: &SecretsBundle) -> Self {
        Self {
            key: WireKey::from(&bundle.key),
            secrets: bundle
                .secrets
                .iter()
                .map(|pair| WireSecret {
                    secret_key: WirePayload::from(&pair.name),
                    secret_value: WirePayload::from(&pair.value),
                })
                .collect(),
        }
    }
}
