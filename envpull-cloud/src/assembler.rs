//! Plaintext document assembly.

use zeroize::Zeroizing;

/// One opened secret.
pub struct DecryptedSecret {
    pub name: Zeroizing<Vec<u8>>,
    pub value: Zeroizing<Vec<u8>>,
}

/// Every payload of a bundle, opened and verified.
pub enum DecryptedBundle {
    File(Zeroizing<Vec<u8>>),
    Secrets(Vec<DecryptedSecret>),
}

/// The reconstructed plaintext, zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextDocument {
    bytes: Zeroizing<Vec<u8>>,
}

impl PlaintextDocument {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for PlaintextDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlaintextDocument({} bytes)", self.bytes.len())
    }
}

/// Builds the output document.
///
/// A file bundle passes through verbatim. Secrets become `name=value`
/// lines in bundle order, joined by `\n` with no leading or trailing
/// separator; no secrets yields an empty document.
pub fn assemble(bundle: DecryptedBundle) -> PlaintextDocument {
    match bundle {
        DecryptedBundle::File(bytes) => PlaintextDocument { bytes },
        DecryptedBundle::Secrets(secrets) => PlaintextDocument {
            bytes: Zeroizing::new(join_lines(&secrets)),
        },
    }
}

fn join_lines(secrets: &[DecryptedSecret]) -> Vec<u8> {
    // Pre-sized: a reallocation would leave unzeroed copies behind.
    let capacity = secrets
        .iter()
        .map(|s| s.name.len() + 1 + s.value.len())
        .sum::<usize>()
        + secrets.len().saturating_sub(1);

    secrets
        .iter()
        .enumerate()
        .fold(Vec::with_capacity(capacity), |mut out, (idx, secret)| {
            if idx > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(&secret.name);
            out.push(b'=');
            out.extend_from_slice(&secret.value);
            out
        })
}
