//! Public key rings and signing-key selection.
//!
//! A key set is read into memory in full before it is searched. Only
//! subkeys are candidates: a subkey qualifies when one of its binding
//! signatures carries the sign key flag.

use super::OpenPgpError;
use log::debug;
use pgp::composed::{Deserializable, SignedPublicKey, SignedPublicSubKey};

const ARMOR_HEADER: &[u8] = b"-----BEGIN";

/// An ordered collection of key rings.
#[derive(Debug, Clone, Default)]
pub struct PublicKeySet {
    rings: Vec<SignedPublicKey>,
}

impl PublicKeySet {
    /// Reads a key set from armored or binary bytes.
    ///
    /// # Errors
    ///
    /// Returns [`OpenPgpError::Malformed`] when any ring fails to parse.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OpenPgpError> {
        let rings = if is_armored(bytes) {
            SignedPublicKey::from_armor_many(bytes)
                .and_then(|(keys, _headers)| keys.collect::<Result<Vec<_>, _>>())
        } else {
            SignedPublicKey::from_bytes_many(bytes).collect::<Result<Vec<_>, _>>()
        }
        .map_err(|source| OpenPgpError::Malformed {
            what: "public key",
            source,
        })?;
        Ok(Self { rings })
    }

    /// The rings in the order they appeared.
    #[must_use]
    pub fn rings(&self) -> &[SignedPublicKey] {
        &self.rings
    }

    /// Returns the first subkey flagged for signing, in ring then key order.
    ///
    /// Primary keys are never selected, even when their own signatures
    /// grant signing use.
    ///
    /// # Errors
    ///
    /// Returns [`OpenPgpError::NoSigningKey`] when no subkey qualifies.
    pub fn signing_key(&self) -> Result<&SignedPublicSubKey, OpenPgpError> {
        for (ring_index, ring) in self.rings.iter().enumerate() {
            for (subkey_index, subkey) in ring.public_subkeys.iter().enumerate() {
                debug!(
                    target: "wizcli::openpgp",
                    "examining subkey {subkey_index} in ring {ring_index}: {} signature(s)",
                    subkey.signatures.len()
                );
                if grants_signing(subkey) {
                    return Ok(subkey);
                }
            }
        }
        Err(OpenPgpError::NoSigningKey)
    }
}

impl From<Vec<SignedPublicKey>> for PublicKeySet {
    fn from(rings: Vec<SignedPublicKey>) -> Self {
        Self { rings }
    }
}

fn grants_signing(subkey: &SignedPublicSubKey) -> bool {
    subkey
        .signatures
        .iter()
        .any(|signature| signature.key_flags().sign())
}

fn is_armored(bytes: &[u8]) -> bool {
    bytes.trim_ascii_start().starts_with(ARMOR_HEADER)
}

/// Reads `key_bytes` and selects the signing key.
///
/// # Errors
///
/// Returns [`OpenPgpError::Malformed`] for unreadable key material and
/// [`OpenPgpError::NoSigningKey`] when no subkey is flagged for signing.
pub fn select_signing_key(key_bytes: &[u8]) -> Result<SignedPublicSubKey, OpenPgpError> {
    PublicKeySet::from_bytes(key_bytes)?.signing_key().cloned()
}
