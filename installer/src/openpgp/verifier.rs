//! The verification predicate.
//!
//! [`verify`] answers one question: did the selected signing key sign these
//! bytes? Unreadable inputs are errors, while a signature that parses but
//! does not check out is `Ok(false)`.

use super::OpenPgpError;
use super::keyring::select_signing_key;
use super::signature::parse_signature;
use camino::Utf8Path;
use log::debug;
use pgp::composed::{SignedPublicSubKey, StandaloneSignature};

/// Checks `signature` over `signed` against the signing key in `public_key`.
///
/// # Errors
///
/// Returns [`OpenPgpError::EmptyInput`] when any buffer is empty, and the
/// reader errors when the key set or signature cannot be parsed.
///
/// # Examples
///
/// ```
/// use wizcli_installer::openpgp::verify;
///
/// let err = verify(b"", b"sig", b"key").expect_err("empty data");
/// assert_eq!(err.to_string(), "signed data is empty");
/// ```
pub fn verify(signed: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, OpenPgpError> {
    require_non_empty(signed, "signed data")?;
    require_non_empty(signature, "signature")?;
    require_non_empty(public_key, "public key")?;

    let key = select_signing_key(public_key)?;
    let signature = parse_signature(signature)?;
    Ok(check(&key, &signature, signed))
}

/// Reads the three inputs from disk and calls [`verify`].
///
/// # Errors
///
/// Returns [`OpenPgpError::Io`] naming the file that could not be read, or
/// any error [`verify`] reports.
pub fn verify_files(
    signed: &Utf8Path,
    signature: &Utf8Path,
    public_key: &Utf8Path,
) -> Result<bool, OpenPgpError> {
    let signed_bytes = read(signed)?;
    let signature_bytes = read(signature)?;
    let key_bytes = read(public_key)?;
    verify(&signed_bytes, &signature_bytes, &key_bytes)
}

fn read(path: &Utf8Path) -> Result<Vec<u8>, OpenPgpError> {
    std::fs::read(path).map_err(|source| OpenPgpError::Io {
        path: path.to_owned(),
        source,
    })
}

fn require_non_empty(bytes: &[u8], input: &'static str) -> Result<(), OpenPgpError> {
    if bytes.is_empty() {
        Err(OpenPgpError::EmptyInput { input })
    } else {
        Ok(())
    }
}

fn check(key: &SignedPublicSubKey, signature: &StandaloneSignature, signed: &[u8]) -> bool {
    match signature.verify(&key.key, signed) {
        Ok(()) => true,
        Err(err) => {
            debug!(target: "wizcli::openpgp", "signature does not verify: {err}");
            false
        }
    }
}
