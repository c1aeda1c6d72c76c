//! Detached OpenPGP signature verification over release checksums.
//!
//! Packet parsing and the signature arithmetic come from the `pgp` crate.
//! This module decides which encodings of a detached signature are accepted
//! and which key in a bundled key set is allowed to vouch for a release.
//!
//! # Sub-modules
//!
//! - [`signature`] - The detached-signature encoding fallback ladder.
//! - [`keyring`] - Key rings and signing-key selection.
//! - [`verifier`] - The verification predicate.

pub mod keyring;
pub mod signature;
pub mod verifier;

use camino::Utf8PathBuf;
use thiserror::Error;

pub use keyring::{PublicKeySet, select_signing_key};
pub use signature::parse_signature;
pub use verifier::{verify, verify_files};

/// Errors raised while reading OpenPGP material.
///
/// A cryptographically invalid signature is not an error; the verifier
/// reports it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum OpenPgpError {
    /// Key material could not be parsed.
    #[error("malformed {what}: {source}")]
    Malformed {
        /// Which input was being read.
        what: &'static str,
        /// Parser error.
        #[source]
        source: pgp::errors::Error,
    },

    /// None of the signature encodings produced a signature.
    #[error("unsupported signature format")]
    UnsupportedSignatureFormat,

    /// No subkey in the key set is flagged for signing.
    #[error("no suitable signing key")]
    NoSigningKey,

    /// One of the verifier inputs is empty.
    #[error("{input} is empty")]
    EmptyInput {
        /// Which input was empty.
        input: &'static str,
    },

    /// A verification file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was requested.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
