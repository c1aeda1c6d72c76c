//! Error taxonomy for scanner acquisition and command gating.
//!
//! Each family is terminal for the step that raised it. Module-level errors
//! convert into [`InstallerError`] so the family survives propagation: a
//! download that times out stays a network failure, a rejected signature
//! stays a verification failure, and so on.

use crate::artefact::cli_url::CliUrlError;
use crate::artefact::download::DownloadError;
use crate::command::validator::ValidationError;
use crate::openpgp::OpenPgpError;
use thiserror::Error;

/// Errors that can occur while acquiring or launching the scanner.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The download URL does not have the expected shape. No network call
    /// was attempted.
    #[error(transparent)]
    InvalidUrl(#[from] CliUrlError),

    /// Connection failure, timeout, or a response other than `200 OK`.
    #[error("network error: {0}")]
    Network(#[source] DownloadError),

    /// A filesystem read or write failed, or blocking I/O was interrupted.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The signature could not be checked, or was checked and rejected.
    #[error("signature verification failed: {reason}")]
    Verification {
        /// What went wrong.
        reason: String,
    },

    /// The downloaded binary does not match its published checksum.
    #[error("checksum mismatch: expected {expected}, actual {actual}")]
    Integrity {
        /// Digest published alongside the binary.
        expected: String,
        /// Digest recomputed from the downloaded bytes.
        actual: String,
    },

    /// The command line failed the allow-list or character checks.
    #[error("command rejected: {0}")]
    Validation(#[from] ValidationError),
}

impl InstallerError {
    /// Builds the error reported when a well-formed signature does not
    /// verify against the trust anchor.
    #[must_use]
    pub fn signature_rejected() -> Self {
        Self::Verification {
            reason: "signature does not match the published checksum".to_owned(),
        }
    }
}

impl From<DownloadError> for InstallerError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Io(source) => Self::Io(source),
            other => Self::Network(other),
        }
    }
}

impl From<OpenPgpError> for InstallerError {
    fn from(err: OpenPgpError) -> Self {
        match err {
            OpenPgpError::Io { path, source } => Self::Io(std::io::Error::new(
                source.kind(),
                format!("failed to read {path}: {source}"),
            )),
            other => Self::Verification {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
