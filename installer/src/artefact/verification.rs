//! The transient files needed to authenticate a downloaded scanner.
//!
//! The checksum file, its detached signature, and the extracted trust
//! anchor live next to the binary only while it is being checked. A
//! [`CleanupGuard`] removes them when it is dropped, so every exit from the
//! acquisition pipeline (including early returns through `?`) leaves the
//! working area free of them.

use crate::openpgp::{self, OpenPgpError};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::io;

/// Name of the downloaded checksum file in the working area.
pub const CHECKSUM_FILE_NAME: &str = "wizcli-sha256";

/// Name of the downloaded detached signature in the working area.
pub const SIGNATURE_FILE_NAME: &str = "wizcli-sha256.sig";

/// Name under which the trust anchor is written to the working area.
pub const PUBLIC_KEY_FILE_NAME: &str = "public_key.asc";

/// Paths of the binary and its verification side files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationBundle {
    /// The downloaded scanner binary.
    pub binary_path: Utf8PathBuf,
    /// The published SHA-256 of the binary.
    pub checksum_path: Utf8PathBuf,
    /// Detached signature over the checksum file.
    pub signature_path: Utf8PathBuf,
    /// The trust anchor, written out for the file-based verifier.
    pub public_key_path: Utf8PathBuf,
}

impl VerificationBundle {
    /// Lays the bundle out in `work_dir` with the fixed side-file names.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use wizcli_installer::artefact::verification::VerificationBundle;
    ///
    /// let bundle = VerificationBundle::in_work_dir(Utf8Path::new("/work"), "wizcli");
    /// assert_eq!(bundle.checksum_path, "/work/wizcli-sha256");
    /// assert_eq!(bundle.transient_files().len(), 3);
    /// ```
    #[must_use]
    pub fn in_work_dir(work_dir: &Utf8Path, binary_name: &str) -> Self {
        Self {
            binary_path: work_dir.join(binary_name),
            checksum_path: work_dir.join(CHECKSUM_FILE_NAME),
            signature_path: work_dir.join(SIGNATURE_FILE_NAME),
            public_key_path: work_dir.join(PUBLIC_KEY_FILE_NAME),
        }
    }

    /// The side files that must not outlive an acquisition attempt.
    #[must_use]
    pub fn transient_files(&self) -> [&Utf8Path; 3] {
        [
            &self.checksum_path,
            &self.signature_path,
            &self.public_key_path,
        ]
    }

    /// Checks the signature over the checksum file against the written key.
    ///
    /// # Errors
    ///
    /// Returns an [`OpenPgpError`] if any file is unreadable or empty, or if
    /// the key or signature cannot be parsed.
    pub fn verify_signature(&self) -> Result<bool, OpenPgpError> {
        openpgp::verify_files(
            &self.checksum_path,
            &self.signature_path,
            &self.public_key_path,
        )
    }

    /// Arms a guard that deletes the transient files when dropped.
    #[must_use]
    pub fn cleanup_guard(&self) -> CleanupGuard<'_> {
        CleanupGuard { bundle: self }
    }
}

/// Deletes a bundle's transient files on drop.
///
/// Deletion is best-effort: files that were never created are ignored and
/// any other failure is logged.
#[derive(Debug)]
pub struct CleanupGuard<'a> {
    bundle: &'a VerificationBundle,
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        for path in self.bundle.transient_files() {
            remove_quietly(path);
        }
    }
}

pub(crate) fn remove_quietly(path: &Utf8Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(target: "wizcli::acquisition", "removed {path}"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(target: "wizcli::acquisition", "failed to remove {path}: {err}"),
    }
}
