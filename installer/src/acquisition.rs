//! Verified acquisition of the scanner binary.
//!
//! Turns a download URL into an executable path, gating each step on the
//! one before it:
//!
//! 1. validate the URL (no network traffic for a malformed one);
//! 2. download the binary;
//! 3. download the checksum file and its detached signature, and write out
//!    the embedded trust anchor;
//! 4. verify the signature over the checksum file;
//! 5. recompute the binary's SHA-256 and compare it with the published one;
//! 6. mark the binary executable on non-Windows targets.
//!
//! The checksum, signature, and key files are removed on every exit path.
//! A binary that fails any gate is removed as well, so a failed acquisition
//! never leaves something runnable behind.

use crate::artefact::cli_url::CliUrl;
use crate::artefact::download::{ArtefactDownloader, DownloadTarget};
use crate::artefact::hasher::digest_file;
use crate::artefact::verification::{VerificationBundle, remove_quietly};
use crate::error::{InstallerError, Result};
use crate::output::write_stderr_line;
use crate::tool_version::ToolVersion;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::borrow::Cow;
use std::fs;
use std::io::Write;

/// The armored key bundle that signs scanner releases.
pub const EMBEDDED_PUBLIC_KEY: &[u8] = include_bytes!("../resources/public_key.asc");

const UNIX_EXECUTABLE: &str = "wizcli";
const WINDOWS_EXECUTABLE: &str = "wizcli.exe";

/// A verified scanner ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliSetup {
    /// Location of the verified binary.
    pub path: Utf8PathBuf,
    /// Dialect detected from the download URL.
    pub version: ToolVersion,
    /// Whether the binary targets Windows.
    pub is_windows: bool,
}

impl CliSetup {
    /// File name of the scanner binary for the platform.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_installer::acquisition::CliSetup;
    ///
    /// assert_eq!(CliSetup::executable_name(false), "wizcli");
    /// assert_eq!(CliSetup::executable_name(true), "wizcli.exe");
    /// ```
    #[must_use]
    pub fn executable_name(is_windows: bool) -> &'static str {
        if is_windows {
            WINDOWS_EXECUTABLE
        } else {
            UNIX_EXECUTABLE
        }
    }

    /// The command that starts the scanner from inside its working area.
    #[must_use]
    pub fn launch_command(&self) -> String {
        let name = Self::executable_name(self.is_windows);
        if self.is_windows {
            name.to_owned()
        } else {
            format!("./{name}")
        }
    }

    /// Directory holding the binary.
    #[must_use]
    pub fn work_dir(&self) -> &Utf8Path {
        self.path.parent().unwrap_or(Utf8Path::new("."))
    }
}

/// Downloads and authenticates the scanner into a working area.
pub struct AcquisitionPipeline<'a> {
    downloader: &'a dyn ArtefactDownloader,
    work_dir: Utf8PathBuf,
    trust_anchor: Cow<'static, [u8]>,
    is_windows: bool,
}

impl<'a> AcquisitionPipeline<'a> {
    /// Creates a pipeline writing into `work_dir` and trusting
    /// [`EMBEDDED_PUBLIC_KEY`].
    #[must_use]
    pub fn new(downloader: &'a dyn ArtefactDownloader, work_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            downloader,
            work_dir: work_dir.into(),
            trust_anchor: Cow::Borrowed(EMBEDDED_PUBLIC_KEY),
            is_windows: cfg!(windows),
        }
    }

    /// Replaces the trust anchor. Intended for tests.
    #[must_use]
    pub fn with_trust_anchor(mut self, key: impl Into<Cow<'static, [u8]>>) -> Self {
        self.trust_anchor = key.into();
        self
    }

    /// Overrides the platform the binary is installed for.
    #[must_use]
    pub fn for_windows(mut self, is_windows: bool) -> Self {
        self.is_windows = is_windows;
        self
    }

    /// The working area.
    #[must_use]
    pub fn work_dir(&self) -> &Utf8Path {
        &self.work_dir
    }

    /// Runs the pipeline for `url`, reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidUrl`] before any download for a
    /// malformed URL, [`InstallerError::Network`] or [`InstallerError::Io`]
    /// for transfer and filesystem failures,
    /// [`InstallerError::Verification`] when the signature cannot be checked
    /// or is rejected, and [`InstallerError::Integrity`] when the binary does
    /// not match its published checksum.
    pub fn acquire(&self, url: &str, progress: &mut dyn Write) -> Result<CliSetup> {
        let url = CliUrl::parse(url)?;
        fs::create_dir_all(&self.work_dir)?;

        let bundle = VerificationBundle::in_work_dir(
            &self.work_dir,
            CliSetup::executable_name(self.is_windows),
        );
        if let Err(err) = self.install(&url, &bundle, progress) {
            remove_quietly(&bundle.binary_path);
            return Err(err);
        }

        info!(
            target: "wizcli::acquisition",
            "verified {} ({}) at {}",
            url.binary(),
            url.version(),
            bundle.binary_path
        );
        Ok(CliSetup {
            path: bundle.binary_path,
            version: url.version(),
            is_windows: self.is_windows,
        })
    }

    fn install(
        &self,
        url: &CliUrl,
        bundle: &VerificationBundle,
        progress: &mut dyn Write,
    ) -> Result<()> {
        let _cleanup = bundle.cleanup_guard();

        write_stderr_line(progress, format!("Downloading wizcli from {url}..."));
        self.fetch(url.as_str(), &bundle.binary_path)?;
        self.fetch(&url.checksum_url(), &bundle.checksum_path)?;
        self.fetch(&url.signature_url(), &bundle.signature_path)?;
        fs::write(&bundle.public_key_path, &self.trust_anchor)?;

        if !bundle.verify_signature()? {
            return Err(InstallerError::signature_rejected());
        }
        debug!(target: "wizcli::acquisition", "checksum signature verified");

        verify_checksum(bundle)?;
        if !self.is_windows {
            make_executable(&bundle.binary_path)?;
        }
        write_stderr_line(progress, "Verified wizcli signature and checksum.");
        Ok(())
    }

    fn fetch(&self, url: &str, destination: &Utf8Path) -> Result<()> {
        debug!(target: "wizcli::acquisition", "fetching {url} into {destination}");
        self.downloader.download(&DownloadTarget::new(url, destination))?;
        Ok(())
    }
}

fn verify_checksum(bundle: &VerificationBundle) -> Result<()> {
    let published = fs::read(&bundle.checksum_path)?;
    let published = String::from_utf8_lossy(&published);
    let actual = digest_file(&bundle.binary_path)?;
    if actual.matches(&published) {
        Ok(())
    } else {
        Err(InstallerError::Integrity {
            expected: published.trim().to_owned(),
            actual: actual.into_inner(),
        })
    }
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Utf8Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "acquisition_tests.rs"]
mod tests;
