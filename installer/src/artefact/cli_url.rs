//! Download URL validation and dialect detection.
//!
//! Scanner builds are only accepted from the vendor download host, in one
//! of two shapes:
//!
//! - `https://downloads.wiz.io/wizcli/<version>/<binary>`
//! - `https://downloads.wiz.io/v1/wizcli/<version>/<binary>`
//!
//! The dialect is inferred from the path rather than declared.

use crate::tool_version::ToolVersion;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Host serving scanner builds.
pub const DOWNLOAD_HOST: &str = "downloads.wiz.io";

/// Product path segment.
pub const PRODUCT: &str = "wizcli";

/// Suffix appended to a binary URL to locate its checksum file.
pub const CHECKSUM_SUFFIX: &str = "-sha256";

/// Suffix appended to a checksum URL to locate its detached signature.
pub const SIGNATURE_SUFFIX: &str = ".sig";

const CURRENT_SEGMENT: &str = "v1";

/// Errors raised for download URLs outside the accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliUrlError {
    /// The URL does not match either accepted shape.
    #[error(
        "invalid wizcli URL \"{url}\"; expected https://downloads.wiz.io/wizcli/<version>/<binary> \
         or https://downloads.wiz.io/v1/wizcli/<version>/<binary>"
    )]
    Malformed {
        /// The rejected URL.
        url: String,
    },
}

/// A validated scanner download URL.
///
/// # Examples
///
/// ```
/// use wizcli_installer::artefact::cli_url::CliUrl;
/// use wizcli_installer::tool_version::ToolVersion;
///
/// let url: CliUrl = "https://downloads.wiz.io/v1/wizcli/latest/wizcli-linux-amd64"
///     .parse()
///     .expect("valid URL");
/// assert_eq!(url.version(), ToolVersion::Current);
/// assert!(url.signature_url().ends_with("wizcli-linux-amd64-sha256.sig"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliUrl {
    url: String,
    release: String,
    binary: String,
    version: ToolVersion,
}

impl CliUrl {
    /// Validates `url` and detects its dialect.
    pub fn parse(url: &str) -> Result<Self, CliUrlError> {
        let malformed = || CliUrlError::Malformed {
            url: url.to_owned(),
        };

        let parsed = Url::parse(url).map_err(|_| malformed())?;
        if parsed.as_str() != url || !is_vendor_origin(&parsed) {
            return Err(malformed());
        }
        let segments: Vec<&str> = parsed.path_segments().ok_or_else(malformed)?.collect();
        let (is_v1, path) = match segments.as_slice() {
            [CURRENT_SEGMENT, rest @ ..] => (true, rest),
            all => (false, all),
        };
        let [product, release, binary] = path else {
            return Err(malformed());
        };
        if *product != PRODUCT || release.is_empty() || binary.is_empty() {
            return Err(malformed());
        }

        let version = if is_v1 || release.starts_with("1.") {
            ToolVersion::Current
        } else {
            ToolVersion::Legacy
        };

        Ok(Self {
            url: url.to_owned(),
            release: (*release).to_owned(),
            binary: (*binary).to_owned(),
            version,
        })
    }

    /// The URL as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The release segment, for example `latest` or `1.0.2`.
    #[must_use]
    pub fn release(&self) -> &str {
        &self.release
    }

    /// The binary name segment.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// The dialect implied by the path.
    #[must_use]
    pub fn version(&self) -> ToolVersion {
        self.version
    }

    /// URL of the published SHA-256 checksum file.
    #[must_use]
    pub fn checksum_url(&self) -> String {
        format!("{}{CHECKSUM_SUFFIX}", self.url)
    }

    /// URL of the detached signature over the checksum file.
    #[must_use]
    pub fn signature_url(&self) -> String {
        format!("{}{CHECKSUM_SUFFIX}{SIGNATURE_SUFFIX}", self.url)
    }
}

/// Accepts only the bare vendor origin: `https`, the download host, the
/// default port, and no credentials, query, or fragment.
fn is_vendor_origin(url: &Url) -> bool {
    url.scheme() == "https"
        && url.host_str() == Some(DOWNLOAD_HOST)
        && url.port().is_none()
        && url.username().is_empty()
        && url.password().is_none()
        && url.query().is_none()
        && url.fragment().is_none()
}

impl FromStr for CliUrl {
    type Err = CliUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CliUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
