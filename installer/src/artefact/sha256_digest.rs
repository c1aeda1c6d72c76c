//! SHA-256 digest newtype for downloaded artefacts.
//!
//! Values are only produced by hashing, so the inner string is always 64
//! lower-case hexadecimal characters with no separators.

use sha2::digest::Output;
use sha2::Sha256;
use std::fmt;
use std::fmt::Write as _;

/// Expected length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// A hex-encoded SHA-256 digest computed from artefact bytes.
///
/// # Examples
///
/// ```
/// use wizcli_installer::artefact::hasher::digest_bytes;
///
/// let digest = digest_bytes(b"abc");
/// assert_eq!(digest.as_str().len(), 64);
/// assert!(digest.matches("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    pub(crate) fn from_output(output: &Output<Sha256>) -> Self {
        let mut hex = String::with_capacity(DIGEST_HEX_LEN);
        for byte in output {
            // Writing to a String cannot fail.
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Compares against the content of a published checksum file.
    ///
    /// Surrounding whitespace is ignored; everything else must match
    /// byte for byte, so an upper-case digest does not match.
    #[must_use]
    pub fn matches(&self, published: &str) -> bool {
        published.trim() == self.0
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::hasher::digest_bytes;
    use rstest::rstest;

    const ABC_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn renders_lower_case_hex_without_separators() {
        let digest = digest_bytes(b"abc");
        assert_eq!(digest.as_str(), ABC_DIGEST);
        assert_eq!(digest.as_str().len(), DIGEST_HEX_LEN);
    }

    #[rstest]
    #[case::exact(ABC_DIGEST, true)]
    #[case::trailing_newline("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\n", true)]
    #[case::surrounding_spaces("  ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  ", true)]
    #[case::upper_case("BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD", false)]
    #[case::truncated("ba7816bf", false)]
    #[case::with_file_name("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  wizcli", false)]
    #[case::empty("", false)]
    fn matches_published_checksum(#[case] published: &str, #[case] expected: bool) {
        assert_eq!(digest_bytes(b"abc").matches(published), expected);
    }

    #[test]
    fn display_shows_full_digest() {
        let digest = digest_bytes(b"abc");
        assert_eq!(format!("{digest}"), ABC_DIGEST);
        assert_eq!(digest.into_inner(), ABC_DIGEST);
    }
}
