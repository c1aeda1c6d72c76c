//! Scanner release dialects.
//!
//! Legacy and current scanner releases accept different command grammars
//! and expect different flags to request JSON output on standard output.

use std::fmt;

/// The command dialect spoken by a scanner release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ToolVersion {
    /// Releases before 1.0, addressed as `wizcli/<version>/...` or
    /// `wizcli/latest/...`.
    Legacy,
    /// 1.x releases and everything published under `v1/`.
    Current,
}

impl ToolVersion {
    /// The flag pair requesting JSON output when the caller gave none.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_installer::tool_version::ToolVersion;
    ///
    /// assert_eq!(ToolVersion::Legacy.default_output_flag(), ["-f", "json"]);
    /// assert_eq!(ToolVersion::Current.default_output_flag(), ["--stdout", "json"]);
    /// ```
    #[must_use]
    pub fn default_output_flag(self) -> [&'static str; 2] {
        match self {
            Self::Legacy => ["-f", "json"],
            Self::Current => ["--stdout", "json"],
        }
    }

    /// Returns true when `token` already selects an output format.
    ///
    /// Both the separated (`--format json`) and joined (`--format=json`)
    /// spellings count.
    #[must_use]
    pub fn is_output_flag(self, token: &str) -> bool {
        match self {
            Self::Legacy => token == "-f" || token == "--format" || token.starts_with("--format="),
            Self::Current => token == "--stdout" || token.starts_with("--stdout="),
        }
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Current => f.write_str("current"),
        }
    }
}
