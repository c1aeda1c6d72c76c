//! CLI argument definitions for the wizcli installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::artefact::cli_url::{CliUrl, CliUrlError};
use crate::tool_version::ToolVersion;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Process exit code for a command line refused by validation.
pub const REJECTED_EXIT_CODE: i32 = 2;

/// Fetch, verify, and run the Wiz CLI scanner.
#[derive(Parser, Debug)]
#[command(name = "wizcli-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Fetch, verify, and run the Wiz CLI scanner.\n\n",
    "The scanner is downloaded from downloads.wiz.io together with its published ",
    "SHA-256 checksum and a detached OpenPGP signature over that checksum. The ",
    "signature is checked against the vendor key compiled into this installer ",
    "before the checksum is trusted, and the binary is only made executable once ",
    "both checks pass.\n\n",
    "Scanner command lines are allow-listed per dialect before anything is run.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Download and verify the latest legacy release:\n",
    "    $ wizcli-installer fetch https://downloads.wiz.io/wizcli/latest/wizcli-linux-amd64\n\n",
    "  Check a command line without running anything:\n",
    "    $ wizcli-installer validate --dialect current 'scan dir .'\n\n",
    "  Fetch and scan in one step:\n",
    "    $ wizcli-installer scan https://downloads.wiz.io/v1/wizcli/latest/wizcli-linux-amd64 'scan dir .'",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Read settings from this TOML file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download and verify the scanner.
    Fetch(FetchArgs),

    /// Check a scanner command line against the allow-list.
    Validate(ValidateArgs),

    /// Download and verify the scanner, then run a validated command.
    Scan(ScanArgs),
}

/// Arguments for the fetch command.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Download URL of the scanner binary.
    #[arg(value_name = "URL")]
    pub url: String,

    /// Working area for the binary [default: configuration or current directory].
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<Utf8PathBuf>,
}

/// Arguments for the validate command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// The scanner arguments, without the program name.
    #[arg(value_name = "COMMAND_LINE", allow_hyphen_values = true)]
    pub command_line: String,

    /// Dialect to validate against.
    #[arg(long, value_enum, conflicts_with = "url")]
    pub dialect: Option<ToolVersion>,

    /// Infer the dialect from a download URL instead.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

impl ValidateArgs {
    /// The dialect selected by `--dialect` or `--url`, defaulting to legacy.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_installer::cli::ValidateArgs;
    /// use wizcli_installer::tool_version::ToolVersion;
    ///
    /// let args = ValidateArgs {
    ///     command_line: "scan dir .".to_owned(),
    ///     dialect: None,
    ///     url: Some("https://downloads.wiz.io/wizcli/1.2.0/wizcli-linux-amd64".to_owned()),
    /// };
    /// assert_eq!(args.tool_version().expect("valid URL"), ToolVersion::Current);
    /// ```
    pub fn tool_version(&self) -> Result<ToolVersion, CliUrlError> {
        match (&self.url, self.dialect) {
            (Some(url), _) => Ok(CliUrl::parse(url)?.version()),
            (None, Some(dialect)) => Ok(dialect),
            (None, None) => Ok(ToolVersion::Legacy),
        }
    }
}

/// Arguments for the scan command.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Download URL of the scanner binary.
    #[arg(value_name = "URL")]
    pub url: String,

    /// The scanner arguments, without the program name.
    #[arg(value_name = "COMMAND_LINE", allow_hyphen_values = true)]
    pub command_line: String,

    /// Working area for the binary and scan output [default: configuration or
    /// current directory].
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<Utf8PathBuf>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
