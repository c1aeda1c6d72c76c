//! Progress and summary lines for the installer CLI.
//!
//! Progress goes to a caller-supplied writer (standard error in the
//! binary) so library code never writes to the terminal directly.

use crate::acquisition::CliSetup;
use std::fmt::Display;
use std::io::Write;

/// Writes `message` and a newline, ignoring a closed or failing stream.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Progress is advisory; a broken pipe must not abort the pipeline.
    }
}

/// Describes a verified scanner.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use wizcli_installer::acquisition::CliSetup;
/// use wizcli_installer::output::setup_summary;
/// use wizcli_installer::tool_version::ToolVersion;
///
/// let setup = CliSetup {
///     path: Utf8PathBuf::from("/work/wizcli"),
///     version: ToolVersion::Current,
///     is_windows: false,
/// };
/// assert_eq!(setup_summary(&setup), "wizcli ready at /work/wizcli (current dialect)");
/// ```
#[must_use]
pub fn setup_summary(setup: &CliSetup) -> String {
    format!("wizcli ready at {} ({} dialect)", setup.path, setup.version)
}

/// Describes how a scan ended.
#[must_use]
pub fn scan_outcome(exit_code: i32) -> String {
    if exit_code == 0 {
        "Scan completed successfully.".to_owned()
    } else {
        format!("Scan failed with exit code {exit_code}.")
    }
}
