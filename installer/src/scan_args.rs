//! Argument vectors for scanner launches.

use crate::acquisition::CliSetup;
use crate::command::{ValidationError, validate};
use crate::tool_version::ToolVersion;

/// Validates `user_input` and builds the full argument vector.
///
/// The vector starts with the launch command, continues with the user's
/// tokens, and ends with the dialect's JSON output flag unless the user
/// already chose an output format.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use wizcli_installer::acquisition::CliSetup;
/// use wizcli_installer::scan_args::build_scan_arguments;
/// use wizcli_installer::tool_version::ToolVersion;
///
/// let setup = CliSetup {
///     path: Utf8PathBuf::from("/work/wizcli"),
///     version: ToolVersion::Legacy,
///     is_windows: false,
/// };
/// let argv = build_scan_arguments("dir scan --path .", &setup).expect("valid command");
/// assert_eq!(argv, ["./wizcli", "dir", "scan", "--path", ".", "-f", "json"]);
/// ```
pub fn build_scan_arguments(
    user_input: &str,
    setup: &CliSetup,
) -> Result<Vec<String>, ValidationError> {
    let tokens = validate(user_input, setup.version)?;
    let mut argv = Vec::with_capacity(tokens.len() + 3);
    argv.push(setup.launch_command());
    argv.extend(tokens);
    append_output_flag(&mut argv, setup.version);
    Ok(argv)
}

fn append_output_flag(argv: &mut Vec<String>, version: ToolVersion) {
    if argv.iter().any(|token| version.is_output_flag(token)) {
        return;
    }
    argv.extend(version.default_output_flag().map(str::to_owned));
}
