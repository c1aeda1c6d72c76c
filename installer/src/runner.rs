//! Gated scanner launches.
//!
//! A command line is validated before anything is spawned. Rejected input
//! yields [`VALIDATION_FAILED_EXIT_CODE`] without touching the executor;
//! accepted input runs in the scanner's working area with both output
//! streams captured to files there. Once the scanner exits, its JSON report
//! is summarised on the progress stream.

use crate::acquisition::CliSetup;
use crate::error::Result;
use crate::executor::{CommandExecutor, ProcessSpec};
use crate::output::{scan_outcome, write_stderr_line};
use crate::scan_args::build_scan_arguments;
use crate::scan_result::ScanReport;
use log::{error, info, warn};
use std::io::Write;

/// Sentinel returned when the command line is rejected before launch.
pub const VALIDATION_FAILED_EXIT_CODE: i32 = -1;

/// File in the working area receiving the scanner's standard output.
pub const OUTPUT_FILE_NAME: &str = "wizcli_output";

/// File in the working area receiving the scanner's standard error.
pub const ERROR_OUTPUT_FILE_NAME: &str = "wizcli_err_output";

/// Validates `user_input` and runs the scanner described by `setup`.
///
/// Returns the scanner's exit code, or [`VALIDATION_FAILED_EXIT_CODE`] when
/// the input is rejected.
///
/// # Errors
///
/// Returns [`crate::error::InstallerError::Io`] when the process cannot be
/// started or its output files cannot be created.
pub fn run_scan(
    executor: &dyn CommandExecutor,
    setup: &CliSetup,
    user_input: &str,
    progress: &mut dyn Write,
) -> Result<i32> {
    let argv = match build_scan_arguments(user_input, setup) {
        Ok(argv) => argv,
        Err(err) => {
            error!(target: "wizcli::runner", "command rejected: {err}");
            write_stderr_line(progress, format!("Invalid command: {err}"));
            return Ok(VALIDATION_FAILED_EXIT_CODE);
        }
    };

    let work_dir = setup.work_dir();
    let mut argv = argv.into_iter();
    let program = argv.next().unwrap_or_else(|| setup.launch_command());
    let spec = ProcessSpec {
        program,
        args: argv.collect(),
        working_dir: work_dir.to_owned(),
        stdout_path: work_dir.join(OUTPUT_FILE_NAME),
        stderr_path: work_dir.join(ERROR_OUTPUT_FILE_NAME),
    };

    write_stderr_line(progress, format!("Running {} in {work_dir}...", spec.program));
    let exit_code = executor.run(&spec)?;
    info!(target: "wizcli::runner", "scanner exited with {exit_code}");

    if exit_code != 0 {
        report_error_output(&spec, progress);
    }
    write_stderr_line(progress, scan_outcome(exit_code));
    report_scan_result(&spec, progress);
    Ok(exit_code)
}

fn report_scan_result(spec: &ProcessSpec, progress: &mut dyn Write) {
    match ScanReport::load(&spec.stdout_path) {
        Ok(report) => write_stderr_line(progress, report.summary()),
        Err(err) => {
            warn!(target: "wizcli::runner", "no scan summary: {err}");
        }
    }
}

fn report_error_output(spec: &ProcessSpec, progress: &mut dyn Write) {
    match std::fs::read_to_string(&spec.stderr_path) {
        Ok(text) if !text.trim().is_empty() => {
            write_stderr_line(progress, "Error output:");
            write_stderr_line(progress, text.trim_end());
        }
        Ok(_) => {}
        Err(err) => {
            warn!(target: "wizcli::runner", "could not read {}: {err}", spec.stderr_path);
        }
    }
}
