//! Process launching for the scanner.
//!
//! The runner describes a launch as a [`ProcessSpec`]; an executor carries
//! it out and reports the exit code. Tests substitute a stub so no process
//! is spawned.

use camino::Utf8PathBuf;
use log::debug;
use std::fs::File;
use std::io;
use std::process::{Command, Stdio};

/// Exit code reported for a process that ended without one, for example
/// because a signal killed it.
pub const SIGNALLED_EXIT_CODE: i32 = 1;

/// Everything needed to launch the scanner once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Program to run, resolved against `working_dir` when relative.
    pub program: String,
    /// Arguments after the program.
    pub args: Vec<String>,
    /// Directory the process starts in.
    pub working_dir: Utf8PathBuf,
    /// File receiving standard output. Truncated first.
    pub stdout_path: Utf8PathBuf,
    /// File receiving standard error. Truncated first.
    pub stderr_path: Utf8PathBuf,
}

/// Abstraction for running the scanner.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs `spec` to completion and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while creating the output files or
    /// spawning and waiting for the process.
    fn run(&self, spec: &ProcessSpec) -> io::Result<i32>;
}

/// Runs processes on the host with [`std::process::Command`].
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8PathBuf;
/// use wizcli_installer::executor::{CommandExecutor, ProcessSpec, SystemCommandExecutor};
///
/// let spec = ProcessSpec {
///     program: "./wizcli".to_owned(),
///     args: vec!["dir".to_owned(), "scan".to_owned()],
///     working_dir: Utf8PathBuf::from("/work"),
///     stdout_path: Utf8PathBuf::from("/work/wizcli_output"),
///     stderr_path: Utf8PathBuf::from("/work/wizcli_err_output"),
/// };
/// let code = SystemCommandExecutor.run(&spec)?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, spec: &ProcessSpec) -> io::Result<i32> {
        let stdout = File::create(&spec.stdout_path)?;
        let stderr = File::create(&spec.stderr_path)?;
        debug!(
            target: "wizcli::executor",
            "running {} with {} argument(s) in {}",
            spec.program,
            spec.args.len(),
            spec.working_dir
        );
        let status = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()?;
        Ok(status.code().unwrap_or(SIGNALLED_EXIT_CODE))
    }
}
