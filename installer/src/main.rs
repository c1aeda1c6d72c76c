//! wizcli installer CLI entrypoint.
//!
//! This binary downloads the Wiz CLI scanner, authenticates it against the
//! embedded vendor key, and runs allow-listed scanner command lines.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::{self, Write};
use wizcli_common::config::{ConfigError, InstallerConfig};
use wizcli_installer::acquisition::{AcquisitionPipeline, CliSetup};
use wizcli_installer::artefact::download::HttpDownloader;
use wizcli_installer::cli::{Cli, Command, FetchArgs, REJECTED_EXIT_CODE, ScanArgs, ValidateArgs};
use wizcli_installer::command::validate;
use wizcli_installer::error::InstallerError;
use wizcli_installer::executor::SystemCommandExecutor;
use wizcli_installer::output::{setup_summary, write_stderr_line};
use wizcli_installer::runner::{VALIDATION_FAILED_EXIT_CODE, run_scan};

/// Failures that end the process with exit code 1.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Installer(#[from] InstallerError),
}

type RunResult = std::result::Result<i32, RunError>;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    let default_filter = default_log_filter(cli);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn default_log_filter(cli: &Cli) -> &'static str {
    if cli.quiet {
        return "error";
    }
    match cli.verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> RunResult {
    let config = load_config(cli.config.as_deref())?;
    let mut sink = io::sink();

    match &cli.command {
        Command::Validate(args) => Ok(run_validate(args, cli.quiet, stderr)?),
        Command::Fetch(args) => {
            let progress = progress_writer(cli.quiet, stderr, &mut sink);
            run_fetch(args, &config, stdout, progress)
        }
        Command::Scan(args) => {
            let progress = progress_writer(cli.quiet, stderr, &mut sink);
            run_scan_command(args, &config, progress)
        }
    }
}

fn progress_writer<'a>(
    quiet: bool,
    stderr: &'a mut dyn Write,
    sink: &'a mut io::Sink,
) -> &'a mut dyn Write {
    if quiet {
        return sink;
    }
    stderr
}

fn load_config(path: Option<&Utf8Path>) -> Result<InstallerConfig, ConfigError> {
    path.map_or_else(|| Ok(InstallerConfig::default()), InstallerConfig::load)
}

fn resolve_work_dir(requested: Option<&Utf8Path>, config: &InstallerConfig) -> Utf8PathBuf {
    requested
        .or(config.work_dir.as_deref())
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_owned)
}

fn acquire(
    url: &str,
    work_dir: Option<&Utf8Path>,
    config: &InstallerConfig,
    progress: &mut dyn Write,
) -> Result<CliSetup, InstallerError> {
    let downloader = HttpDownloader::new(&config.network)?;
    let pipeline = AcquisitionPipeline::new(&downloader, resolve_work_dir(work_dir, config));
    pipeline.acquire(url, progress)
}

fn run_fetch(
    args: &FetchArgs,
    config: &InstallerConfig,
    stdout: &mut dyn Write,
    progress: &mut dyn Write,
) -> RunResult {
    let setup = acquire(&args.url, args.work_dir.as_deref(), config, progress)?;
    write_stderr_line(progress, setup_summary(&setup));
    if writeln!(stdout, "{}", setup.path).is_err() {
        // Nothing useful can be reported if stdout is closed.
    }
    Ok(0)
}

fn run_validate(
    args: &ValidateArgs,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<i32, InstallerError> {
    let version = args.tool_version()?;
    match validate(&args.command_line, version) {
        Ok(tokens) => {
            if !quiet {
                write_stderr_line(
                    stderr,
                    format!("Accepted {version} command ({} tokens).", tokens.len()),
                );
            }
            Ok(0)
        }
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            Ok(REJECTED_EXIT_CODE)
        }
    }
}

fn run_scan_command(
    args: &ScanArgs,
    config: &InstallerConfig,
    progress: &mut dyn Write,
) -> RunResult {
    let setup = acquire(&args.url, args.work_dir.as_deref(), config, progress)?;
    let exit_code = run_scan(&SystemCommandExecutor, &setup, &args.command_line, progress)?;
    Ok(process_exit_code(exit_code))
}

/// Maps the runner's rejection sentinel to a portable process status.
fn process_exit_code(scan_exit_code: i32) -> i32 {
    if scan_exit_code == VALIDATION_FAILED_EXIT_CODE {
        REJECTED_EXIT_CODE
    } else {
        scan_exit_code
    }
}

fn exit_code_for_run_result(result: RunResult, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
