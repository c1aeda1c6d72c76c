//! Behaviour-driven tests for gated scanner launches.
//!
//! A `StubExecutor` stands in for the scanner, so scenarios assert on the
//! process that would have been spawned.

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wizcli_installer::acquisition::CliSetup;
use wizcli_installer::runner::run_scan;
use wizcli_installer::test_utils::{StubExecutor, utf8_path};
use wizcli_installer::tool_version::ToolVersion;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

struct CommandWorld {
    _temp: tempfile::TempDir,
    work_dir: Utf8PathBuf,
    setup: Option<CliSetup>,
    executor: StubExecutor,
    exit_code: Option<i32>,
}

impl CommandWorld {
    fn install(&mut self, dialect: &str) {
        let version = match dialect {
            "legacy" => ToolVersion::Legacy,
            "current" => ToolVersion::Current,
            other => panic!("unknown dialect {other}"),
        };
        self.setup = Some(CliSetup {
            path: self.work_dir.join("wizcli"),
            version,
            is_windows: false,
        });
    }
}

#[fixture]
fn world() -> CommandWorld {
    let temp = tempfile::tempdir().expect("temp dir");
    let work_dir = utf8_path(temp.path());
    CommandWorld {
        _temp: temp,
        work_dir,
        setup: None,
        executor: StubExecutor::default(),
        exit_code: None,
    }
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a verified {dialect} scanner")]
fn given_scanner(world: &mut CommandWorld, dialect: String) {
    world.install(&dialect);
}

#[given("a verified {dialect} scanner that exits with {code}")]
fn given_failing_scanner(world: &mut CommandWorld, dialect: String, code: String) {
    world.install(&dialect);
    world.executor = StubExecutor::new([code.parse().expect("numeric exit code")]);
}

#[when("the user runs \"{command_line}\"")]
fn when_user_runs(world: &mut CommandWorld, command_line: String) {
    let setup = world.setup.as_ref().expect("scanner installed");
    let mut progress = Vec::new();
    let code = run_scan(&world.executor, setup, &command_line, &mut progress).expect("scan runs");
    world.exit_code = Some(code);
}

#[then("the scanner is launched with \"{argv}\"")]
fn then_launched_with(world: &mut CommandWorld, argv: String) {
    let launches = world.executor.launches();
    assert_eq!(launches.len(), 1, "launches: {launches:?}");
    let launch = &launches[0];
    let mut actual = vec![launch.program.clone()];
    actual.extend(launch.args.iter().cloned());
    assert_eq!(actual.join(" "), argv);
    assert_eq!(launch.working_dir, world.work_dir);
}

#[then("no process is launched")]
fn then_not_launched(world: &mut CommandWorld) {
    assert!(world.executor.launches().is_empty());
}

#[then("the exit code is {code}")]
fn then_exit_code(world: &mut CommandWorld, code: String) {
    let expected: i32 = code.parse().expect("numeric exit code");
    assert_eq!(world.exit_code, Some(expected));
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/command_validation.feature",
    name = "A legacy scan requests JSON output"
)]
fn scenario_legacy_json_output(world: CommandWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/command_validation.feature",
    name = "A current scan keeps the chosen format"
)]
fn scenario_current_keeps_format(world: CommandWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/command_validation.feature",
    name = "Shell metacharacters are rejected"
)]
fn scenario_metacharacters_rejected(world: CommandWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/command_validation.feature",
    name = "Unknown commands are rejected"
)]
fn scenario_unknown_command_rejected(world: CommandWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/command_validation.feature",
    name = "Legacy releases do not understand the scan root"
)]
fn scenario_legacy_scan_root_rejected(world: CommandWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/command_validation.feature",
    name = "A failing scan reports its exit code"
)]
fn scenario_failing_scan_exit_code(world: CommandWorld) {
    let _ = world;
}
