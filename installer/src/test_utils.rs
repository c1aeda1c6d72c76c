//! Shared test utilities for the installer crate.

use crate::artefact::download::{ArtefactDownloader, DownloadError, DownloadTarget};
use crate::artefact::hasher::digest_bytes;
use crate::executor::{CommandExecutor, ProcessSpec};
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;

/// Directory holding the signed release fixtures.
#[must_use]
pub fn fixture_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Reads the fixture called `name`.
///
/// # Panics
///
/// Panics if the fixture does not exist.
#[must_use]
pub fn fixture_bytes(name: &str) -> Vec<u8> {
    let path = fixture_dir().join(name);
    std::fs::read(&path).unwrap_or_else(|err| panic!("failed to read fixture {path}: {err}"))
}

/// Lower-case hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    digest_bytes(bytes).into_inner()
}

/// Serves files from disk keyed by URL instead of using the network.
///
/// Unknown URLs answer with HTTP 404. Every request is recorded so tests can
/// assert what was fetched.
#[derive(Debug, Default)]
pub struct FixtureDownloader {
    routes: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl FixtureDownloader {
    /// Creates a downloader with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`.
    #[must_use]
    pub fn serve(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(url.into(), body.into());
        self
    }

    /// Serves the fixture `name` for `url`.
    #[must_use]
    pub fn serve_fixture(self, url: impl Into<String>, name: &str) -> Self {
        self.serve(url, fixture_bytes(name))
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ArtefactDownloader for FixtureDownloader {
    fn download(&self, target: &DownloadTarget) -> Result<(), DownloadError> {
        self.requests.borrow_mut().push(target.url.clone());
        let Some(body) = self.routes.get(&target.url) else {
            return Err(DownloadError::Status {
                url: target.url.clone(),
                status: 404,
            });
        };
        if let Some(parent) = target.destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target.destination, body)?;
        Ok(())
    }
}

/// A `CommandExecutor` that records launches and returns queued exit codes.
///
/// When the queue runs dry every further launch exits with `0`.
#[derive(Debug, Default)]
pub struct StubExecutor {
    exit_codes: RefCell<VecDeque<i32>>,
    launches: RefCell<Vec<ProcessSpec>>,
}

impl StubExecutor {
    /// Creates an executor answering with `exit_codes` in order.
    #[must_use]
    pub fn new(exit_codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            exit_codes: RefCell::new(exit_codes.into_iter().collect()),
            launches: RefCell::new(Vec::new()),
        }
    }

    /// Processes launched so far.
    #[must_use]
    pub fn launches(&self) -> Vec<ProcessSpec> {
        self.launches.borrow().clone()
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, spec: &ProcessSpec) -> io::Result<i32> {
        self.launches.borrow_mut().push(spec.clone());
        Ok(self.exit_codes.borrow_mut().pop_front().unwrap_or(0))
    }
}

/// Converts a temporary directory into a UTF-8 working area path.
///
/// # Panics
///
/// Panics if the path is not valid UTF-8.
#[must_use]
pub fn utf8_path(path: &std::path::Path) -> Utf8PathBuf {
    Utf8Path::from_path(path)
        .unwrap_or_else(|| panic!("non-UTF-8 path: {}", path.display()))
        .to_owned()
}
