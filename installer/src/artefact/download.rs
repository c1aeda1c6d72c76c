//! HTTP retrieval of the scanner binary and its verification side files.
//!
//! Provides a trait-based abstraction so the acquisition pipeline can be
//! exercised without network access, and a `ureq` implementation with a
//! connect budget, a per-read idle budget, and optional forward-proxy
//! routing.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use url::{Host, Url};
use ureq::http::StatusCode;
use wizcli_common::config::NetworkConfig;

/// Size of the buffer used to stream response bodies to disk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

/// A single file to retrieve: where from and where to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Absolute `https` URL of the file.
    pub url: String,
    /// Path the body is written to. Parent directories are created.
    pub destination: Utf8PathBuf,
}

impl DownloadTarget {
    /// Pairs a URL with its destination path.
    #[must_use]
    pub fn new(url: impl Into<String>, destination: impl Into<Utf8PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
        }
    }
}

/// Trait for downloading artefact files.
///
/// # Examples
///
/// ```no_run
/// use wizcli_common::config::NetworkConfig;
/// use wizcli_installer::artefact::download::{ArtefactDownloader, DownloadTarget, HttpDownloader};
///
/// let downloader = HttpDownloader::new(&NetworkConfig::default()).expect("valid settings");
/// let target = DownloadTarget::new(
///     "https://downloads.wiz.io/wizcli/latest/wizcli-linux-amd64",
///     "/tmp/work/wizcli",
/// );
/// downloader.download(&target).expect("download succeeds");
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactDownloader {
    /// Retrieve `target.url` into `target.destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not `200 OK`,
    /// or the body cannot be written in full.
    fn download(&self, target: &DownloadTarget) -> Result<(), DownloadError>;
}

/// Errors arising from artefact download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request could not be completed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered with something other than `200 OK`.
    #[error("download failed for {url}: HTTP status {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The status code received.
        status: u16,
    },

    /// The connect budget ran out, or the server went quiet for longer than
    /// the read budget while sending headers or body.
    #[error("download timed out for {url}: {reason}")]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// Which budget ran out.
        reason: String,
    },

    /// The configured proxy URL is not usable.
    #[error("invalid proxy configuration {proxy}: {reason}")]
    InvalidProxy {
        /// The rejected proxy URL.
        proxy: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// I/O error writing the downloaded file, or a body read that failed for
    /// a reason other than a timeout.
    #[error("I/O error writing download: {0}")]
    Io(#[from] io::Error),
}

/// HTTP-based downloader using `ureq`.
pub struct HttpDownloader {
    direct: ureq::Agent,
    proxied: Option<ureq::Agent>,
    network: NetworkConfig,
}

impl HttpDownloader {
    /// Builds agents for the timeouts and proxy in `network`.
    pub fn new(network: &NetworkConfig) -> Result<Self, DownloadError> {
        let proxied = match &network.proxy {
            Some(settings) => {
                let proxy =
                    ureq::Proxy::new(&settings.url).map_err(|err| DownloadError::InvalidProxy {
                        proxy: settings.url.clone(),
                        reason: err.to_string(),
                    })?;
                Some(build_agent(network, Some(proxy)))
            }
            None => None,
        };
        Ok(Self {
            direct: build_agent(network, None),
            proxied,
            network: network.clone(),
        })
    }

    fn agent_for(&self, url: &str) -> &ureq::Agent {
        let Some(host) = host_of(url) else {
            return &self.direct;
        };
        match (&self.proxied, self.network.proxy_for(&host)) {
            (Some(agent), Some(proxy)) => {
                debug!(target: "wizcli::download", "routing {host} through proxy {proxy}");
                agent
            }
            _ => &self.direct,
        }
    }
}

impl ArtefactDownloader for HttpDownloader {
    fn download(&self, target: &DownloadTarget) -> Result<(), DownloadError> {
        let url = target.url.as_str();
        let response = self
            .agent_for(url)
            .get(url)
            .call()
            .map_err(|err| map_ureq_error(url, err))?;
        if response.status() != StatusCode::OK {
            return Err(DownloadError::Status {
                url: url.to_owned(),
                status: response.status().as_u16(),
            });
        }

        if let Some(parent) = target.destination.parent() {
            if !parent.as_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let body = response.into_body().into_reader();
        let mut body = IdleTimeoutReader::spawn(body, self.network.read_timeout());
        let written = write_body(&mut body, &target.destination).map_err(|err| {
            discard_partial(&target.destination);
            map_body_error(url, err)
        })?;
        debug!(
            target: "wizcli::download",
            "wrote {written} bytes from {url} to {}",
            target.destination
        );
        Ok(())
    }
}

/// Streams `body` into a fresh file at `dest` in fixed-size chunks.
///
/// Any read failure, including an interrupted one, is returned as-is.
fn write_body(body: &mut dyn Read, dest: &Utf8Path) -> io::Result<u64> {
    let mut file = File::create(dest)?;
    let mut buffer = [0_u8; DOWNLOAD_CHUNK_SIZE];
    let mut written = 0_u64;
    loop {
        let read = body.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])?;
        written += read as u64;
    }
    file.flush()?;
    Ok(written)
}

/// A body reader that fails once no bytes arrive for `idle`.
///
/// The wrapped reader runs on its own thread and hands chunks over a
/// bounded channel, so each wait for the next chunk is timed on its own
/// rather than against a deadline for the whole body.
struct IdleTimeoutReader {
    chunks: Receiver<io::Result<Vec<u8>>>,
    pending: Vec<u8>,
    offset: usize,
    idle: Duration,
    finished: bool,
}

impl IdleTimeoutReader {
    fn spawn<R>(mut body: R, idle: Duration) -> Self
    where
        R: Read + Send + 'static,
    {
        let (sender, chunks) = mpsc::sync_channel(1);
        thread::spawn(move || {
            let mut buffer = vec![0_u8; DOWNLOAD_CHUNK_SIZE];
            loop {
                let chunk = match body.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(read) => Ok(buffer[..read].to_vec()),
                    Err(err) => Err(err),
                };
                let failed = chunk.is_err();
                // A send error means the reader was dropped after a timeout.
                if sender.send(chunk).is_err() || failed {
                    break;
                }
            }
        });
        Self {
            chunks,
            pending: Vec::new(),
            offset: 0,
            idle,
            finished: false,
        }
    }

    fn refill(&mut self) -> io::Result<bool> {
        if self.finished {
            return Ok(false);
        }
        match self.chunks.recv_timeout(self.idle) {
            Ok(Ok(chunk)) => {
                self.pending = chunk;
                self.offset = 0;
                Ok(true)
            }
            Ok(Err(err)) => {
                self.finished = true;
                Err(err)
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.finished = true;
                Ok(false)
            }
            Err(RecvTimeoutError::Timeout) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no data received for {:?}", self.idle),
            )),
        }
    }
}

impl Read for IdleTimeoutReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.offset == self.pending.len() && !self.refill()? {
            return Ok(0);
        }
        let available = &self.pending[self.offset..];
        let len = available.len().min(buf.len());
        buf[..len].copy_from_slice(&available[..len]);
        self.offset += len;
        Ok(len)
    }
}

fn discard_partial(dest: &Utf8Path) {
    if let Err(err) = fs::remove_file(dest) {
        debug!(target: "wizcli::download", "could not remove partial download {dest}: {err}");
    }
}

fn build_agent(network: &NetworkConfig, proxy: Option<ureq::Proxy>) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(network.connect_timeout()))
        .timeout_recv_response(Some(network.read_timeout()))
        .timeout_recv_body(None)
        .http_status_as_error(false)
        .proxy(proxy)
        .build();
    ureq::Agent::new_with_config(config)
}

/// Extracts the host from an absolute URL, without port or credentials.
fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.host()? {
        Host::Domain(domain) => Some(domain.to_owned()),
        Host::Ipv4(address) => Some(address.to_string()),
        Host::Ipv6(address) => Some(address.to_string()),
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(status) => DownloadError::Status {
            url: url.to_owned(),
            status,
        },
        ureq::Error::Timeout(which) => DownloadError::Timeout {
            url: url.to_owned(),
            reason: which.to_string(),
        },
        ureq::Error::Io(source) => map_body_error(url, source),
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Classifies an I/O error raised while streaming a response body.
///
/// Idle timeouts, and `ureq` timeouts wrapped inside an I/O error, become
/// [`DownloadError::Timeout`]; anything else stays an I/O error.
fn map_body_error(url: &str, err: io::Error) -> DownloadError {
    if err.kind() == io::ErrorKind::TimedOut {
        return DownloadError::Timeout {
            url: url.to_owned(),
            reason: err.to_string(),
        };
    }
    let wrapped = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<ureq::Error>());
    match wrapped {
        Some(ureq::Error::Timeout(which)) => DownloadError::Timeout {
            url: url.to_owned(),
            reason: which.to_string(),
        },
        _ => DownloadError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::net::TcpListener;
    use std::thread::JoinHandle;
    use wizcli_common::config::ProxySettings;

    struct FailingBody {
        remaining: usize,
        kind: io::ErrorKind,
    }

    impl Read for FailingBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(self.kind, "transfer cut"));
            }
            let len = self.remaining.min(buf.len());
            buf[..len].fill(b'x');
            self.remaining -= len;
            Ok(len)
        }
    }

    fn temp_dest(name: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().join(name)).expect("UTF-8 path");
        (dir, path)
    }

    #[rstest]
    #[case::plain("https://downloads.wiz.io/wizcli/latest/wizcli-linux-amd64", "downloads.wiz.io")]
    #[case::with_port("http://proxy.internal:3128/x", "proxy.internal")]
    #[case::with_credentials("https://user:pw@mirror.example/x", "mirror.example")]
    #[case::with_query("https://downloads.wiz.io?x=1", "downloads.wiz.io")]
    #[case::ipv6("http://[::1]:8080/x", "::1")]
    #[case::mixed_case("https://Downloads.Wiz.IO/x", "downloads.wiz.io")]
    fn host_of_strips_scheme_port_and_path(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(host_of(url).as_deref(), Some(expected));
    }

    #[test]
    fn host_of_ignores_relative_urls() {
        assert_eq!(host_of("wizcli/latest/x"), None);
    }

    /// Serves one `200 OK` response whose body is written in `chunks`,
    /// sleeping for `pause` before each one.
    fn serve_slowly(chunks: Vec<Vec<u8>>, pause: Duration) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let address = listener.local_addr().expect("local address");
        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut byte = [0_u8; 1];
            while !request.ends_with(b"\r\n\r\n") {
                match stream.read(&mut byte) {
                    Ok(1) => request.push(byte[0]),
                    _ => return,
                }
            }
            let length: usize = chunks.iter().map(Vec::len).sum();
            let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {length}\r\n\r\n");
            if stream.write_all(head.as_bytes()).is_err() {
                return;
            }
            for chunk in chunks {
                thread::sleep(pause);
                if stream.write_all(&chunk).and_then(|()| stream.flush()).is_err() {
                    return;
                }
            }
        });
        (format!("http://{address}/wizcli"), handle)
    }

    fn one_second_budget() -> NetworkConfig {
        NetworkConfig {
            connect_timeout_secs: 1,
            read_timeout_secs: 1,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn slow_body_that_keeps_arriving_is_accepted() {
        let chunks = vec![vec![b'a'; 1000]; 4];
        let (url, server) = serve_slowly(chunks, Duration::from_millis(600));
        let (_dir, dest) = temp_dest("wizcli");
        let downloader = HttpDownloader::new(&one_second_budget()).expect("defaults");

        downloader
            .download(&DownloadTarget::new(url, dest.clone()))
            .expect("each read arrives within the budget");

        assert_eq!(std::fs::read(&dest).expect("read back").len(), 4000);
        server.join().expect("server thread");
    }

    #[test]
    fn stalled_body_times_out() {
        let chunks = vec![vec![b'a'; 100], vec![b'b'; 100]];
        let (url, _server) = serve_slowly(chunks, Duration::from_millis(2500));
        let (_dir, dest) = temp_dest("wizcli");
        let downloader = HttpDownloader::new(&one_second_budget()).expect("defaults");

        let err = downloader
            .download(&DownloadTarget::new(url, dest.clone()))
            .expect_err("server stalls");

        assert!(matches!(err, DownloadError::Timeout { .. }), "got {err:?}");
        assert!(!dest.exists());
    }

    #[test]
    fn idle_reader_yields_every_chunk_then_ends() {
        let payload: Vec<u8> = (0..DOWNLOAD_CHUNK_SIZE * 2 + 7).map(|i| i as u8).collect();
        let mut reader =
            IdleTimeoutReader::spawn(io::Cursor::new(payload.clone()), Duration::from_secs(5));
        let mut copied = Vec::new();
        reader.read_to_end(&mut copied).expect("body ends");
        assert_eq!(copied, payload);
    }

    #[test]
    fn idle_reader_forwards_body_errors() {
        let body = FailingBody {
            remaining: 10,
            kind: io::ErrorKind::ConnectionReset,
        };
        let mut reader = IdleTimeoutReader::spawn(body, Duration::from_secs(5));
        let mut copied = Vec::new();
        let err = reader.read_to_end(&mut copied).expect_err("reset surfaces");
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(copied.len(), 10);
    }

    #[test]
    fn write_body_copies_every_chunk() {
        let (_dir, dest) = temp_dest("body");
        let payload: Vec<u8> = (0..DOWNLOAD_CHUNK_SIZE * 3 + 5).map(|i| i as u8).collect();
        let written = write_body(&mut payload.as_slice(), &dest).expect("write succeeds");
        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&dest).expect("read back"), payload);
    }

    #[test]
    fn write_body_surfaces_interruption() {
        let (_dir, dest) = temp_dest("body");
        let mut body = FailingBody {
            remaining: DOWNLOAD_CHUNK_SIZE + 1,
            kind: io::ErrorKind::Interrupted,
        };
        let err = write_body(&mut body, &dest).expect_err("interruption surfaces");
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }

    #[test]
    fn discard_partial_removes_the_file() {
        let (_dir, dest) = temp_dest("partial");
        std::fs::write(&dest, b"half").expect("write partial");
        discard_partial(&dest);
        assert!(!dest.exists());
    }

    #[test]
    fn map_ureq_error_keeps_status_code() {
        let mapped = map_ureq_error("https://downloads.wiz.io/x", ureq::Error::StatusCode(404));
        assert!(matches!(mapped, DownloadError::Status { status: 404, .. }));
    }

    #[test]
    fn map_ureq_error_maps_timeouts() {
        let mapped = map_ureq_error(
            "https://downloads.wiz.io/x",
            ureq::Error::Timeout(ureq::Timeout::Connect),
        );
        assert!(matches!(mapped, DownloadError::Timeout { .. }));
    }

    #[test]
    fn wrapped_body_timeout_is_a_timeout() {
        let err = io::Error::other(ureq::Error::Timeout(ureq::Timeout::RecvBody));
        let mapped = map_body_error("https://downloads.wiz.io/x", err);
        assert!(matches!(mapped, DownloadError::Timeout { .. }));
    }

    #[test]
    fn idle_timeout_is_a_timeout() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "quiet");
        let mapped = map_body_error("https://downloads.wiz.io/x", err);
        assert!(matches!(mapped, DownloadError::Timeout { .. }));
    }

    #[test]
    fn other_body_errors_stay_io() {
        let err = io::Error::other(ureq::Error::HostNotFound);
        let mapped = map_body_error("https://downloads.wiz.io/x", err);
        assert!(matches!(mapped, DownloadError::Io(_)));
    }

    #[test]
    fn map_ureq_error_maps_io_to_io() {
        let mapped = map_ureq_error(
            "https://downloads.wiz.io/x",
            ureq::Error::Io(io::Error::new(io::ErrorKind::Interrupted, "stop")),
        );
        assert!(matches!(mapped, DownloadError::Io(_)));
    }

    #[test]
    fn map_ureq_error_maps_other_failures_to_http() {
        let mapped = map_ureq_error("https://downloads.wiz.io/x", ureq::Error::HostNotFound);
        assert!(matches!(mapped, DownloadError::Http { .. }));
    }

    #[test]
    fn new_rejects_unusable_proxy() {
        let network = NetworkConfig {
            proxy: Some(ProxySettings {
                url: "not a proxy url at all".to_owned(),
                no_proxy: Vec::new(),
            }),
            ..NetworkConfig::default()
        };
        let result = HttpDownloader::new(&network);
        assert!(matches!(result, Err(DownloadError::InvalidProxy { .. })));
    }

    #[test]
    fn proxy_routing_honours_bypass_list() {
        let network = NetworkConfig {
            proxy: Some(ProxySettings {
                url: "http://proxy.internal:3128".to_owned(),
                no_proxy: vec![".internal".to_owned()],
            }),
            ..NetworkConfig::default()
        };
        let downloader = HttpDownloader::new(&network).expect("valid proxy");
        let proxied = downloader.proxied.as_ref().expect("proxy agent built");

        assert!(std::ptr::eq(
            downloader.agent_for("https://downloads.wiz.io/wizcli/latest/x"),
            proxied
        ));
        assert!(std::ptr::eq(
            downloader.agent_for("https://mirror.internal/x"),
            &downloader.direct
        ));
    }

    #[test]
    fn without_proxy_every_host_connects_directly() {
        let downloader = HttpDownloader::new(&NetworkConfig::default()).expect("defaults");
        assert!(downloader.proxied.is_none());
        assert!(std::ptr::eq(
            downloader.agent_for("https://downloads.wiz.io/x"),
            &downloader.direct
        ));
    }
}
