//! Installer configuration loaded from TOML.
//!
//! The installer keeps its network settings and working-area override in a
//! small TOML document. Every field has a default so an empty file, or no
//! file at all, yields a usable configuration:
//!
//! ```toml
//! work_dir = "/var/lib/ci/workspace"
//!
//! [network]
//! connect_timeout_secs = 10
//! read_timeout_secs = 60
//!
//! [network.proxy]
//! url = "http://proxy.internal:3128"
//! no_proxy = ["localhost", ".corp.internal"]
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Path that was requested.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration {path}: {source}")]
    Parse {
        /// Path of the rejected document.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level installer configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Isolated working area for the downloaded binary and its transient
    /// verification files. Falls back to the current directory when unset.
    pub work_dir: Option<Utf8PathBuf>,
    /// HTTP settings used by the downloader.
    pub network: NetworkConfig,
}

impl InstallerConfig {
    /// Loads the configuration stored at `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = toml::from_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        debug!(target: "wizcli::config", "loaded configuration from {path}");
        Ok(config)
    }

    /// Parses configuration from an in-memory TOML document.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_common::config::InstallerConfig;
    ///
    /// let config = InstallerConfig::from_toml_str("[network]\nread_timeout_secs = 5\n")
    ///     .expect("valid configuration");
    /// assert_eq!(config.network.read_timeout().as_secs(), 5);
    /// assert_eq!(config.network.connect_timeout().as_secs(), 10);
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

/// Connection settings for artefact downloads.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Budget for establishing the TCP/TLS connection, in seconds.
    pub connect_timeout_secs: u64,
    /// Longest wait for the response headers or for any single read of the
    /// body, in seconds. A slow body that keeps delivering bytes never
    /// exhausts it.
    pub read_timeout_secs: u64,
    /// Optional forward proxy.
    pub proxy: Option<ProxySettings>,
}

impl NetworkConfig {
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the per-read idle timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Resolves the proxy URL to use for `host`, if any.
    #[must_use]
    pub fn proxy_for(&self, host: &str) -> Option<&str> {
        self.proxy.as_ref().and_then(|proxy| proxy.proxy_for(host))
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: Self::DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: Self::DEFAULT_READ_TIMEOUT_SECS,
            proxy: None,
        }
    }
}

/// Forward proxy with a host bypass list.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProxySettings {
    /// Proxy URL, for example `http://proxy.internal:3128`.
    pub url: String,
    /// Hosts that connect directly. Entries match exactly, or as a domain
    /// suffix when written as `.example.com` or `*.example.com`. A lone `*`
    /// bypasses the proxy for every host.
    #[serde(default)]
    pub no_proxy: Vec<String>,
}

impl ProxySettings {
    /// Returns the proxy URL unless `host` is on the bypass list.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_common::config::ProxySettings;
    ///
    /// let proxy = ProxySettings {
    ///     url: "http://proxy:3128".to_owned(),
    ///     no_proxy: vec![".internal".to_owned()],
    /// };
    /// assert_eq!(proxy.proxy_for("downloads.wiz.io"), Some("http://proxy:3128"));
    /// assert_eq!(proxy.proxy_for("mirror.internal"), None);
    /// ```
    #[must_use]
    pub fn proxy_for(&self, host: &str) -> Option<&str> {
        if self.no_proxy.iter().any(|entry| bypasses(entry, host)) {
            None
        } else {
            Some(self.url.as_str())
        }
    }
}

fn bypasses(entry: &str, host: &str) -> bool {
    let entry = entry.trim().to_ascii_lowercase();
    let host = host.to_ascii_lowercase();
    if entry.is_empty() {
        return false;
    }
    if entry == "*" {
        return true;
    }
    match entry.strip_prefix('*').unwrap_or(&entry).strip_prefix('.') {
        Some(domain) => host == domain || host.ends_with(&format!(".{domain}")),
        None => host == entry,
    }
}
