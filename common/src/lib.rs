//! Shared infrastructure for the wizcli installer: configuration loading and
//! the fixture helpers used by its test suites.

pub mod config;
pub mod test_support;

pub use config::{ConfigError, InstallerConfig, NetworkConfig, ProxySettings};
