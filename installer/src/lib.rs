//! wizcli installer library.
//!
//! This crate downloads the Wiz CLI scanner, authenticates it with a detached
//! OpenPGP signature over its published SHA-256 checksum, and gates scanner
//! command lines behind a per-dialect allow-list before launching them. It is
//! used by the `wizcli-installer` CLI binary and can be consumed
//! programmatically for testing or custom CI integrations.
//!
//! # Modules
//!
//! - [`acquisition`] - Download, verify, and install the scanner binary
//! - [`artefact`] - URL shapes, HTTP download, hashing, and verification files
//! - [`cli`] - Command-line argument definitions
//! - [`command`] - Tokenising and allow-listing scanner command lines
//! - [`error`] - Error taxonomy for acquisition and gating
//! - [`executor`] - Process launching abstraction
//! - [`openpgp`] - Detached-signature verification built on `pgp`
//! - [`output`] - Progress and summary lines
//! - [`runner`] - Gated scanner launches with captured output
//! - [`scan_args`] - Argument vectors with the default output format
//! - [`scan_result`] - Scanner report parsing and finding counts
//! - [`tool_version`] - Legacy and current scanner dialects

pub mod acquisition;
pub mod artefact;
pub mod cli;
pub mod command;
pub mod error;
pub mod executor;
pub mod openpgp;
pub mod output;
pub mod runner;
pub mod scan_args;
pub mod scan_result;
pub mod tool_version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
