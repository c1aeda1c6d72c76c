//! Scanner artefacts: where they come from, how they are fetched, and how
//! their integrity is established.
//!
//! # Sub-modules
//!
//! - [`cli_url`] - Download URL parsing, side-file URLs, and dialect detection.
//! - [`download`] - Download trait and the `ureq` implementation.
//! - [`hasher`] - Streaming SHA-256 over files and readers.
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`verification`] - The transient verification bundle and its cleanup.

pub mod cli_url;
pub mod download;
pub mod hasher;
pub mod sha256_digest;
pub mod verification;
