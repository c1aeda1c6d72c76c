//! Allow-listing of scanner command lines.
//!
//! A command line is split into tokens, its first token checked against the
//! dialect's root commands, its second against the root's subcommands (when
//! the root has any), and every token scanned for shell metacharacters.
//!
//! # Sub-modules
//!
//! - [`tokenize`] - Quote-aware splitting of a free-form argument string.
//! - [`grammar`] - Per-dialect root and subcommand tables.
//! - [`validator`] - The staged validation and its error type.

pub mod grammar;
pub mod tokenize;
pub mod validator;

pub use grammar::CommandGrammar;
pub use tokenize::tokenize;
pub use validator::{FORBIDDEN_CHARACTERS, ValidationError, validate};
