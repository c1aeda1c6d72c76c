//! Staged validation of scanner command lines.
//!
//! The stages run in a fixed order and the first failure is reported:
//!
//! 1. tokenise, rejecting input with no tokens;
//! 2. check the root command against the dialect's roots;
//! 3. when the root restricts its subcommands and a second token exists,
//!    check that token;
//! 4. scan every token for blank values and shell metacharacters.
//!
//! Flag values are never interpreted.

use super::grammar::CommandGrammar;
use super::tokenize::tokenize;
use crate::tool_version::ToolVersion;
use log::debug;
use thiserror::Error;

/// Characters that could chain, pipe, or redirect if a token ever reached
/// a shell.
pub const FORBIDDEN_CHARACTERS: [char; 6] = [';', '|', '&', '>', '<', '`'];

/// Reasons a command line is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The input held no tokens.
    #[error("no command provided")]
    NoCommand,

    /// The first token is not a root command of the dialect.
    #[error("invalid command \"{root}\"; allowed commands are: {}", .allowed.join(", "))]
    UnknownRoot {
        /// The rejected token.
        root: String,
        /// The dialect's root commands.
        allowed: &'static [&'static str],
    },

    /// The second token is not a subcommand of the root.
    #[error(
        "invalid subcommand \"{subcommand}\" for {root}; allowed subcommands are: {}",
        .allowed.join(", ")
    )]
    UnknownSubcommand {
        /// The accepted root command.
        root: String,
        /// The rejected token.
        subcommand: String,
        /// The root's subcommands.
        allowed: &'static [&'static str],
    },

    /// A token was empty or whitespace once its quotes were removed.
    #[error("empty argument provided")]
    EmptyArgument,

    /// A token contains one of [`FORBIDDEN_CHARACTERS`].
    #[error("invalid characters in argument: {argument}")]
    InvalidCharacters {
        /// The offending token.
        argument: String,
    },
}

/// Validates `command_line` for `version` and returns its tokens.
///
/// # Examples
///
/// ```
/// use wizcli_installer::command::{ValidationError, validate};
/// use wizcli_installer::tool_version::ToolVersion;
///
/// let tokens = validate("dir scan --path /x", ToolVersion::Legacy).expect("allowed");
/// assert_eq!(tokens, ["dir", "scan", "--path", "/x"]);
///
/// let err = validate("scan dir /x", ToolVersion::Legacy).expect_err("not a legacy root");
/// assert!(matches!(err, ValidationError::UnknownRoot { .. }));
/// ```
pub fn validate(command_line: &str, version: ToolVersion) -> Result<Vec<String>, ValidationError> {
    let tokens = tokenize(command_line);
    let grammar = CommandGrammar::for_version(version);

    let (root, rest) = tokens.split_first().ok_or(ValidationError::NoCommand)?;
    if !grammar.is_root(root) {
        return Err(ValidationError::UnknownRoot {
            root: root.clone(),
            allowed: grammar.roots(),
        });
    }

    if let (Some(allowed), Some(subcommand)) = (grammar.subcommands(root), rest.first()) {
        check_subcommand(root, subcommand, allowed)?;
    }

    for token in &tokens {
        check_token(token)?;
    }

    debug!(target: "wizcli::command", "accepted {version} command with {} token(s)", tokens.len());
    Ok(tokens)
}

fn check_subcommand(
    root: &str,
    subcommand: &str,
    allowed: &'static [&'static str],
) -> Result<(), ValidationError> {
    if allowed.contains(&subcommand) {
        Ok(())
    } else {
        Err(ValidationError::UnknownSubcommand {
            root: root.to_owned(),
            subcommand: subcommand.to_owned(),
            allowed,
        })
    }
}

fn check_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::EmptyArgument);
    }
    if token.contains(FORBIDDEN_CHARACTERS) {
        return Err(ValidationError::InvalidCharacters {
            argument: token.to_owned(),
        });
    }
    Ok(())
}
