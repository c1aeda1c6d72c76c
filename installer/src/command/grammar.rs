//! Root and subcommand vocabularies for each scanner dialect.

use crate::tool_version::ToolVersion;

/// The commands a dialect accepts.
///
/// Roots without an entry in the subcommand table accept any second token;
/// the per-token character scan still applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandGrammar {
    roots: &'static [&'static str],
    subcommands: &'static [(&'static str, &'static [&'static str])],
}

const SCAN_ONLY: &[&str] = &["scan"];

const LEGACY: CommandGrammar = CommandGrammar {
    roots: &["auth", "dir", "docker", "iac"],
    subcommands: &[("dir", SCAN_ONLY), ("docker", SCAN_ONLY), ("iac", SCAN_ONLY)],
};

const CURRENT: CommandGrammar = CommandGrammar {
    roots: &["auth", "dir", "docker", "iac", "scan"],
    subcommands: &[
        ("dir", SCAN_ONLY),
        ("docker", SCAN_ONLY),
        ("iac", SCAN_ONLY),
        ("scan", &["dir", "container-image", "vm", "vm-image"]),
    ],
};

impl CommandGrammar {
    /// The grammar for `version`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_installer::command::CommandGrammar;
    /// use wizcli_installer::tool_version::ToolVersion;
    ///
    /// let grammar = CommandGrammar::for_version(ToolVersion::Current);
    /// assert!(grammar.is_root("scan"));
    /// assert_eq!(grammar.subcommands("scan"), Some(&["dir", "container-image", "vm", "vm-image"][..]));
    /// ```
    #[must_use]
    pub fn for_version(version: ToolVersion) -> &'static Self {
        match version {
            ToolVersion::Legacy => &LEGACY,
            ToolVersion::Current => &CURRENT,
        }
    }

    /// Root commands in declaration order.
    #[must_use]
    pub fn roots(&self) -> &'static [&'static str] {
        self.roots
    }

    /// Returns true when `token` is a root command.
    #[must_use]
    pub fn is_root(&self, token: &str) -> bool {
        self.roots.contains(&token)
    }

    /// The permitted subcommands of `root`, if it restricts them.
    #[must_use]
    pub fn subcommands(&self, root: &str) -> Option<&'static [&'static str]> {
        self.subcommands
            .iter()
            .find(|(name, _)| *name == root)
            .map(|(_, allowed)| *allowed)
    }
}
