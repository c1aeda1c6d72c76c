//! Quote-aware splitting of a command line.
//!
//! A token is either a maximal run of characters that are neither
//! whitespace nor quote marks, or a complete single- or double-quoted span
//! with its quotes removed. A quote mark with no partner is dropped and
//! scanning resumes after it. No escape sequences are recognised.

/// Splits `input` into tokens.
///
/// # Examples
///
/// ```
/// use wizcli_installer::command::tokenize;
///
/// let tokens = tokenize(r#"dir scan --path "/my project" --tag 'a b'"#);
/// assert_eq!(tokens, ["dir", "scan", "--path", "/my project", "--tag", "a b"]);
/// ```
#[must_use]
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = input;
    while let Some(first) = rest.chars().next() {
        if is_separator(first) {
            rest = &rest[first.len_utf8()..];
        } else if is_quote(first) {
            let body = &rest[1..];
            match body.find(first) {
                Some(close) => {
                    tokens.push(body[..close].to_owned());
                    rest = &body[close + 1..];
                }
                None => rest = body,
            }
        } else {
            let end = rest
                .find(|c: char| is_separator(c) || is_quote(c))
                .unwrap_or(rest.len());
            tokens.push(rest[..end].to_owned());
            rest = &rest[end..];
        }
    }
    tokens
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}
