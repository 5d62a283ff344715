//! Parsing of pattern lists from config values.
//!
//! Several config options accept either a boolean or a list of regexes, with
//! the list given newline- or comma-separated. `true` means "match
//! everything" and `false` means "match nothing".

use tracing::debug;

use crate::{Pattern, PatternError, Result};

/// How to treat individual patterns that fail to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// A single bad pattern fails the whole parse (the hide-* flags)
    Strict,

    /// Bad patterns are dropped with a debug log (include/exclude lists)
    Lenient,
}

/// Split a raw list value into trimmed, non-empty items.
pub fn split_list(value: &str) -> Vec<&str> {
    value
        .split(['\n', ','])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Compile each item of a newline/comma-separated list.
pub fn parse_patterns(value: &str, strictness: Strictness) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();

    for item in split_list(value) {
        match Pattern::compile(item) {
            Ok(pattern) => patterns.push(pattern),
            Err(err) => match strictness {
                Strictness::Strict => return Err(err),
                Strictness::Lenient => {
                    debug!("dropping invalid regex pattern: {err}");
                }
            },
        }
    }

    Ok(patterns)
}

/// Parse a value that is either a boolean or a pattern list.
///
/// `true`/`True`/`TRUE` yields the match-all list `[".*"]`, the false
/// spellings yield an empty list, and anything else is parsed as a pattern
/// list under the given strictness.
pub fn parse_bool_or_patterns(value: &str, strictness: Strictness) -> Result<Vec<Pattern>> {
    match value.trim() {
        "true" | "True" | "TRUE" => {
            // cannot fail
            let all = Pattern::compile(".*")
                .map_err(|err| PatternError::compile(".*", err.to_string()))?;
            Ok(vec![all])
        }
        "false" | "False" | "FALSE" => Ok(Vec::new()),
        other => parse_patterns(other, strictness),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
