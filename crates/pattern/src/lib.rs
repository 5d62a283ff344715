//! Pattern matching for filter and sanitize rules.
//!
//! Config values reference entities, branches, and project names by regular
//! expression. Most patterns compile with the standard `regex` engine; a few
//! users rely on Perl-style lookarounds (`(?!...)`, `(?=...)`) which that
//! engine does not support, so compilation falls back to `fancy-regex` for
//! exactly those patterns. The fallback is transparent: callers only ever see
//! [`Pattern`].

mod error;
mod parse;

pub use error::PatternError;
pub use parse::{parse_bool_or_patterns, parse_patterns, split_list, Strictness};

use std::fmt;

/// Result type for pattern operations
pub type Result<T> = std::result::Result<T, PatternError>;

/// A compiled pattern backed by one of two engines.
///
/// `Standard` is the common case. `Lookaround` is only constructed when the
/// standard engine rejects the source, which in practice means the pattern
/// uses lookahead/lookbehind assertions.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Compiled with the standard linear-time engine
    Standard(regex::Regex),

    /// Compiled with the backtracking engine for lookaround support
    Lookaround(fancy_regex::Regex),
}

impl Pattern {
    /// Compile a pattern, preferring the standard engine.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Compile`] when neither engine accepts the
    /// source.
    pub fn compile(source: &str) -> Result<Self> {
        match regex::Regex::new(source) {
            Ok(re) => Ok(Self::Standard(re)),
            Err(_) => match fancy_regex::Regex::new(source) {
                Ok(re) => Ok(Self::Lookaround(re)),
                Err(err) => Err(PatternError::compile(source, err.to_string())),
            },
        }
    }

    /// Whether the pattern matches anywhere in `text`.
    ///
    /// The backtracking engine can fail at match time on pathological input;
    /// such failures count as no match.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Standard(re) => re.is_match(text),
            Self::Lookaround(re) => re.is_match(text).unwrap_or(false),
        }
    }

    /// Capture groups of the first match, outermost group first.
    ///
    /// Group 0 of the underlying engines (the whole match) is not included.
    /// Unmatched optional groups yield empty strings.
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        match self {
            Self::Standard(re) => re.captures(text).map(|caps| {
                (1..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            }),
            Self::Lookaround(re) => re.captures(text).ok().flatten().map(|caps| {
                (1..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            }),
        }
    }

    /// The original pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Standard(re) => re.as_str(),
            Self::Lookaround(re) => re.as_str(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
