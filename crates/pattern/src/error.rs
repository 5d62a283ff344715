//! Pattern error types

use thiserror::Error;

/// Errors raised while compiling or parsing patterns
#[derive(Debug, Error)]
pub enum PatternError {
    /// Neither engine accepted the pattern source
    #[error("failed to compile regex {pattern:?}: {message}")]
    Compile {
        /// The rejected pattern source
        pattern: String,
        /// Engine diagnostic
        message: String,
    },
}

impl PatternError {
    /// Create a Compile error
    pub fn compile(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compile {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
