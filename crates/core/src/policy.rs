//! Errors for tunable policy data (classifier rules, comment deny-list).

use thiserror::Error;

/// Policy data that cannot be turned into a working rule set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// A rule pattern is not a valid regular expression.
    #[error("invalid pattern in rule '{rule}': {message}")]
    InvalidPattern { rule: String, message: String },

    /// A rule can never match anything.
    #[error("rule '{0}' has neither category keywords nor text patterns")]
    EmptyRule(String),

    /// A deny-list entry is blank after normalization.
    #[error("deny-list entry at position {0} is blank")]
    BlankDenyEntry(usize),
}
