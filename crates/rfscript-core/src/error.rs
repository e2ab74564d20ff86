//! Error taxonomy for the expression engine
//!
//! Member-level inapplicability inside a `Networks` collection is *not* an
//! error (see `networks::DropReason`); everything here aborts the script.

use thiserror::Error;

/// Errors surfaced to the host by script evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    /// Single-match selection matched zero or more than one network
    #[error("pattern \"{pattern}\" matched {count} networks, but need exactly one")]
    Selection { pattern: String, count: usize },

    /// Arithmetic between traces on incompatible frequency axes
    #[error("frequency axes do not match: {left} vs {right}")]
    AxisMismatch { left: String, right: String },

    /// Undefined numeric operation (reciprocal of zero, bad mu order, ...)
    #[error("numeric error: {0}")]
    Numeric(String),

    /// Any other failure while evaluating a script line
    #[error("error in line {line_no} (\"{line}\"): {message}")]
    Evaluation {
        line_no: usize,
        line: String,
        message: String,
    },
}
