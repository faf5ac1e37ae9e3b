use thiserror::Error;

use crate::JsonToken;

// -----------------------------------------------------------------------------
// Error

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum StreamError {
    #[error("expected {expected} but found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: JsonToken,
    },

    #[error("malformed input: {0}")]
    Syntax(String),

    #[error("number `{0}` is out of range")]
    NumberOutOfRange(String),

    #[error("non-finite number `{0}` cannot be written")]
    NonFinite(f64),

    #[error("invalid writer state: {0}")]
    InvalidState(&'static str),
}

impl StreamError {
    #[cold]
    #[inline(never)]
    pub(crate) fn unexpected(expected: &'static str, found: JsonToken) -> Self {
        Self::UnexpectedToken { expected, found }
    }
}
