use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid digest length for {algorithm}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        algorithm: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid item id: {0}")]
    InvalidItemId(String),

    #[error("unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),
}
