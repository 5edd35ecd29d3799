use std::path::PathBuf;

use crate::traits::CollectionKind;

/// Errors from collection store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The persisted document is not a valid JSON array of album items.
    #[error("malformed {kind} document: {reason}")]
    Serialization { kind: CollectionKind, reason: String },

    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend refused the write (used by test backends).
    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
