use std::path::PathBuf;

use dimagram_remote::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the upload or writing the local relay copy failed.
    #[error("local I/O error on {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Placing the blob on the remote store failed.
    #[error("remote upload failed: {0}")]
    Remote(RemoteError),

    #[error("upload exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },
}

impl IngestError {
    pub(crate) fn local(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalIo { .. } | Self::TooLarge { .. })
    }
}

impl From<RemoteError> for IngestError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::LocalIo { path, source } => Self::LocalIo { path, source },
            other => Self::Remote(other),
        }
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
