use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote configuration error: {0}")]
    Config(String),

    #[error("failed to connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("host key verification failed for {host}: {reason}")]
    HostKey { host: String, reason: String },

    #[error("authentication failed for {user}: {reason}")]
    Auth { user: String, reason: String },

    #[error("remote transfer failed for {path}: {reason}")]
    Transfer { path: String, reason: String },

    /// The local side of a copy could not be read.
    #[error("local I/O error on {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl RemoteError {
    /// `true` when the failure happened on the local filesystem rather than
    /// on the transport or the remote host.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalIo { .. })
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;
