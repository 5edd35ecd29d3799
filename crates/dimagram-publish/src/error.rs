use dimagram_cdn::CdnError;
use dimagram_remote::RemoteError;
use dimagram_store::StoreError;
use dimagram_types::ItemId;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of failures, independent of which component
/// produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A transition's precondition does not hold, or a document breaks an
    /// album invariant.
    Validation,
    LocalIo,
    RemoteIo,
    /// Only ever reported as an advisory.
    CacheInvalidation,
    Serialization,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("queue is empty, nothing to publish")]
    EmptyQueue,

    #[error("archive is empty, nothing to unpublish")]
    EmptyArchive,

    #[error("item id {id} appears more than once across queue and archive")]
    DuplicateId { id: ItemId },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("remote sync failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("cache invalidation failed: {0}")]
    Cache(#[from] CdnError),

    #[error("cannot serialize pointer object: {0}")]
    Pointer(#[from] serde_json::Error),

    /// The remote pointer was updated but the local commit failed. The two
    /// now disagree until the transition is re-run or repaired by hand.
    #[error("remote pointer already references item {live} but local state was not saved: {source}")]
    Diverged {
        live: ItemId,
        #[source]
        source: StoreError,
    },
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyQueue | Self::EmptyArchive | Self::DuplicateId { .. } => ErrorKind::Validation,
            Self::Store(e) | Self::Diverged { source: e, .. } => match e {
                StoreError::Serialization { .. } => ErrorKind::Serialization,
                StoreError::Io { .. } | StoreError::Unavailable(_) => ErrorKind::LocalIo,
            },
            Self::Remote(e) if e.is_local() => ErrorKind::LocalIo,
            Self::Remote(_) => ErrorKind::RemoteIo,
            Self::Cache(_) => ErrorKind::CacheInvalidation,
            Self::Pointer(_) => ErrorKind::Serialization,
        }
    }
}

pub type PublishResult<T> = Result<T, PublishError>;
