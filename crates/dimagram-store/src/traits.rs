use std::fmt;
use std::fs::File;

use dimagram_types::AlbumItem;
use fs2::FileExt;

use crate::error::StoreResult;

/// The two persisted collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Items awaiting publication; front = next to publish.
    Queue,
    /// Published items, oldest first; back = currently live.
    Archive,
}

impl CollectionKind {
    /// File name of the backing document.
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Queue => "album.json",
            Self::Archive => "archive.json",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queue => f.write_str("queue"),
            Self::Archive => f.write_str("archive"),
        }
    }
}

/// Whole-document storage for the Queue and the Archive.
///
/// Implementations must satisfy these invariants:
/// - `load` of a collection that was never saved returns an empty sequence,
///   not an error.
/// - `save` replaces the entire document in one step from the caller's point
///   of view: a concurrent `load` sees either the old or the new document.
/// - Order is preserved exactly.
pub trait CollectionStore: Send + Sync {
    /// Load a collection in persisted order.
    fn load(&self, kind: CollectionKind) -> StoreResult<Vec<AlbumItem>>;

    /// Replace a collection.
    fn save(&self, kind: CollectionKind, items: &[AlbumItem]) -> StoreResult<()>;

    /// Block until this caller owns the backing storage exclusively, across
    /// processes. Ownership ends when the returned lease is dropped.
    ///
    /// Backends that cannot be shared between processes return an empty
    /// lease.
    fn lease(&self) -> StoreResult<StoreLease> {
        Ok(StoreLease::default())
    }
}

/// Exclusive ownership of a store, released on drop.
#[derive(Debug, Default)]
pub struct StoreLease {
    file: Option<File>,
}

impl StoreLease {
    /// Lease backed by an OS advisory lock already held on `file`.
    pub fn locked(file: File) -> Self {
        Self { file: Some(file) }
    }

    /// `true` when an OS lock is held.
    pub fn is_exclusive(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for StoreLease {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            if let Err(e) = FileExt::unlock(file) {
                tracing::warn!(error = %e, "failed to release store lock");
            }
        }
    }
}
