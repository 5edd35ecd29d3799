//! Queue/Archive storage for dimagram.
//!
//! The store persists two ordered collections of [`AlbumItem`]s:
//!
//! - **Queue**: items awaiting publication, front = next to publish
//! - **Archive**: published items, oldest first, back = currently live
//!
//! Each collection is one whole JSON document. A `save` replaces the whole
//! document. `save` alone does not serialize concurrent writers: callers
//! hold a [`StoreLease`] for every read-modify-write, which the file backend
//! turns into an OS lock so separate processes serialize too.
//!
//! # Storage Backends
//!
//! All backends implement the [`CollectionStore`] trait:
//!
//! - [`FileCollectionStore`]: `album.json` / `archive.json` in a data directory
//! - [`InMemoryCollectionStore`]: for tests and embedding
//!
//! [`AlbumItem`]: dimagram_types::AlbumItem

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::{FileCollectionStore, LOCK_FILE};
pub use memory::InMemoryCollectionStore;
pub use traits::{CollectionKind, CollectionStore, StoreLease};
