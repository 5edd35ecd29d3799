//! In-memory collection store for tests and ephemeral use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use dimagram_types::AlbumItem;

use crate::error::{StoreError, StoreResult};
use crate::traits::{CollectionKind, CollectionStore};

/// An in-memory implementation of [`CollectionStore`].
///
/// Saves can be made to fail on demand with [`fail_saves`](Self::fail_saves),
/// which is how tests reach the window between a successful remote pointer
/// write and a failed local commit.
#[derive(Debug, Default)]
pub struct InMemoryCollectionStore {
    collections: RwLock<HashMap<CollectionKind, Vec<AlbumItem>>>,
    fail_saves: AtomicBool,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a Queue and an Archive.
    pub fn with_collections(queue: Vec<AlbumItem>, archive: Vec<AlbumItem>) -> Self {
        let store = Self::new();
        {
            let mut map = store.collections.write().expect("lock poisoned");
            map.insert(CollectionKind::Queue, queue);
            map.insert(CollectionKind::Archive, archive);
        }
        store
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl CollectionStore for InMemoryCollectionStore {
    fn load(&self, kind: CollectionKind) -> StoreResult<Vec<AlbumItem>> {
        let map = self.collections.read().expect("lock poisoned");
        Ok(map.get(&kind).cloned().unwrap_or_default())
    }

    fn save(&self, kind: CollectionKind, items: &[AlbumItem]) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{kind} save rejected")));
        }
        let mut map = self.collections.write().expect("lock poisoned");
        map.insert(kind, items.to_vec());
        Ok(())
    }
}
