//! Single owner of the Queue and Archive.

use std::collections::HashSet;
use std::sync::Arc;

use dimagram_store::{CollectionKind, CollectionStore, StoreError, StoreLease, StoreResult};
use dimagram_types::AlbumItem;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{PublishError, PublishResult};

/// The Queue and Archive as loaded together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlbumSnapshot {
    pub queue: Vec<AlbumItem>,
    pub archive: Vec<AlbumItem>,
}

impl AlbumSnapshot {
    pub fn new(queue: Vec<AlbumItem>, archive: Vec<AlbumItem>) -> Self {
        Self { queue, archive }
    }

    /// The item the remote pointer should reference: the Archive back.
    pub fn live(&self) -> Option<&AlbumItem> {
        self.archive.last()
    }

    /// Check that no id appears twice across both collections.
    pub fn validate(&self) -> PublishResult<()> {
        ensure_unique(self.queue.iter().chain(self.archive.iter()))
    }
}

fn ensure_unique<'a>(items: impl Iterator<Item = &'a AlbumItem>) -> PublishResult<()> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(&item.id) {
            return Err(PublishError::DuplicateId { id: item.id.clone() });
        }
    }
    Ok(())
}

/// Serializes every read-modify-write of the album.
///
/// Transitions hold a [`LedgerGuard`] for their whole duration, including the
/// remote calls, so two PUBLISHes can never observe the same Queue front.
/// The guard holds the in-process mutex and the store's lease, so a
/// `dimagram publish` run by cron serializes against a running server.
pub struct AlbumLedger {
    store: Arc<dyn CollectionStore>,
    gate: Mutex<()>,
}

impl AlbumLedger {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }

    /// Take exclusive ownership until the guard is dropped.
    ///
    /// Waits for other tasks of this process first, then for other
    /// processes sharing the store.
    pub async fn lock(&self) -> PublishResult<LedgerGuard<'_>> {
        let permit = self.gate.lock().await;
        let store = Arc::clone(&self.store);
        let lease = tokio::task::spawn_blocking(move || store.lease())
            .await
            .map_err(|e| StoreError::Unavailable(format!("store lock task failed: {e}")))??;
        Ok(LedgerGuard {
            store: self.store.as_ref(),
            _lease: lease,
            _permit: permit,
        })
    }

    pub async fn snapshot(&self) -> PublishResult<AlbumSnapshot> {
        self.lock().await?.load()
    }

    /// Both collections as persisted, without the uniqueness check.
    ///
    /// Lets an operator see the state a failed commit left behind.
    pub async fn inspect(&self) -> PublishResult<AlbumSnapshot> {
        self.lock().await?.load_unchecked()
    }

    pub async fn queue(&self) -> PublishResult<Vec<AlbumItem>> {
        Ok(self.lock().await?.load_one(CollectionKind::Queue)?)
    }

    pub async fn archive(&self) -> PublishResult<Vec<AlbumItem>> {
        Ok(self.lock().await?.load_one(CollectionKind::Archive)?)
    }

    /// Replace the Queue wholesale, as the editing frontend does.
    ///
    /// Rejects documents that would reuse an id already in the Queue or the
    /// Archive. The Archive is never touched.
    pub async fn replace_queue(&self, queue: Vec<AlbumItem>) -> PublishResult<()> {
        let guard = self.lock().await?;
        let archive = guard.load_one(CollectionKind::Archive)?;
        ensure_unique(queue.iter().chain(archive.iter()))?;
        guard.store.save(CollectionKind::Queue, &queue)?;
        info!(items = queue.len(), "queue replaced");
        Ok(())
    }
}

/// Exclusive access to the album store.
pub struct LedgerGuard<'a> {
    store: &'a dyn CollectionStore,
    _lease: StoreLease,
    _permit: MutexGuard<'a, ()>,
}

impl LedgerGuard<'_> {
    /// Load both collections and check the uniqueness invariant.
    pub fn load(&self) -> PublishResult<AlbumSnapshot> {
        let snapshot = self.load_unchecked()?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn load_unchecked(&self) -> PublishResult<AlbumSnapshot> {
        Ok(AlbumSnapshot::new(
            self.load_one(CollectionKind::Queue)?,
            self.load_one(CollectionKind::Archive)?,
        ))
    }

    fn load_one(&self, kind: CollectionKind) -> StoreResult<Vec<AlbumItem>> {
        self.store.load(kind)
    }

    /// Persist both collections, writing `first` before the other.
    ///
    /// Callers pass the collection that gained an item, so an interrupted
    /// commit leaves the item in both collections rather than in neither.
    pub fn commit(&self, snapshot: &AlbumSnapshot, first: CollectionKind) -> StoreResult<()> {
        let second = match first {
            CollectionKind::Queue => CollectionKind::Archive,
            CollectionKind::Archive => CollectionKind::Queue,
        };
        for kind in [first, second] {
            let items = match kind {
                CollectionKind::Queue => &snapshot.queue,
                CollectionKind::Archive => &snapshot.archive,
            };
            self.store.save(kind, items)?;
        }
        debug!(
            queue = snapshot.queue.len(),
            archive = snapshot.archive.len(),
            "album committed"
        );
        Ok(())
    }
}
