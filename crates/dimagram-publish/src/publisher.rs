use std::sync::Arc;

use dimagram_cdn::CacheInvalidator;
use dimagram_remote::RemoteStore;
use dimagram_store::{CollectionKind, StoreError};
use dimagram_types::AlbumItem;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{PublishError, PublishResult};
use crate::ledger::AlbumLedger;
use crate::outcome::{settle, Advisory, Step};

/// Where the pointer object lives and the public URL the CDN caches it under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerTarget {
    pub path: String,
    pub url: String,
}

impl PointerTarget {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }

    fn parent(&self) -> Option<&str> {
        self.path
            .trim_start_matches('/')
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .filter(|dir| !dir.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Publish,
    Unpublish,
}

/// Result of a completed transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransitionReport {
    pub transition: Transition,
    /// The item that moved between Queue and Archive.
    pub item: AlbumItem,
    /// The item the remote pointer now references. `None` after an
    /// UNPUBLISH that emptied the Archive, in which case the remote pointer
    /// was left untouched.
    pub pointer: Option<AlbumItem>,
    /// Advisory failures that did not stop the transition.
    pub advisories: Vec<Advisory>,
}

impl TransitionReport {
    /// `true` when every external step succeeded.
    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }
}

/// Runs PUBLISH and UNPUBLISH against the album, the remote store and the CDN.
pub struct Publisher {
    ledger: Arc<AlbumLedger>,
    remote: Arc<dyn RemoteStore>,
    cdn: Arc<dyn CacheInvalidator>,
    pointer: PointerTarget,
}

impl Publisher {
    pub fn new(
        ledger: Arc<AlbumLedger>,
        remote: Arc<dyn RemoteStore>,
        cdn: Arc<dyn CacheInvalidator>,
        pointer: PointerTarget,
    ) -> Self {
        Self {
            ledger,
            remote,
            cdn,
            pointer,
        }
    }

    pub fn ledger(&self) -> &Arc<AlbumLedger> {
        &self.ledger
    }

    pub fn pointer(&self) -> &PointerTarget {
        &self.pointer
    }

    /// Promote the Queue front to the live item.
    ///
    /// Nothing is persisted unless the remote pointer write succeeds. If the
    /// local commit fails afterwards, [`PublishError::Diverged`] is returned
    /// and the remote pointer is not rolled back.
    pub async fn publish(&self) -> PublishResult<TransitionReport> {
        let guard = self.ledger.lock().await?;
        let mut album = guard.load()?;
        let Some(item) = album.queue.first().cloned() else {
            return Err(PublishError::EmptyQueue);
        };
        info!(id = %item.id, url = %item.url, "publishing");

        let advisories = self.sync_pointer(&item).await?;

        album.queue.remove(0);
        album.archive.push(item.clone());
        guard
            .commit(&album, CollectionKind::Archive)
            .map_err(|source| diverged(&item, source))?;

        info!(
            id = %item.id,
            queued = album.queue.len(),
            archived = album.archive.len(),
            "published"
        );
        Ok(TransitionReport {
            transition: Transition::Publish,
            pointer: Some(item.clone()),
            item,
            advisories,
        })
    }

    /// Return the live item to the Queue front.
    ///
    /// The new Archive back, if any, becomes the pointer. When the Archive
    /// empties, the remote pointer is left as it is.
    pub async fn unpublish(&self) -> PublishResult<TransitionReport> {
        let guard = self.ledger.lock().await?;
        let mut album = guard.load()?;
        let Some(item) = album.archive.pop() else {
            return Err(PublishError::EmptyArchive);
        };
        info!(id = %item.id, "unpublishing");
        album.queue.insert(0, item.clone());

        let pointer = album.live().cloned();
        let advisories = match &pointer {
            Some(live) => self.sync_pointer(live).await?,
            None => {
                warn!(path = %self.pointer.path, "archive is now empty, leaving remote pointer in place");
                Vec::new()
            }
        };

        guard
            .commit(&album, CollectionKind::Queue)
            .map_err(|source| match &pointer {
                Some(live) => diverged(live, source),
                None => PublishError::Store(source),
            })?;

        info!(
            id = %item.id,
            queued = album.queue.len(),
            archived = album.archive.len(),
            "unpublished"
        );
        Ok(TransitionReport {
            transition: Transition::Unpublish,
            item,
            pointer,
            advisories,
        })
    }

    /// Write `item` as the pointer object, then purge its cached copy.
    async fn sync_pointer(&self, item: &AlbumItem) -> PublishResult<Vec<Advisory>> {
        let bytes = item.to_pointer_json()?;
        if let Some(dir) = self.pointer.parent() {
            self.remote.ensure_directory(dir).await?;
        }

        let mut advisories = Vec::new();
        let written = self.remote.create_or_replace(&self.pointer.path, &bytes).await;
        advisories.extend(settle(Step::PointerWrite, written)?);

        let purged = self.cdn.purge(&self.pointer.url).await;
        advisories.extend(settle(Step::CachePurge, purged)?);
        Ok(advisories)
    }
}

fn diverged(live: &AlbumItem, source: StoreError) -> PublishError {
    error!(id = %live.id, error = %source, "remote pointer updated but local commit failed");
    PublishError::Diverged {
        live: live.id.clone(),
        source,
    }
}
