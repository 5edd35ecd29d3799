//! File-backed collection store.
//!
//! Each collection lives in its own JSON document inside a data directory.
//! Writes go to a temporary file in the same directory which is then renamed
//! over the target, so a crash mid-write never leaves a truncated document.
//!
//! Processes sharing a data directory serialize through an advisory lock on
//! `<dir>/.lock` (see [`CollectionStore::lease`]).

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dimagram_types::AlbumItem;
use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{CollectionKind, CollectionStore, StoreLease};

/// Lock file guarding a data directory.
pub const LOCK_FILE: &str = ".lock";

/// [`CollectionStore`] persisting `album.json` and `archive.json`.
#[derive(Clone, Debug)]
pub struct FileCollectionStore {
    dir: PathBuf,
}

impl FileCollectionStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the document backing `kind`.
    pub fn path_of(&self, kind: CollectionKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }
}

impl CollectionStore for FileCollectionStore {
    fn load(&self, kind: CollectionKind) -> StoreResult<Vec<AlbumItem>> {
        let path = self.path_of(kind);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(%kind, path = %path.display(), "no document yet, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&raw).map_err(|e| StoreError::Serialization {
            kind,
            reason: e.to_string(),
        })
    }

    fn save(&self, kind: CollectionKind, items: &[AlbumItem]) -> StoreResult<()> {
        let path = self.path_of(kind);
        let data = serde_json::to_vec(items).map_err(|e| StoreError::Serialization {
            kind,
            reason: e.to_string(),
        })?;

        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        tmp.write_all(&data).map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| StoreError::io(&path, e.error))?;

        debug!(%kind, count = items.len(), path = %path.display(), "collection saved");
        Ok(())
    }

    fn lease(&self) -> StoreResult<StoreLease> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        FileExt::lock_exclusive(&file).map_err(|e| StoreError::io(&path, e))?;
        debug!(path = %path.display(), "store lock acquired");
        Ok(StoreLease::locked(file))
    }
}
