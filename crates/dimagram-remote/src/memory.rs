//! Recording in-memory remote for tests.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::error::{RemoteError, RemoteResult};
use crate::traits::RemoteStore;

/// The operations of [`RemoteStore`], used to script failures and inspect calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    EnsureDirectory,
    CreateOrReplace,
    Copy,
}

/// An in-memory [`RemoteStore`].
///
/// Like a real SFTP server, writing `a/b` requires directory `a` to exist.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    dirs: RwLock<BTreeSet<String>>,
    failing: RwLock<HashSet<RemoteOp>>,
    calls: Mutex<Vec<(RemoteOp, String)>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail until [`recover`](Self::recover) is called.
    pub fn fail(&self, op: RemoteOp) {
        self.failing.write().expect("lock poisoned").insert(op);
    }

    pub fn recover(&self, op: RemoteOp) {
        self.failing.write().expect("lock poisoned").remove(&op);
    }

    /// Contents of a remote file.
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().expect("lock poisoned").get(path).cloned()
    }

    pub fn has_directory(&self, path: &str) -> bool {
        self.dirs.read().expect("lock poisoned").contains(path.trim_end_matches('/'))
    }

    /// Every path currently stored, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.files.read().expect("lock poisoned").keys().cloned().collect()
    }

    /// Calls in the order they were made, including failed ones.
    pub fn calls(&self) -> Vec<(RemoteOp, String)> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    fn record(&self, op: RemoteOp, path: &str) -> RemoteResult<()> {
        self.calls.lock().expect("lock poisoned").push((op, path.to_string()));
        if self.failing.read().expect("lock poisoned").contains(&op) {
            return Err(RemoteError::Transfer {
                path: path.to_string(),
                reason: format!("injected {op:?} failure"),
            });
        }
        Ok(())
    }

    fn store(&self, path: &str, bytes: Vec<u8>) -> RemoteResult<()> {
        if let Some((parent, _)) = path.rsplit_once('/') {
            if !parent.is_empty() && !self.has_directory(parent) {
                return Err(RemoteError::Transfer {
                    path: path.to_string(),
                    reason: format!("no such directory: {parent}"),
                });
            }
        }
        self.files.write().expect("lock poisoned").insert(path.to_string(), bytes);
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn ensure_directory(&self, path: &str) -> RemoteResult<()> {
        self.record(RemoteOp::EnsureDirectory, path)?;
        let mut dirs = self.dirs.write().expect("lock poisoned");
        let mut current = String::new();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(component);
            dirs.insert(current.clone());
        }
        Ok(())
    }

    async fn create_or_replace(&self, path: &str, bytes: &[u8]) -> RemoteResult<()> {
        self.record(RemoteOp::CreateOrReplace, path)?;
        self.store(path, bytes.to_vec())
    }

    async fn copy(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        self.record(RemoteOp::Copy, remote)?;
        let bytes = tokio::fs::read(local)
            .await
            .map_err(|source| RemoteError::LocalIo {
                path: local.to_path_buf(),
                source,
            })?;
        self.store(remote, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_or_replace_overwrites() {
        let remote = InMemoryRemote::new();
        remote.create_or_replace("today.json", b"one").await.unwrap();
        remote.create_or_replace("today.json", b"two").await.unwrap();
        assert_eq!(remote.file("today.json").unwrap(), b"two");
    }

    #[tokio::test]
    async fn writes_into_missing_directory_fail() {
        let remote = InMemoryRemote::new();
        assert!(remote.create_or_replace("content/a.png", b"x").await.is_err());
        remote.ensure_directory("content").await.unwrap();
        remote.create_or_replace("content/a.png", b"x").await.unwrap();
    }

    #[tokio::test]
    async fn ensure_directory_creates_parents() {
        let remote = InMemoryRemote::new();
        remote.ensure_directory("a/b/c").await.unwrap();
        assert!(remote.has_directory("a"));
        assert!(remote.has_directory("a/b"));
        assert!(remote.has_directory("a/b/c/"));
    }

    #[tokio::test]
    async fn copy_reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("blob");
        std::fs::write(&local, b"payload").unwrap();

        let remote = InMemoryRemote::new();
        remote.copy(&local, "blob").await.unwrap();
        assert_eq!(remote.file("blob").unwrap(), b"payload");
    }

    #[tokio::test]
    async fn copy_of_missing_local_file_is_local_error() {
        let remote = InMemoryRemote::new();
        let err = remote.copy(Path::new("/definitely/not/here"), "x").await.unwrap_err();
        assert!(err.is_local());
    }

    #[tokio::test]
    async fn injected_failures_are_recorded() {
        let remote = InMemoryRemote::new();
        remote.fail(RemoteOp::CreateOrReplace);
        assert!(remote.create_or_replace("today.json", b"{}").await.is_err());
        assert!(remote.file("today.json").is_none());

        remote.recover(RemoteOp::CreateOrReplace);
        remote.create_or_replace("today.json", b"{}").await.unwrap();
        assert_eq!(
            remote.calls(),
            vec![
                (RemoteOp::CreateOrReplace, "today.json".to_string()),
                (RemoteOp::CreateOrReplace, "today.json".to_string()),
            ]
        );
    }
}
