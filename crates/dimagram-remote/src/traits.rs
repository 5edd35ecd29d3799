use std::path::Path;

use async_trait::async_trait;

use crate::error::RemoteResult;

/// Capability set of a remote file store.
///
/// Remote paths are `/`-separated and relative to the login directory.
/// Implementations establish whatever connection they need per call; no
/// session state survives between calls.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create `path` and any missing parents. Existing directories are fine.
    async fn ensure_directory(&self, path: &str) -> RemoteResult<()>;

    /// Write `bytes` to `path`, unconditionally replacing any previous file.
    async fn create_or_replace(&self, path: &str, bytes: &[u8]) -> RemoteResult<()>;

    /// Stream the local file at `local` to `remote`, replacing any previous file.
    async fn copy(&self, local: &Path, remote: &str) -> RemoteResult<()>;
}
