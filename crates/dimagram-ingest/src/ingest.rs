use std::path::PathBuf;
use std::sync::Arc;

use dimagram_cdn::CdnConfig;
use dimagram_remote::RemoteStore;
use dimagram_types::{ContentAddress, DigestAlgorithm};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::{IngestError, IngestResult};
use crate::hasher::StreamingHasher;

const CHUNK_SIZE: usize = 64 * 1024;

/// Ingestion settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Local relay directory for in-flight uploads.
    pub upload_dir: PathBuf,
    pub algorithm: DigestAlgorithm,
    /// Uploads larger than this are refused. `None` disables the limit.
    pub max_upload_bytes: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("data/uploads"),
            algorithm: DigestAlgorithm::default(),
            max_upload_bytes: Some(10 * 1024 * 1024),
        }
    }
}

/// Result of a successful ingestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    pub address: ContentAddress,
    /// CDN-qualified URL, suitable as an album item's `url`.
    pub url: String,
}

/// Streams uploads through a hashing relay onto the remote store.
pub struct Ingestor {
    config: IngestConfig,
    remote: Arc<dyn RemoteStore>,
    content_dir: String,
    cdn: CdnConfig,
}

impl Ingestor {
    pub fn new(
        config: IngestConfig,
        remote: Arc<dyn RemoteStore>,
        content_dir: impl Into<String>,
        cdn: CdnConfig,
    ) -> Self {
        Self {
            config,
            remote,
            content_dir: content_dir.into(),
            cdn,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest one upload.
    ///
    /// The bytes are written to a private staging directory while being
    /// hashed in the same pass, the staged file is renamed to its address,
    /// and the remote store is asked to place it under
    /// `<content_dir>/<address>`. The staging directory is removed on every
    /// exit path.
    pub async fn ingest<R>(&self, mut reader: R, extension_hint: &str) -> IngestResult<ContentRef>
    where
        R: AsyncRead + Unpin + Send,
    {
        let upload_dir = &self.config.upload_dir;
        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(|e| IngestError::local(upload_dir, e))?;
        let staging = tempfile::Builder::new()
            .prefix("temp-")
            .tempdir_in(upload_dir)
            .map_err(|e| IngestError::local(upload_dir, e))?;

        let temp_path = staging.path().join("upload.part");
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| IngestError::local(&temp_path, e))?;

        let mut hasher = StreamingHasher::new(self.config.algorithm);
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total: u64 = 0;
        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| IngestError::local(&temp_path, e))?;
            if n == 0 {
                break;
            }
            total += n as u64;
            if let Some(limit) = self.config.max_upload_bytes {
                if total > limit {
                    return Err(IngestError::TooLarge { limit });
                }
            }
            hasher.update(&buf[..n]);
            file.write_all(&buf[..n])
                .await
                .map_err(|e| IngestError::local(&temp_path, e))?;
        }
        file.flush().await.map_err(|e| IngestError::local(&temp_path, e))?;
        drop(file);

        let address = hasher.into_address(extension_hint);
        let local_path = staging.path().join(address.file_name());
        tokio::fs::rename(&temp_path, &local_path)
            .await
            .map_err(|e| IngestError::local(&local_path, e))?;
        debug!(%address, bytes = total, "upload staged");

        let remote_path = format!("{}/{}", self.content_dir.trim_end_matches('/'), address.file_name());
        self.remote.ensure_directory(&self.content_dir).await?;
        self.remote.copy(&local_path, &remote_path).await?;

        let url = self.cdn.content_url(&self.content_dir, &address.file_name());
        info!(%address, bytes = total, %url, "content ingested");
        Ok(ContentRef { address, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimagram_remote::{InMemoryRemote, RemoteOp};
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    struct Fixture {
        _dir: tempfile::TempDir,
        upload_dir: PathBuf,
        remote: Arc<InMemoryRemote>,
        ingestor: Ingestor,
    }

    fn fixture(config: impl FnOnce(&mut IngestConfig)) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");
        let mut cfg = IngestConfig {
            upload_dir: upload_dir.clone(),
            ..Default::default()
        };
        config(&mut cfg);
        let remote = Arc::new(InMemoryRemote::new());
        let cdn = CdnConfig {
            cdn_base_url: "https://cdn.example.com".into(),
            ..Default::default()
        };
        let ingestor = Ingestor::new(cfg, remote.clone(), "content", cdn);
        Fixture {
            _dir: dir,
            upload_dir,
            remote,
            ingestor,
        }
    }

    fn local_leftovers(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")))
        }
    }

    #[tokio::test]
    async fn ingest_places_blob_remotely_and_returns_cdn_url() {
        let fx = fixture(|_| {});
        let content = fx.ingestor.ingest(&b"hello"[..], "photo.JPG").await.unwrap();

        let name = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824.jpg";
        assert_eq!(content.address.file_name(), name);
        assert_eq!(content.url, format!("https://cdn.example.com/content/{name}"));
        assert_eq!(fx.remote.file(&format!("content/{name}")).unwrap(), b"hello");
        assert!(fx.remote.has_directory("content"));
    }

    #[tokio::test]
    async fn identical_bytes_yield_identical_addresses() {
        let fx = fixture(|_| {});
        let data = vec![7u8; 200_000];
        let first = fx.ingestor.ingest(&data[..], ".png").await.unwrap();
        let second = fx.ingestor.ingest(&data[..], ".png").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(fx.remote.paths().len(), 1);
    }

    #[tokio::test]
    async fn local_relay_is_removed_after_success() {
        let fx = fixture(|_| {});
        fx.ingestor.ingest(&b"data"[..], ".gif").await.unwrap();
        assert_eq!(local_leftovers(&fx.upload_dir), 0);
    }

    #[tokio::test]
    async fn remote_failure_is_reported_and_local_relay_removed() {
        let fx = fixture(|_| {});
        fx.remote.fail(RemoteOp::Copy);
        let err = fx.ingestor.ingest(&b"data"[..], ".gif").await.unwrap_err();
        assert!(matches!(err, IngestError::Remote(_)), "got {err}");
        assert!(!err.is_local());
        assert_eq!(local_leftovers(&fx.upload_dir), 0);
    }

    #[tokio::test]
    async fn read_failure_is_local_io() {
        let fx = fixture(|_| {});
        let err = fx.ingestor.ingest(BrokenReader, ".png").await.unwrap_err();
        assert!(matches!(err, IngestError::LocalIo { .. }));
        assert_eq!(local_leftovers(&fx.upload_dir), 0);
        assert!(fx.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn oversized_upload_is_refused() {
        let fx = fixture(|c| c.max_upload_bytes = Some(4));
        let err = fx.ingestor.ingest(&b"too long"[..], ".png").await.unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { limit: 4 }));
        assert_eq!(local_leftovers(&fx.upload_dir), 0);
    }

    #[tokio::test]
    async fn blake3_addresses_when_configured() {
        let fx = fixture(|c| c.algorithm = DigestAlgorithm::Blake3);
        let content = fx.ingestor.ingest(&b"hello"[..], "").await.unwrap();
        assert_eq!(content.address.digest_hex(), blake3::hash(b"hello").to_hex().as_str());
        assert_eq!(content.address.extension(), "");
    }
}
