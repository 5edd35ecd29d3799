use async_trait::async_trait;
use tracing::debug;

use crate::error::CdnResult;

/// Purges one cached URL.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn purge(&self, url: &str) -> CdnResult<()>;
}

/// Invalidator used when no CDN is configured. Always succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInvalidator;

#[async_trait]
impl CacheInvalidator for NoopInvalidator {
    async fn purge(&self, url: &str) -> CdnResult<()> {
        debug!(url, "no CDN configured, skipping purge");
        Ok(())
    }
}
