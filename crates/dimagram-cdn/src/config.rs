use std::time::Duration;

use serde::{Deserialize, Serialize};

/// CDN settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    /// Purge API key. Without one, purges are skipped.
    pub api_key: Option<String>,
    /// Public base URL content is served from, e.g. `https://photos.b-cdn.net`.
    pub cdn_base_url: String,
    /// Purge API endpoint.
    pub api_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            cdn_base_url: "https://example.com".into(),
            api_endpoint: "https://api.bunny.net/purge".into(),
            timeout_secs: 10,
        }
    }
}

impl CdnConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Public URL of a remote path.
    pub fn public_url(&self, remote_path: &str) -> String {
        format!(
            "{}/{}",
            self.cdn_base_url.trim_end_matches('/'),
            remote_path.trim_start_matches('/')
        )
    }

    /// Public URL of a content blob in `content_dir`.
    pub fn content_url(&self, content_dir: &str, file_name: &str) -> String {
        self.public_url(&format!("{}/{}", content_dir.trim_matches('/'), file_name))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
