//! Layered configuration: defaults, then an optional TOML file, then the
//! environment.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dimagram_cdn::CdnConfig;
use dimagram_ingest::IngestConfig;
use dimagram_remote::RemoteConfig;
use dimagram_server::ServerConfig;
use serde::{Deserialize, Serialize};

/// File read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "dimagram.toml";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `album.json` and `archive.json`.
    pub data_dir: PathBuf,
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub cdn: CdnConfig,
    pub ingest: IngestConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            server: ServerConfig::default(),
            remote: RemoteConfig::default(),
            cdn: CdnConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path` (or [`DEFAULT_CONFIG_FILE`] if present), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply overrides using the variable names the deployment already sets.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(dir) = var("DIMAGRAM_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
            if self.ingest.upload_dir == IngestConfig::default().upload_dir {
                self.ingest.upload_dir = self.data_dir.join("uploads");
            }
        }

        let remote = &mut self.remote;
        if let Some(host) = var("SFTP_HOST") {
            remote.host = host;
        }
        if let Some(port) = var("SFTP_PORT") {
            remote.port = port
                .parse()
                .with_context(|| format!("SFTP_PORT is not a port number: {port}"))?;
        }
        if let Some(user) = var("SFTP_USER") {
            remote.user = user;
        }
        if let Some(password) = var("SFTP_PASSWORD") {
            remote.password = Some(password);
        }
        if let Some(key) = var("SFTP_PRIVATE_KEY_PATH") {
            remote.private_key_path = Some(PathBuf::from(key));
        }
        if let Some(known_hosts) = var("SFTP_KNOWN_HOSTS_PATH") {
            remote.known_hosts_path = Some(PathBuf::from(known_hosts));
        }
        if let Some(flag) = var("SFTP_INSECURE_SKIP_HOST_KEY_VERIFICATION") {
            remote.insecure_skip_host_key_verification = parse_flag(&flag)
                .with_context(|| format!("SFTP_INSECURE_SKIP_HOST_KEY_VERIFICATION is not a boolean: {flag}"))?;
        }

        if let Some(key) = var("BUNNY_API_KEY") {
            self.cdn.api_key = Some(key);
        }
        if let Some(url) = var("BUNNY_CDN_URL") {
            self.cdn.cdn_base_url = url;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
