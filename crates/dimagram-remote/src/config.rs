use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, RemoteResult};

/// Connection settings for the remote file store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub private_key_path: Option<PathBuf>,
    /// OpenSSH known_hosts file used to verify the server. `None` means
    /// `~/.ssh/known_hosts`.
    pub known_hosts_path: Option<PathBuf>,
    /// Skip host key verification entirely. Exposes every connection to
    /// man-in-the-middle attacks; only for throwaway test servers.
    pub insecure_skip_host_key_verification: bool,
    pub connect_timeout_secs: u64,
    /// Remote name of the pointer object.
    pub pointer_path: String,
    /// Remote directory holding content blobs.
    pub content_dir: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            user: String::new(),
            password: None,
            private_key_path: None,
            known_hosts_path: None,
            insecure_skip_host_key_verification: false,
            connect_timeout_secs: 15,
            pointer_path: "today.json".into(),
            content_dir: "content".into(),
        }
    }
}

/// How the client authenticates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Password(String),
    PrivateKey(PathBuf),
}

/// How the server's identity is checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Require the host key to match an entry in this known_hosts file.
    Verify { known_hosts: PathBuf },
    /// Accept any host key.
    InsecureSkip,
}

impl RemoteConfig {
    /// Check that enough is configured to attempt a connection.
    pub fn validate(&self) -> RemoteResult<()> {
        if self.host.trim().is_empty() {
            return Err(RemoteError::Config("host is not set".into()));
        }
        if self.user.trim().is_empty() {
            return Err(RemoteError::Config("user is not set".into()));
        }
        if self.pointer_path.trim().is_empty() {
            return Err(RemoteError::Config("pointer_path must not be empty".into()));
        }
        self.credentials().map(|_| ())
    }

    /// Password wins when both a password and a key are configured.
    pub fn credentials(&self) -> RemoteResult<Credentials> {
        match (&self.password, &self.private_key_path) {
            (Some(pw), _) if !pw.is_empty() => Ok(Credentials::Password(pw.clone())),
            (_, Some(key)) if !key.as_os_str().is_empty() => Ok(Credentials::PrivateKey(key.clone())),
            _ => Err(RemoteError::Config(
                "either password or private_key_path must be set".into(),
            )),
        }
    }

    pub fn host_key_policy(&self) -> HostKeyPolicy {
        if self.insecure_skip_host_key_verification {
            return HostKeyPolicy::InsecureSkip;
        }
        let known_hosts = self.known_hosts_path.clone().unwrap_or_else(|| {
            let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
            home.join(".ssh").join("known_hosts")
        });
        HostKeyPolicy::Verify { known_hosts }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `host:port` as used for connecting and in log lines.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Remote path of a content blob.
    pub fn content_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.content_dir.trim_end_matches('/'), file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> RemoteConfig {
        RemoteConfig {
            host: "sftp.example.com".into(),
            user: "deploy".into(),
            password: Some("secret".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults() {
        let c = RemoteConfig::default();
        assert_eq!(c.port, 22);
        assert_eq!(c.connect_timeout(), Duration::from_secs(15));
        assert_eq!(c.pointer_path, "today.json");
        assert_eq!(c.content_dir, "content");
        assert!(!c.insecure_skip_host_key_verification);
    }

    #[test]
    fn host_key_verification_is_on_by_default() {
        let c = RemoteConfig {
            known_hosts_path: Some("/etc/ssh/known".into()),
            ..configured()
        };
        assert_eq!(
            c.host_key_policy(),
            HostKeyPolicy::Verify { known_hosts: "/etc/ssh/known".into() }
        );
    }

    #[test]
    fn explicit_opt_out_skips_verification() {
        let c = RemoteConfig {
            insecure_skip_host_key_verification: true,
            ..configured()
        };
        assert_eq!(c.host_key_policy(), HostKeyPolicy::InsecureSkip);
    }

    #[test]
    fn password_wins_over_key() {
        let c = RemoteConfig {
            private_key_path: Some("/k".into()),
            ..configured()
        };
        assert_eq!(c.credentials().unwrap(), Credentials::Password("secret".into()));
    }

    #[test]
    fn key_only() {
        let c = RemoteConfig {
            password: None,
            private_key_path: Some("/home/me/.ssh/id_ed25519".into()),
            ..configured()
        };
        assert!(matches!(c.credentials().unwrap(), Credentials::PrivateKey(_)));
    }

    #[test]
    fn validation_requires_host_user_and_credentials() {
        assert!(configured().validate().is_ok());
        assert!(RemoteConfig { host: "".into(), ..configured() }.validate().is_err());
        assert!(RemoteConfig { user: " ".into(), ..configured() }.validate().is_err());
        assert!(RemoteConfig { password: None, ..configured() }.validate().is_err());
    }

    #[test]
    fn content_path_joins_directory() {
        let c = RemoteConfig { content_dir: "content/".into(), ..configured() };
        assert_eq!(c.content_path("ab.png"), "content/ab.png");
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c: RemoteConfig = toml::from_str("host = \"h\"\nuser = \"u\"\nport = 2222").unwrap();
        assert_eq!(c.port, 2222);
        assert_eq!(c.pointer_path, "today.json");
        assert_eq!(c.address(), "h:2222");
    }
}
