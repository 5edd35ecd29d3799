//! SFTP backend.
//!
//! Every call opens a fresh SSH session, performs one operation and tears the
//! session down again. Calls are infrequent (one publish a day, occasional
//! uploads), so connection reuse is not worth the state it would need.
//! libssh2 is blocking, so the work runs on tokio's blocking pool.

use std::fs::File;
use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ssh2::{CheckResult, KnownHostFileKind, Session, Sftp};
use tracing::{debug, info, warn};

use crate::config::{Credentials, HostKeyPolicy, RemoteConfig};
use crate::error::{RemoteError, RemoteResult};
use crate::traits::RemoteStore;

/// [`RemoteStore`] speaking SFTP over SSH.
#[derive(Clone, Debug)]
pub struct SftpRemote {
    config: Arc<RemoteConfig>,
}

impl SftpRemote {
    /// Validate the configuration; no connection is made yet.
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        config.validate()?;
        if config.insecure_skip_host_key_verification {
            warn!(
                host = %config.host,
                "SFTP host key verification is disabled by configuration"
            );
        }
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    async fn with_sftp<T, F>(&self, op: &'static str, f: F) -> RemoteResult<T>
    where
        F: FnOnce(&Sftp) -> RemoteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || {
            let session = connect(&config)?;
            let sftp = session.sftp().map_err(|e| RemoteError::Transfer {
                path: "<sftp subsystem>".into(),
                reason: e.to_string(),
            })?;
            let result = f(&sftp);
            drop(sftp);
            if let Err(e) = session.disconnect(None, "done", None) {
                debug!(error = %e, "ignoring SSH disconnect failure");
            }
            result
        })
        .await
        .map_err(|e| RemoteError::Internal(format!("{op} task failed: {e}")))?
    }
}

#[async_trait]
impl RemoteStore for SftpRemote {
    async fn ensure_directory(&self, path: &str) -> RemoteResult<()> {
        let path = path.to_string();
        self.with_sftp("ensure_directory", move |sftp| mkdir_all(sftp, &path))
            .await
    }

    async fn create_or_replace(&self, path: &str, bytes: &[u8]) -> RemoteResult<()> {
        let path = path.to_string();
        let bytes = bytes.to_vec();
        let addr = self.config.address();
        self.with_sftp("create_or_replace", move |sftp| {
            let mut file = sftp
                .create(Path::new(&path))
                .map_err(|e| transfer_error(&path, e))?;
            file.write_all(&bytes).map_err(|e| transfer_error(&path, e))?;
            info!(remote = %addr, path = %path, bytes = bytes.len(), "remote file written");
            Ok(())
        })
        .await
    }

    async fn copy(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        let local = local.to_path_buf();
        let remote = remote.to_string();
        let addr = self.config.address();
        self.with_sftp("copy", move |sftp| {
            let mut source = File::open(&local).map_err(|source| RemoteError::LocalIo {
                path: local.clone(),
                source,
            })?;
            let mut target = sftp
                .create(Path::new(&remote))
                .map_err(|e| transfer_error(&remote, e))?;
            let copied = io::copy(&mut source, &mut target).map_err(|e| transfer_error(&remote, e))?;
            info!(remote = %addr, path = %remote, bytes = copied, "file uploaded");
            Ok(())
        })
        .await
    }
}

fn transfer_error(path: &str, reason: impl std::fmt::Display) -> RemoteError {
    RemoteError::Transfer {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn connect(config: &RemoteConfig) -> RemoteResult<Session> {
    let addr = config.address();
    let connect_err = |reason: String| RemoteError::Connect {
        addr: addr.clone(),
        reason,
    };

    let socket_addr = (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|e| connect_err(e.to_string()))?
        .next()
        .ok_or_else(|| connect_err("host did not resolve to any address".into()))?;
    let tcp = TcpStream::connect_timeout(&socket_addr, config.connect_timeout())
        .map_err(|e| connect_err(e.to_string()))?;

    let mut session = Session::new().map_err(|e| connect_err(e.to_string()))?;
    session.set_timeout(u32::try_from(config.connect_timeout().as_millis()).unwrap_or(u32::MAX));
    session.set_tcp_stream(tcp);
    session.handshake().map_err(|e| connect_err(e.to_string()))?;

    verify_host_key(&session, config)?;
    authenticate(&session, config)?;
    debug!(remote = %addr, user = %config.user, "SSH session established");
    Ok(session)
}

fn verify_host_key(session: &Session, config: &RemoteConfig) -> RemoteResult<()> {
    let known_hosts = match config.host_key_policy() {
        HostKeyPolicy::InsecureSkip => {
            warn!(host = %config.host, "accepting unverified SSH host key");
            return Ok(());
        }
        HostKeyPolicy::Verify { known_hosts } => known_hosts,
    };
    let host_err = |reason: String| RemoteError::HostKey {
        host: config.host.clone(),
        reason,
    };

    let (key, _) = session
        .host_key()
        .ok_or_else(|| host_err("server presented no host key".into()))?;
    let mut hosts = session.known_hosts().map_err(|e| host_err(e.to_string()))?;
    hosts
        .read_file(&known_hosts, KnownHostFileKind::OpenSSH)
        .map_err(|e| host_err(format!("cannot read {}: {e}", known_hosts.display())))?;

    match hosts.check_port(&config.host, config.port, key) {
        CheckResult::Match => Ok(()),
        CheckResult::NotFound => Err(host_err(format!(
            "host is not listed in {}",
            known_hosts.display()
        ))),
        CheckResult::Mismatch => Err(host_err(
            "host key does not match the known_hosts entry".into(),
        )),
        CheckResult::Failure => Err(host_err("known_hosts lookup failed".into())),
    }
}

fn authenticate(session: &Session, config: &RemoteConfig) -> RemoteResult<()> {
    let auth_err = |reason: String| RemoteError::Auth {
        user: config.user.clone(),
        reason,
    };
    match config.credentials()? {
        Credentials::Password(password) => session.userauth_password(&config.user, &password),
        Credentials::PrivateKey(key) => session.userauth_pubkey_file(&config.user, None, &key, None),
    }
    .map_err(|e| auth_err(e.to_string()))?;

    if !session.authenticated() {
        return Err(auth_err("server rejected the credentials".into()));
    }
    Ok(())
}

/// `mkdir -p` over SFTP.
fn mkdir_all(sftp: &Sftp, path: &str) -> RemoteResult<()> {
    let mut current = if path.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    };
    for component in path.split('/').filter(|c| !c.is_empty() && *c != ".") {
        current.push(component);
        if sftp.stat(&current).is_ok() {
            continue;
        }
        sftp.mkdir(&current, 0o755)
            .map_err(|e| transfer_error(&current.display().to_string(), e))?;
        debug!(path = %current.display(), "remote directory created");
    }
    Ok(())
}
