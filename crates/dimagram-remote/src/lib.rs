//! Remote file store adapter for dimagram.
//!
//! Places bytes on a remote file store over an authenticated transport. The
//! orchestrator uses it for the pointer object (`today.json`) and ingestion
//! uses it for content blobs (`content/<address>`).
//!
//! - [`RemoteStore`]: the capability set every backend implements
//! - [`SftpRemote`]: SFTP over SSH, connecting fresh for every call
//! - [`InMemoryRemote`]: recording double with failure injection for tests

pub mod config;
pub mod error;
pub mod memory;
pub mod sftp;
pub mod traits;

pub use config::{Credentials, HostKeyPolicy, RemoteConfig};
pub use error::{RemoteError, RemoteResult};
pub use memory::{InMemoryRemote, RemoteOp};
pub use sftp::SftpRemote;
pub use traits::RemoteStore;
