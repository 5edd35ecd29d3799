//! HTTP surface for dimagram.
//!
//! Serves the album editor's JSON endpoints, the publish/unpublish triggers
//! and the upload entry point. Every handler goes through the shared
//! [`AppState`], so album edits and transitions are serialized by the same
//! ledger.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::DimagramServer;
pub use state::AppState;
