//! Content-addressable ingestion for dimagram.
//!
//! Turns an uploaded byte stream into an immutable blob named
//! `hex(digest) + extension` on the remote store, and returns the public
//! URL an album item should reference. Local disk is only a relay: nothing
//! written locally survives the call.

pub mod error;
pub mod hasher;
pub mod ingest;

pub use error::{IngestError, IngestResult};
pub use hasher::StreamingHasher;
pub use ingest::{ContentRef, IngestConfig, Ingestor};
