//! Publish orchestrator for dimagram.
//!
//! Items move through `Queued → Publishing → Archived` and back:
//!
//! - **PUBLISH** takes the Queue front, makes it the remote pointer object,
//!   purges the CDN copy of the pointer and appends the item to the Archive.
//! - **UNPUBLISH** takes the Archive back, returns it to the Queue front and
//!   re-points the remote at the new Archive back (if any).
//!
//! The remote pointer write is the synchronization gate: nothing is
//! persisted locally before it succeeds. The CDN purge is advisory.
//!
//! All access to the Queue/Archive store goes through one [`AlbumLedger`],
//! which serializes transitions and manual edits.

pub mod error;
pub mod ledger;
pub mod outcome;
pub mod publisher;

pub use error::{ErrorKind, PublishError, PublishResult};
pub use ledger::{AlbumLedger, AlbumSnapshot, LedgerGuard};
pub use outcome::{settle, Advisory, Severity, Step};
pub use publisher::{PointerTarget, Publisher, Transition, TransitionReport};
