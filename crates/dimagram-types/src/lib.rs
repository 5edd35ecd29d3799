//! Foundation types for dimagram.
//!
//! Every other dimagram crate depends on `dimagram-types`.
//!
//! # Key Types
//!
//! - [`ItemId`]: Canonical (string) identifier of an album item
//! - [`AlbumItem`]: One entry of the Queue or the Archive
//! - [`ContentAddress`]: Hash-derived name of an immutable content blob
//! - [`DigestAlgorithm`]: Which digest produces a [`ContentAddress`]

pub mod address;
pub mod error;
pub mod id;
pub mod item;

pub use address::{normalize_extension, ContentAddress, DigestAlgorithm};
pub use error::TypeError;
pub use id::ItemId;
pub use item::AlbumItem;
