//! CDN cache invalidation for dimagram.
//!
//! A purge is always advisory for the publish pipeline: a stale cache is
//! acceptable, a lost publication is not. This crate only reports the
//! outcome; deciding what a failure means is the caller's job.

pub mod bunny;
pub mod config;
pub mod error;
pub mod traits;

pub use bunny::BunnyPurger;
pub use config::CdnConfig;
pub use error::{CdnError, CdnResult};
pub use traits::{CacheInvalidator, NoopInvalidator};
