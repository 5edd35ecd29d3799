//! Severity policy for external calls.
//!
//! Every external step of a transition carries a fixed [`Severity`]. A failed
//! `Fatal` step aborts the transition; a failed `Advisory` step is logged,
//! recorded in the report and the transition continues.

use serde::Serialize;
use tracing::warn;

use crate::error::{ErrorKind, PublishError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Fatal,
    Advisory,
}

/// External steps of a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Writing the pointer object to the remote store.
    PointerWrite,
    /// Purging the CDN copy of the pointer object.
    CachePurge,
}

impl Step {
    pub const fn severity(self) -> Severity {
        match self {
            Self::PointerWrite => Severity::Fatal,
            Self::CachePurge => Severity::Advisory,
        }
    }
}

/// A failure that was logged but did not abort the transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub step: Step,
    pub kind: ErrorKind,
    pub message: String,
}

/// Apply `step`'s severity to the result of an external call.
///
/// Returns `Err` for a failed fatal step, `Ok(Some(_))` for a failed
/// advisory step and `Ok(None)` on success.
pub fn settle<E>(step: Step, result: Result<(), E>) -> Result<Option<Advisory>, PublishError>
where
    E: Into<PublishError>,
{
    let err = match result {
        Ok(()) => return Ok(None),
        Err(e) => e.into(),
    };
    match step.severity() {
        Severity::Fatal => Err(err),
        Severity::Advisory => {
            warn!(?step, error = %err, "advisory step failed, continuing");
            Ok(Some(Advisory {
                step,
                kind: err.kind(),
                message: err.to_string(),
            }))
        }
    }
}
