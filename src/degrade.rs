//! Degradation policy: turn a remote outcome into renderable data + status.
//!
//! DESIGN
//! ======
//! Failed or unreachable calls are never surfaced as failures. The caller's
//! mock supplier provides substitute data and the status reads as a success
//! that explicitly says the result is simulated. Server notes on an otherwise
//! successful response can downgrade the wording: "temporarily unavailable"
//! stays a success, "currently unreachable" becomes a warning.
//!
//! `Rejected` outcomes produce no data and an error status.

use std::time::Duration;

use tracing::{info, warn};

use crate::remote::types::{Processed, ProcessingOutcome, RejectReason};
use crate::status::{Severity, StatusMessage};

pub const TEMPORARILY_UNAVAILABLE: &str = "temporarily unavailable";
pub const CURRENTLY_UNREACHABLE: &str = "currently unreachable";

/// Every degraded reason reads the same to the user; the reason is logged.
const DEGRADED_SUFFIX: &str = "AI service temporarily unavailable";

/// User-facing wording for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCopy {
    /// Shown while the call is in flight.
    pub pending: &'static str,
    /// Shown on a plain success.
    pub done: &'static str,
    /// Prefix for every simulated result; must contain "simulated".
    pub simulated: &'static str,
    /// Shown when the action needs a session and none exists.
    pub login_required: &'static str,
    /// Shown when the request was refused locally.
    pub invalid_input: &'static str,
}

/// Data to render (if any) plus the single status message for the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub data: Option<Processed>,
    pub status: StatusMessage,
    pub simulated: bool,
}

impl Resolution {
    #[must_use]
    pub fn rejected(text: &str, ttl: Duration) -> Self {
        Self { data: None, status: StatusMessage::error(text, ttl), simulated: false }
    }
}

/// Which kind of server note accompanied a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteMarker {
    TemporarilyUnavailable,
    CurrentlyUnreachable,
}

#[must_use]
pub fn note_marker(note: Option<&str>) -> Option<NoteMarker> {
    let note = note?;
    if note.contains(TEMPORARILY_UNAVAILABLE) {
        Some(NoteMarker::TemporarilyUnavailable)
    } else if note.contains(CURRENTLY_UNREACHABLE) {
        Some(NoteMarker::CurrentlyUnreachable)
    } else {
        None
    }
}

/// Resolve `outcome` into data and a status message.
///
/// `mock` runs only for degraded outcomes.
pub fn resolve<F>(outcome: ProcessingOutcome, mock: F, copy: &ActionCopy, ttl: Duration) -> Resolution
where
    F: FnOnce() -> Processed,
{
    match outcome {
        ProcessingOutcome::Success { data, server_note } => {
            let (text, severity, simulated) = match note_marker(server_note.as_deref()) {
                None => (copy.done.to_string(), Severity::Success, false),
                Some(NoteMarker::TemporarilyUnavailable) => (
                    format!("{} (service temporarily unavailable)", copy.simulated),
                    Severity::Success,
                    true,
                ),
                Some(NoteMarker::CurrentlyUnreachable) => {
                    (format!("{} (AI service unreachable)", copy.simulated), Severity::Warning, true)
                }
            };
            info!(severity = %severity, simulated, "degrade: server result");
            Resolution { data: Some(data), status: StatusMessage::new(text, severity, ttl), simulated }
        }
        ProcessingOutcome::Degraded { reason, detail } => {
            info!(?reason, %detail, "degrade: substituting simulated result");
            Resolution {
                data: Some(mock()),
                status: StatusMessage::success(format!("{} ({DEGRADED_SUFFIX})", copy.simulated), ttl),
                simulated: true,
            }
        }
        ProcessingOutcome::Rejected { reason } => {
            warn!(?reason, "degrade: action rejected");
            let text = match reason {
                RejectReason::Unauthenticated => copy.login_required,
                RejectReason::InvalidInput => copy.invalid_input,
            };
            Resolution::rejected(text, ttl)
        }
    }
}

#[cfg(test)]
#[path = "degrade_test.rs"]
mod tests;
