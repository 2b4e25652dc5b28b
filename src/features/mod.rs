//! Feature modules: Story, Studio, Market, Trend.
//!
//! ARCHITECTURE
//! ============
//! Each user-triggered remote action runs through one [`ActionSlot`]:
//!
//! ```text
//! Idle/Rendered/Rejected --trigger--> Pending --resolution--> Rendered | Rejected
//! ```
//!
//! A trigger while the slot is `Pending` is ignored and issues no request.
//! The session epoch is captured at trigger time; if it changed by the time
//! the call resolves (sign-out, or a different sign-in), the result is
//! dropped and the action ends `Rejected`.
//!
//! Every trigger yields exactly one [`StatusMessage`] in its report.

pub mod market;
pub mod story;
pub mod studio;
pub mod trend;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::degrade::{self, ActionCopy, Resolution};
use crate::device::MediaDevices;
use crate::prefs::PreferenceStore;
use crate::remote::types::{Processed, ProcessingOutcome};
use crate::remote::RemoteProcessing;
use crate::session::{SessionProvider, Token};
use crate::status::{StatusMessage, StatusSlot};
use crate::storage::ImageStore;

// =============================================================================
// CONTEXT
// =============================================================================

/// Collaborators shared by every feature module. Built once at startup.
#[derive(Clone)]
pub struct FeatureContext {
    pub session: Arc<dyn SessionProvider>,
    pub remote: Arc<dyn RemoteProcessing>,
    pub prefs: Arc<PreferenceStore>,
    pub store: Arc<dyn ImageStore>,
    pub devices: Arc<dyn MediaDevices>,
    pub status_ttl: Duration,
    pub history_limit: usize,
}

// =============================================================================
// ACTION STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Pending,
    Rendered,
    Rejected,
}

/// What one trigger produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport<T> {
    /// Slot state after the trigger settled (`Pending` when it was ignored).
    pub state: ActionState,
    pub data: Option<T>,
    pub status: StatusMessage,
}

impl<T> ActionReport<T> {
    #[must_use]
    pub fn rendered(&self) -> bool {
        self.state == ActionState::Rendered && self.data.is_some()
    }

    pub(crate) fn rejected(status: StatusMessage) -> Self {
        Self { state: ActionState::Rejected, data: None, status }
    }

    pub(crate) fn ignored(status: StatusMessage) -> Self {
        Self { state: ActionState::Pending, data: None, status }
    }
}

/// One action's state machine plus its in-flight guard.
#[derive(Debug)]
pub struct ActionSlot {
    name: &'static str,
    state: Mutex<ActionState>,
}

impl ActionSlot {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name, state: Mutex::new(ActionState::Idle) }
    }

    #[must_use]
    pub fn state(&self) -> ActionState {
        *self.lock()
    }

    /// Move to `Pending` unless already there.
    pub fn begin(&self, epoch: u64) -> Option<ActionTicket<'_>> {
        let mut state = self.lock();
        if *state == ActionState::Pending {
            debug!(action = self.name, "action: duplicate trigger ignored");
            return None;
        }
        *state = ActionState::Pending;
        Some(ActionTicket { slot: self, epoch, settled: false })
    }

    /// Settle without a ticket (local validation failure). No-op while pending.
    pub fn reject_now(&self) {
        let mut state = self.lock();
        if *state != ActionState::Pending {
            *state = ActionState::Rejected;
        }
    }

    fn set(&self, next: ActionState) {
        *self.lock() = next;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ActionState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Proof of a pending action. Dropping it unsettled marks the slot `Rejected`,
/// so an abandoned future cannot leave the slot stuck in `Pending`.
#[derive(Debug)]
pub struct ActionTicket<'a> {
    slot: &'a ActionSlot,
    epoch: u64,
    settled: bool,
}

impl ActionTicket<'_> {
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn settle(mut self, state: ActionState) {
        self.settled = true;
        self.slot.set(state);
    }
}

impl Drop for ActionTicket<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(action = self.slot.name, "action: abandoned while pending");
            self.slot.set(ActionState::Rejected);
        }
    }
}

// =============================================================================
// SHARED FLOW
// =============================================================================

impl FeatureContext {
    /// Post and return an error for input refused before any call.
    pub(crate) fn reject_locally<T>(&self, slot: &ActionSlot, status: &StatusSlot, text: &str) -> ActionReport<T> {
        slot.reject_now();
        let message = StatusMessage::error(text, self.status_ttl);
        status.post(message.clone());
        ActionReport::rejected(message)
    }

    /// Enter `Pending` and obtain a bearer token.
    ///
    /// Returns the finished report instead when the trigger is a duplicate or
    /// nobody is signed in; in those cases no request is issued.
    pub(crate) async fn begin_remote<'s, T>(
        &self,
        slot: &'s ActionSlot,
        status: &StatusSlot,
        copy: &ActionCopy,
    ) -> Result<(ActionTicket<'s>, Token), ActionReport<T>>
    where
        T: From<Processed>,
    {
        let Some(ticket) = slot.begin(self.session.epoch()) else {
            let message = StatusMessage::info(format!("{} (already in progress)", copy.pending), self.status_ttl);
            return Err(ActionReport::ignored(message));
        };
        if !self.session.is_authenticated() {
            return Err(self.settle(ticket, status, Resolution::rejected(copy.login_required, self.status_ttl)));
        }
        match self.session.id_token().await {
            Ok(token) => {
                status.post(StatusMessage::info(copy.pending, self.status_ttl));
                Ok((ticket, token))
            }
            Err(e) => {
                warn!(error = %e, "action: token unavailable");
                Err(self.settle(ticket, status, Resolution::rejected(copy.login_required, self.status_ttl)))
            }
        }
    }

    /// Resolve the final outcome and settle the ticket, honoring the ordering
    /// guard.
    pub(crate) fn finish_remote<F>(
        &self,
        ticket: ActionTicket<'_>,
        status: &StatusSlot,
        copy: &ActionCopy,
        outcome: ProcessingOutcome,
        mock: F,
    ) -> ActionReport<Processed>
    where
        F: FnOnce() -> Processed,
    {
        if self.session_changed(&ticket) {
            return self.settle(ticket, status, Resolution::rejected(copy.login_required, self.status_ttl));
        }
        let resolution = degrade::resolve(outcome, mock, copy, self.status_ttl);
        self.settle(ticket, status, resolution)
    }

    /// Settle as `Rejected` without rendering; the result no longer matches
    /// the input it was requested for.
    pub(crate) fn discard_remote<T>(&self, ticket: ActionTicket<'_>, status: &StatusSlot, text: &str) -> ActionReport<T>
    where
        T: From<Processed>,
    {
        info!(action = ticket.slot.name, "action: input changed while pending, dropping result");
        let resolution = Resolution { data: None, status: StatusMessage::info(text, self.status_ttl), simulated: false };
        self.settle(ticket, status, resolution)
    }

    pub(crate) fn session_changed(&self, ticket: &ActionTicket<'_>) -> bool {
        let now = self.session.epoch();
        if now != ticket.epoch() || !self.session.is_authenticated() {
            warn!(started = ticket.epoch(), now, "action: session changed while pending, dropping result");
            return true;
        }
        false
    }

    fn settle<T>(&self, ticket: ActionTicket<'_>, status: &StatusSlot, resolution: Resolution) -> ActionReport<T>
    where
        T: From<Processed>,
    {
        let Resolution { data, status: message, .. } = resolution;
        let state = if data.is_some() { ActionState::Rendered } else { ActionState::Rejected };
        ticket.settle(state);
        status.post(message.clone());
        ActionReport { state, data: data.map(T::from), status: message }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
