//! Transient status messages surfaced by feature modules.
//!
//! A module owns one [`StatusSlot`]; posting a new message replaces the old
//! one, and a message stops being visible once its TTL elapses.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    #[serde(skip)]
    pub ttl: Duration,
}

impl StatusMessage {
    #[must_use]
    pub fn new(text: impl Into<String>, severity: Severity, ttl: Duration) -> Self {
        Self { text: text.into(), severity, ttl }
    }

    #[must_use]
    pub fn info(text: impl Into<String>, ttl: Duration) -> Self {
        Self::new(text, Severity::Info, ttl)
    }

    #[must_use]
    pub fn success(text: impl Into<String>, ttl: Duration) -> Self {
        Self::new(text, Severity::Success, ttl)
    }

    #[must_use]
    pub fn warning(text: impl Into<String>, ttl: Duration) -> Self {
        Self::new(text, Severity::Warning, ttl)
    }

    #[must_use]
    pub fn error(text: impl Into<String>, ttl: Duration) -> Self {
        Self::new(text, Severity::Error, ttl)
    }
}

/// Holds the most recent message for one module.
#[derive(Debug, Default)]
pub struct StatusSlot {
    inner: Mutex<Option<(StatusMessage, Instant)>>,
}

impl StatusSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, message: StatusMessage) {
        self.post_at(message, Instant::now());
    }

    pub fn post_at(&self, message: StatusMessage, now: Instant) {
        let mut slot = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some((message, now));
    }

    /// The visible message, if one was posted and has not expired.
    #[must_use]
    pub fn current(&self) -> Option<StatusMessage> {
        self.current_at(Instant::now())
    }

    #[must_use]
    pub fn current_at(&self, now: Instant) -> Option<StatusMessage> {
        let mut slot = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let expired = slot
            .as_ref()
            .is_some_and(|(msg, posted)| now.saturating_duration_since(*posted) >= msg.ttl);
        if expired {
            *slot = None;
        }
        slot.as_ref().map(|(msg, _)| msg.clone())
    }

    pub fn clear(&self) {
        let mut slot = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = None;
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
