//! Persisted client-local preferences.
//!
//! SYSTEM CONTEXT
//! ==============
//! Plain key/value state that survives restarts: last-used locale and the
//! artisan profile hints sent with story and image requests. Stored as one
//! JSON file; no schema versioning. A missing or unreadable file yields
//! defaults rather than an error.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::remote::types::CulturalContext;

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_REGION: &str = "north_india";
pub const DEFAULT_CRAFT: &str = "textiles";
pub const DEFAULT_CULTURAL_BACKGROUND: &str = "traditional_craftsmanship";

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("preferences write failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("preferences encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artisan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_background: Option<String>,
}

impl Preferences {
    #[must_use]
    pub fn locale(&self) -> &str {
        self.locale.as_deref().unwrap_or(DEFAULT_LOCALE)
    }

    /// Context for story generation, with regional defaults filled in.
    #[must_use]
    pub fn cultural_context(&self) -> CulturalContext {
        CulturalContext::new(
            self.region.as_deref().unwrap_or(DEFAULT_REGION),
            self.craft.as_deref().unwrap_or(DEFAULT_CRAFT),
            self.cultural_background
                .as_deref()
                .unwrap_or(DEFAULT_CULTURAL_BACKGROUND),
        )
    }
}

/// Preferences with optional file backing.
pub struct PreferenceStore {
    path: Option<PathBuf>,
    current: Mutex<Preferences>,
}

impl PreferenceStore {
    /// Store that never touches disk.
    #[must_use]
    pub fn in_memory(initial: Preferences) -> Self {
        Self { path: None, current: Mutex::new(initial) }
    }

    /// Load from `path`; absent or unreadable files start from defaults.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let current = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "prefs: unreadable, using defaults");
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        };
        Self { path: Some(path.to_path_buf()), current: Mutex::new(current) }
    }

    #[must_use]
    pub fn snapshot(&self) -> Preferences {
        self.lock().clone()
    }

    /// Apply `f` and persist the result.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the file cannot be written; the in-memory
    /// value is updated regardless.
    pub fn update<F>(&self, f: F) -> Result<Preferences, PrefsError>
    where
        F: FnOnce(&mut Preferences),
    {
        let updated = {
            let mut current = self.lock();
            f(&mut current);
            current.clone()
        };
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&updated)?)?;
        }
        Ok(updated)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Preferences> {
        self.current.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "prefs_test.rs"]
mod tests;
