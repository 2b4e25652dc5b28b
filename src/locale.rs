//! UI language selection, static label lookup, and free-text translation.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::mock;
use crate::prefs::{PreferenceStore, PrefsError};
use crate::remote::types::{Processed, ProcessingOutcome};
use crate::remote::{ProcessingRequest, RemoteProcessing};
use crate::session::SessionProvider;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TRANSLATION_CONTEXT: &str = "general";

/// Language codes offered in the selector.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "hi", "as", "bn", "bho", "doi", "gu", "gon", "mai", "ml", "mni", "mr", "ne", "or", "pa", "sa", "sd", "si",
    "ta", "te", "ur",
];

const EN: &[(&str, &str)] = &[
    ("login-title", "KalaConnect"),
    ("login-subtitle", "AI-Powered Media Processing Platform"),
    ("login-google", "Login with Google"),
    ("login-voice", "Voice Login"),
    ("voice-instruction", "Say your name to login"),
    ("start-recording", "Start Recording"),
    ("media-library", "Media Library"),
    ("upload-media", "Upload Media"),
    ("logout", "Logout"),
    ("story-weaver", "Story Weaver"),
    ("digital-studio", "Digital Studio"),
    ("trend-weaver", "Trend Weaver"),
    ("market-navigator", "Market Navigator"),
];

const HI: &[(&str, &str)] = &[
    ("login-title", "कला कनेक्ट"),
    ("login-subtitle", "एआई-संचालित मीडिया प्रसंस्करण प्लेटफॉर्म"),
    ("login-google", "गूगल के साथ लॉगिन करें"),
    ("login-voice", "वॉइस लॉगिन"),
    ("voice-instruction", "लॉगिन करने के लिए अपना नाम बोलें"),
    ("start-recording", "रिकॉर्डिंग शुरू करें"),
    ("media-library", "मीडिया लाइब्रेरी"),
    ("upload-media", "मीडिया अपलोड करें"),
    ("logout", "लॉग आउट"),
    ("artisan-profile", "कारीगर प्रोफ़ाइल"),
    ("story-weaver", "कहानी बुनने वाला"),
    ("digital-studio", "डिजिटल स्टूडियो"),
    ("trend-weaver", "ट्रेंड वीवर"),
    ("market-navigator", "मार्केट नेविगेटर"),
];

fn table(language: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match language {
        "en" => Some(EN),
        "hi" => Some(HI),
        _ => None,
    }
}

fn find(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Label for `key`: the language's table, then English, then the key itself.
#[must_use]
pub fn translation<'a>(key: &'a str, language: &str) -> &'a str {
    table(language)
        .and_then(|t| find(t, key))
        .or_else(|| find(EN, key))
        .unwrap_or(key)
}

#[must_use]
pub fn is_supported(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}

#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    #[error("unsupported language: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Prefs(#[from] PrefsError),
}

pub struct Translator {
    session: Arc<dyn SessionProvider>,
    remote: Arc<dyn RemoteProcessing>,
    prefs: Arc<PreferenceStore>,
    current: Mutex<String>,
}

impl Translator {
    /// Starts in the persisted locale, or English.
    #[must_use]
    pub fn new(session: Arc<dyn SessionProvider>, remote: Arc<dyn RemoteProcessing>, prefs: Arc<PreferenceStore>) -> Self {
        let saved = prefs.snapshot().locale().to_string();
        let current = if is_supported(&saved) { saved } else { DEFAULT_LANGUAGE.to_string() };
        Self { session, remote, prefs, current: Mutex::new(current) }
    }

    #[must_use]
    pub fn current_language(&self) -> String {
        self.lock().clone()
    }

    /// Switch the UI language and persist the choice.
    ///
    /// # Errors
    ///
    /// [`LocaleError::Unsupported`] leaves the language unchanged. A
    /// persistence failure is reported after the switch took effect.
    pub fn change_language(&self, code: &str) -> Result<(), LocaleError> {
        if !is_supported(code) {
            return Err(LocaleError::Unsupported(code.to_string()));
        }
        *self.lock() = code.to_string();
        info!(language = code, "locale: changed");
        self.prefs.update(|p| p.locale = Some(code.to_string()))?;
        Ok(())
    }

    /// Label for `key` in the current language.
    #[must_use]
    pub fn label(&self, key: &str) -> String {
        translation(key, &self.current_language()).to_string()
    }

    /// Translate free text into `target`. Never fails: any problem yields
    /// `[target] text`.
    pub async fn translate_text(&self, text: &str, target: &str, context: Option<&str>) -> String {
        let fallback = || mock::tagged_translation(text, target);
        let Ok(token) = self.session.id_token().await else {
            debug!("locale: no session, translation skipped");
            return fallback();
        };
        let source = self.current_language();
        let request =
            ProcessingRequest::translation(text, &source, target, context.unwrap_or(DEFAULT_TRANSLATION_CONTEXT));
        match self.remote.send(&request, &token).await {
            ProcessingOutcome::Success { data: Processed::Translation(translated), .. } => translated,
            other => {
                debug!(outcome = ?other, "locale: translation fell back");
                fallback()
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, String> {
        self.current.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "locale_test.rs"]
mod tests;
