//! Application root: wiring, screen navigation, and command dispatch.
//!
//! ARCHITECTURE
//! ============
//! [`App`] is built once at startup and owns the session, the translator, and
//! one instance of each feature module, all sharing a single
//! [`FeatureContext`]. User actions arrive as `<module>.<action>` command ids
//! with a JSON argument map and are routed through a table built once.
//!
//! Screen rules: signing in shows the story weaver, signing out shows login,
//! any navigation while signed out lands on login, and unknown screen ids
//! fall back to the story weaver.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::datauri;
use crate::device::MediaDevices;
use crate::features::market::MarketNavigator;
use crate::features::story::StoryWeaver;
use crate::features::studio::DigitalStudio;
use crate::features::trend::TrendWeaver;
use crate::features::{ActionReport, FeatureContext};
use crate::locale::{LocaleError, Translator};
use crate::prefs::PreferenceStore;
use crate::remote::types::Processed;
use crate::remote::{RemoteClient, RemoteError, RemoteProcessing};
use crate::session::{LocalSessionProvider, SessionProvider, SessionUser};
use crate::status::{StatusMessage, StatusSlot};
use crate::storage::{ImageStore, InMemoryImageStore};

/// Command arguments, keyed by name.
pub type Args = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument `{0}`")]
    MissingArg(&'static str),
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArg { name: &'static str, reason: String },
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
}

// =============================================================================
// SCREENS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Login,
    StoryWeaver,
    DigitalStudio,
    TrendWeaver,
    MarketNavigator,
}

impl Screen {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::StoryWeaver => "story-weaver",
            Self::DigitalStudio => "digital-studio",
            Self::TrendWeaver => "trend-weaver",
            Self::MarketNavigator => "market-navigator",
        }
    }

    /// Feature screen for `id`; anything else is the story weaver.
    #[must_use]
    pub fn parse_or_default(id: &str) -> Self {
        match id {
            "digital-studio" => Self::DigitalStudio,
            "trend-weaver" => Self::TrendWeaver,
            "market-navigator" => Self::MarketNavigator,
            _ => Self::StoryWeaver,
        }
    }
}

// =============================================================================
// COMMAND TABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    SignIn,
    SignInGuest,
    SignOut,
    Navigate,
    SetLanguage,
    Translate,
    StudioLoadImage,
    StudioRemoveBg,
    StudioEnhance,
    StudioMockup,
    StudioCameraOpen,
    StudioCameraCapture,
    StudioCameraRetake,
    StudioCameraUse,
    StudioCameraClose,
    StudioHistory,
    StudioHistoryLoad,
    StoryRecordStart,
    StoryRecordStop,
    StoryGenerate,
    StorySave,
    MarketCalculatePrice,
    MarketChat,
    TrendGenerate,
}

/// Every command id, in listing order.
pub const COMMANDS: &[(&str, CommandId)] = &[
    ("session.sign_in", CommandId::SignIn),
    ("session.sign_in_guest", CommandId::SignInGuest),
    ("session.sign_out", CommandId::SignOut),
    ("nav.go", CommandId::Navigate),
    ("locale.set", CommandId::SetLanguage),
    ("locale.translate", CommandId::Translate),
    ("studio.load_image", CommandId::StudioLoadImage),
    ("studio.remove_bg", CommandId::StudioRemoveBg),
    ("studio.enhance", CommandId::StudioEnhance),
    ("studio.mockup", CommandId::StudioMockup),
    ("studio.camera_open", CommandId::StudioCameraOpen),
    ("studio.camera_capture", CommandId::StudioCameraCapture),
    ("studio.camera_retake", CommandId::StudioCameraRetake),
    ("studio.camera_use", CommandId::StudioCameraUse),
    ("studio.camera_close", CommandId::StudioCameraClose),
    ("studio.history", CommandId::StudioHistory),
    ("studio.history_load", CommandId::StudioHistoryLoad),
    ("story.record_start", CommandId::StoryRecordStart),
    ("story.record_stop", CommandId::StoryRecordStop),
    ("story.generate", CommandId::StoryGenerate),
    ("story.save", CommandId::StorySave),
    ("market.calculate_price", CommandId::MarketCalculatePrice),
    ("market.chat", CommandId::MarketChat),
    ("trend.generate", CommandId::TrendGenerate),
];

static COMMAND_TABLE: LazyLock<HashMap<&'static str, CommandId>> =
    LazyLock::new(|| COMMANDS.iter().copied().collect());

impl CommandId {
    #[must_use]
    pub fn lookup(id: &str) -> Option<Self> {
        COMMAND_TABLE.get(id).copied()
    }
}

/// Result of one dispatched command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutput {
    pub screen: Screen,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusMessage>,
    pub data: Value,
}

// =============================================================================
// APP
// =============================================================================

pub struct App {
    session: Arc<LocalSessionProvider>,
    translator: Translator,
    story: StoryWeaver,
    studio: DigitalStudio,
    market: MarketNavigator,
    trend: TrendWeaver,
    screen: Mutex<Screen>,
    login_status: StatusSlot,
    ttl: Duration,
}

impl App {
    /// Wire every module around the given collaborators.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        remote: Arc<dyn RemoteProcessing>,
        devices: Arc<dyn MediaDevices>,
        store: Arc<dyn ImageStore>,
        prefs: Arc<PreferenceStore>,
    ) -> Self {
        let session = Arc::new(LocalSessionProvider::new());
        let ctx = FeatureContext {
            session: session.clone(),
            remote: remote.clone(),
            prefs: prefs.clone(),
            store,
            devices,
            status_ttl: config.status_ttl,
            history_limit: config.history_limit,
        };
        Self {
            translator: Translator::new(session.clone(), remote, prefs),
            story: StoryWeaver::new(ctx.clone()),
            studio: DigitalStudio::new(ctx),
            market: MarketNavigator::new(config.status_ttl),
            trend: TrendWeaver::new(config.status_ttl),
            screen: Mutex::new(Screen::Login),
            login_status: StatusSlot::new(),
            ttl: config.status_ttl,
            session,
        }
    }

    /// Production wiring: HTTP client, file-backed preferences, in-memory
    /// image store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Remote`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, devices: Arc<dyn MediaDevices>) -> Result<Self, AppError> {
        let remote = Arc::new(RemoteClient::new(config)?);
        let prefs = Arc::new(PreferenceStore::load(&config.prefs_path));
        Ok(Self::new(config, remote, devices, Arc::new(InMemoryImageStore::new()), prefs))
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        *lock(&self.screen)
    }

    /// Login screen status, if still visible.
    #[must_use]
    pub fn login_status(&self) -> Option<StatusMessage> {
        self.login_status.current()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.current_user()
    }

    #[must_use]
    pub fn studio(&self) -> &DigitalStudio {
        &self.studio
    }

    #[must_use]
    pub fn story(&self) -> &StoryWeaver {
        &self.story
    }

    // =========================================================================
    // SESSION + NAVIGATION
    // =========================================================================

    pub fn sign_in_federated(&self, uid: &str, display_name: Option<&str>, token: &str) -> StatusMessage {
        match self.session.sign_in_federated(uid, display_name, token) {
            Ok(user) => self.signed_in(&user),
            Err(e) => self.post_login(StatusMessage::error(format!("Sign in failed: {e}"), self.ttl)),
        }
    }

    pub fn sign_in_guest(&self) -> StatusMessage {
        let user = self.session.sign_in_anonymously();
        self.signed_in(&user)
    }

    /// Sign out, release any held device, and return to login.
    pub fn sign_out(&self) -> StatusMessage {
        self.studio.close_camera();
        self.story.cancel_recording();
        self.session.sign_out();
        for status in [self.studio.status(), self.story.status(), self.market.status(), self.trend.status()] {
            status.clear();
        }
        self.set_screen(Screen::Login);
        self.post_login(StatusMessage::info("Signed out.", self.ttl))
    }

    pub fn navigate(&self, screen_id: &str) -> Screen {
        let target = if self.session.is_authenticated() { Screen::parse_or_default(screen_id) } else { Screen::Login };
        self.set_screen(target);
        target
    }

    fn signed_in(&self, user: &SessionUser) -> StatusMessage {
        self.set_screen(Screen::StoryWeaver);
        let name = user.display_name.as_deref().unwrap_or("guest");
        self.post_login(StatusMessage::success(format!("Signed in as {name}."), self.ttl))
    }

    fn set_screen(&self, screen: Screen) {
        let mut current = lock(&self.screen);
        if *current != screen {
            info!(from = current.id(), to = screen.id(), "app: navigate");
            *current = screen;
        }
    }

    fn post_login(&self, message: StatusMessage) -> StatusMessage {
        self.login_status.post(message.clone());
        message
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Run one command by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] for unknown ids and missing or malformed
    /// arguments. User-level failures (validation, login required) are
    /// reported through the output status instead.
    pub async fn dispatch(&self, command: &str, args: &Args) -> Result<CommandOutput, AppError> {
        let Some(id) = CommandId::lookup(command) else {
            warn!(%command, "app: unknown command");
            return Err(AppError::UnknownCommand(command.to_string()));
        };
        info!(%command, "app: dispatch");

        let (status, data) = match id {
            CommandId::SignIn => {
                let uid = arg_str(args, "uid")?;
                let token = arg_str(args, "token")?;
                (Some(self.sign_in_federated(uid, opt_str(args, "display_name"), token)), Value::Null)
            }
            CommandId::SignInGuest => (Some(self.sign_in_guest()), Value::Null),
            CommandId::SignOut => (Some(self.sign_out()), Value::Null),
            CommandId::Navigate => {
                let screen = self.navigate(arg_str(args, "screen")?);
                let label = self.translator.label(screen.id());
                (None, json!({ "screen": screen.id(), "label": label }))
            }
            CommandId::SetLanguage => {
                self.translator.change_language(arg_str(args, "language")?)?;
                (None, json!({ "language": self.translator.current_language() }))
            }
            CommandId::Translate => {
                let text = arg_str(args, "text")?;
                let target = arg_str(args, "target")?;
                let translated = self.translator.translate_text(text, target, opt_str(args, "context")).await;
                (None, json!({ "translated_text": translated }))
            }
            CommandId::StudioLoadImage => {
                let uri = arg_str(args, "image")?;
                let mime = datauri::mime_of(uri).unwrap_or_default();
                let bytes = datauri::decode(uri).unwrap_or_default();
                (Some(self.studio.load_image(mime, &bytes)), Value::Null)
            }
            CommandId::StudioRemoveBg => report(self.studio.remove_background().await, processed_json),
            CommandId::StudioEnhance => report(self.studio.enhance_image().await, processed_json),
            CommandId::StudioMockup => report(self.studio.generate_mockup().await, processed_json),
            CommandId::StudioCameraOpen => (Some(self.studio.open_camera()), Value::Null),
            CommandId::StudioCameraCapture => (Some(self.studio.capture_photo()), Value::Null),
            CommandId::StudioCameraRetake => (Some(self.studio.retake_photo()), Value::Null),
            CommandId::StudioCameraUse => (Some(self.studio.use_photo().await), Value::Null),
            CommandId::StudioCameraClose => {
                self.studio.close_camera();
                (None, Value::Null)
            }
            CommandId::StudioHistory => match self.studio.load_history().await {
                Ok(records) => (self.studio.status().current(), to_json(&records)),
                Err(status) => (Some(status), Value::Null),
            },
            CommandId::StudioHistoryLoad => {
                let raw = arg_str(args, "id")?;
                let id = Uuid::parse_str(raw)
                    .map_err(|e| AppError::InvalidArg { name: "id", reason: e.to_string() })?;
                match self.studio.load_from_history(id) {
                    Ok(()) => (self.studio.status().current(), Value::Null),
                    Err(status) => (Some(status), Value::Null),
                }
            }
            CommandId::StoryRecordStart => (Some(self.story.start_recording()), Value::Null),
            CommandId::StoryRecordStop => (Some(self.story.stop_recording()), Value::Null),
            CommandId::StoryGenerate => report(self.story.generate_story().await, |s| to_json(&s)),
            CommandId::StorySave => match self.story.save_story() {
                Ok(file) => {
                    (self.story.status().current(), json!({ "filename": file.filename, "contents": file.contents }))
                }
                Err(status) => (Some(status), Value::Null),
            },
            CommandId::MarketCalculatePrice => {
                let name = arg_str(args, "product_name")?;
                let base = arg_f64(args, "base_price")?;
                let tier = opt_str(args, "tier").unwrap_or("local");
                match self.market.calculate_price(name, base, tier) {
                    Ok(pricing) => (self.market.status().current(), to_json(&pricing)),
                    Err(status) => (Some(status), Value::Null),
                }
            }
            CommandId::MarketChat => {
                let message = arg_str(args, "message")?;
                let language = opt_str(args, "language").unwrap_or("en");
                (None, to_json(&self.market.send_chat_message(message, language)))
            }
            CommandId::TrendGenerate => {
                let category = opt_str(args, "category").unwrap_or("fashion");
                let trends = self.trend.generate_trends(category);
                (self.trend.status().current(), to_json(trends))
            }
        };

        Ok(CommandOutput { screen: self.screen(), status, data })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn report<T>(report: ActionReport<T>, render: impl FnOnce(T) -> Value) -> (Option<StatusMessage>, Value) {
    (Some(report.status), report.data.map_or(Value::Null, render))
}

fn processed_json(data: Processed) -> Value {
    match data {
        Processed::Image(uri) => json!({ "image": uri }),
        Processed::MockupDescription(text) => json!({ "mockup_description": text }),
        Processed::Transcription(text) => json!({ "transcription": text }),
        Processed::Story { story, cultural_context } => json!({ "story": story, "cultural_context": cultural_context }),
        Processed::Translation(text) => json!({ "translated_text": text }),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn arg_str<'a>(args: &'a Args, name: &'static str) -> Result<&'a str, AppError> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(AppError::InvalidArg { name, reason: format!("expected string, got {other}") }),
        None => Err(AppError::MissingArg(name)),
    }
}

fn opt_str<'a>(args: &'a Args, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

fn arg_f64(args: &Args, name: &'static str) -> Result<f64, AppError> {
    match args.get(name) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| AppError::InvalidArg { name, reason: "not a number".into() }),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|e: std::num::ParseFloatError| AppError::InvalidArg { name, reason: e.to_string() }),
        Some(other) => Err(AppError::InvalidArg { name, reason: format!("expected number, got {other}") }),
        None => Err(AppError::MissingArg(name)),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
