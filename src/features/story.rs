//! Story weaver: voice recording to a written craft story.
//!
//! Generation is two remote calls under one action slot: transcribe the
//! recording, then generate the story from the transcription. A failed
//! transcription falls back to the language's sample transcription and the
//! story call still runs; a failed story call falls back to a sample story.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};

use super::{ActionReport, ActionSlot, ActionState, FeatureContext};
use crate::degrade::ActionCopy;
use crate::device::{DeviceKind, StreamGuard};
use crate::mock;
use crate::remote::types::{CulturalContext, Processed, ProcessingOutcome, RejectReason};
use crate::remote::ProcessingRequest;
use crate::status::{StatusMessage, StatusSlot};
use crate::storage::now_ms;

const RECORDING_MIME: &str = "audio/wav";

pub const STORY_COPY: ActionCopy = ActionCopy {
    pending: "Transcribing and generating story...",
    done: "Story generated successfully!",
    simulated: "Story generation simulated",
    login_required: "Please log in to use the story generation feature.",
    invalid_input: "No audio recorded. Please record first.",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedStory {
    pub transcription: String,
    pub story: String,
    pub cultural_context: CulturalContext,
}

/// Download artifact produced by [`StoryWeaver::save_story`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryFile {
    pub filename: String,
    pub contents: String,
}

pub struct StoryWeaver {
    ctx: FeatureContext,
    status: StatusSlot,
    recording: Mutex<Option<StreamGuard>>,
    audio: Mutex<Option<Vec<u8>>>,
    story: Mutex<Option<GeneratedStory>>,
    generate: ActionSlot,
}

impl StoryWeaver {
    #[must_use]
    pub fn new(ctx: FeatureContext) -> Self {
        Self {
            ctx,
            status: StatusSlot::new(),
            recording: Mutex::new(None),
            audio: Mutex::new(None),
            story: Mutex::new(None),
            generate: ActionSlot::new("story.generate"),
        }
    }

    #[must_use]
    pub fn status(&self) -> &StatusSlot {
        &self.status
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        lock(&self.recording).is_some()
    }

    #[must_use]
    pub fn has_audio(&self) -> bool {
        lock(&self.audio).is_some()
    }

    #[must_use]
    pub fn story(&self) -> Option<GeneratedStory> {
        lock(&self.story).clone()
    }

    pub fn start_recording(&self) -> StatusMessage {
        let ttl = self.ctx.status_ttl;
        let mut recording = lock(&self.recording);
        if recording.is_some() {
            return self.post(StatusMessage::info("Already recording.", ttl));
        }
        match StreamGuard::acquire(self.ctx.devices.as_ref(), DeviceKind::Microphone) {
            Ok(stream) => {
                *recording = Some(stream);
                *lock(&self.audio) = None;
                self.post(StatusMessage::info("Recording started... Speak now!", ttl))
            }
            Err(e) => {
                warn!(error = %e, "story: microphone unavailable");
                self.post(StatusMessage::error("Error accessing microphone. Please check permissions.", ttl))
            }
        }
    }

    /// Collect the recorded audio and release the microphone.
    pub fn stop_recording(&self) -> StatusMessage {
        let ttl = self.ctx.status_ttl;
        let Some(mut stream) = lock(&self.recording).take() else {
            return self.post(StatusMessage::info("Not recording.", ttl));
        };
        let captured = stream.capture();
        drop(stream);
        match captured {
            Ok(audio) if !audio.is_empty() => {
                info!(bytes = audio.len(), "story: recording stopped");
                *lock(&self.audio) = Some(audio);
                self.post(StatusMessage::success("Recording stopped. Processing audio...", ttl))
            }
            Ok(_) => self.post(StatusMessage::error("No audio recorded. Please record first.", ttl)),
            Err(e) => {
                warn!(error = %e, "story: capture failed");
                self.post(StatusMessage::error("Error accessing microphone. Please check permissions.", ttl))
            }
        }
    }

    /// Release the microphone without keeping what was recorded.
    pub fn cancel_recording(&self) {
        if lock(&self.recording).take().is_some() {
            info!("story: recording cancelled");
        }
    }

    pub async fn generate_story(&self) -> ActionReport<GeneratedStory> {
        if self.generate.state() == ActionState::Pending {
            let message = StatusMessage::info(format!("{} (already in progress)", STORY_COPY.pending), self.ctx.status_ttl);
            return ActionReport::ignored(message);
        }
        let Some(audio) = lock(&self.audio).clone() else {
            return self.ctx.reject_locally(&self.generate, &self.status, STORY_COPY.invalid_input);
        };
        let (ticket, token) = match self.ctx.begin_remote::<Processed>(&self.generate, &self.status, &STORY_COPY).await {
            Ok(pair) => pair,
            Err(report) => return convert(report, String::new()),
        };

        let prefs = self.ctx.prefs.snapshot();
        let language = prefs.locale().to_string();
        let context = prefs.cultural_context();

        let request = ProcessingRequest::transcription(audio, RECORDING_MIME, &language);
        let transcription = match self.ctx.remote.send(&request, &token).await {
            ProcessingOutcome::Success { data: Processed::Transcription(text), .. } => text,
            outcome @ ProcessingOutcome::Rejected { .. } => {
                let report = self.ctx.finish_remote(ticket, &self.status, &STORY_COPY, outcome, story_fallback);
                return convert(report, String::new());
            }
            other => {
                info!(%language, outcome = ?other, "story: using sample transcription");
                mock::transcription(&language)
            }
        };
        if self.ctx.session_changed(&ticket) {
            let outcome = ProcessingOutcome::rejected(RejectReason::Unauthenticated);
            let report = self.ctx.finish_remote(ticket, &self.status, &STORY_COPY, outcome, story_fallback);
            return convert(report, transcription);
        }

        let request = ProcessingRequest::story(&transcription, &language, prefs.artisan_id.as_deref(), &context);
        let outcome = self.ctx.remote.send(&request, &token).await;
        let report = convert(
            self.ctx.finish_remote(ticket, &self.status, &STORY_COPY, outcome, story_fallback),
            transcription,
        );
        if let Some(story) = &report.data {
            *lock(&self.story) = Some(story.clone());
        }
        report
    }

    /// # Errors
    ///
    /// Returns the error status when no story has been generated.
    pub fn save_story(&self) -> Result<StoryFile, StatusMessage> {
        let ttl = self.ctx.status_ttl;
        let story = lock(&self.story).clone().filter(|s| !s.story.trim().is_empty());
        let Some(story) = story else {
            return Err(self.post(StatusMessage::error("No story to save.", ttl)));
        };
        let file = StoryFile { filename: format!("story_{}.txt", now_ms()), contents: story.story };
        info!(filename = %file.filename, "story: saved");
        self.post(StatusMessage::success("Story saved successfully!", ttl));
        Ok(file)
    }

    fn post(&self, message: StatusMessage) -> StatusMessage {
        self.status.post(message.clone());
        message
    }
}

fn story_fallback() -> Processed {
    Processed::Story { story: mock::story(), cultural_context: mock::story_context() }
}

fn convert(report: ActionReport<Processed>, transcription: String) -> ActionReport<GeneratedStory> {
    let data = match report.data {
        Some(Processed::Story { story, cultural_context }) => {
            Some(GeneratedStory { transcription, story, cultural_context })
        }
        _ => None,
    };
    ActionReport { state: report.state, data, status: report.status }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
#[path = "story_test.rs"]
mod tests;
