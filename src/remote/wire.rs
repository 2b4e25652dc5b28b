//! Wire types for the KalaConnect HTTP API.
//!
//! Request bodies are borrowed views over a [`ProcessingRequest`]; response
//! parsing is pure so it can be tested without a server.

use serde::{Deserialize, Serialize};

use super::types::{
    AUX_ARTISAN_ID, AUX_CONTEXT, AUX_LANGUAGE, AUX_SOURCE_LANGUAGE, AUX_TARGET_LANGUAGE, CulturalContext, Operation,
    Processed, ProcessingRequest,
};

pub const PROCESS_IMAGE_PATH: &str = "/api/v1/ai/process-image";
pub const GENERATE_STORY_PATH: &str = "/api/v1/ai/generate-story";
pub const TRANSCRIBE_AUDIO_PATH: &str = "/api/v1/ai/transcribe-audio";
pub const TRANSLATE_PATH: &str = "/api/v1/translate";

/// Used when the server answers 2xx without any transcription text.
pub const EMPTY_TRANSCRIPTION: &str = "Unable to transcribe audio. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("response parse failed: {0}")]
    Parse(String),
    #[error("response missing `{0}`")]
    MissingField(&'static str),
}

#[must_use]
pub fn endpoint_path(operation: Operation) -> &'static str {
    match operation {
        Operation::RemoveBg | Operation::Enhance | Operation::GenerateMockup => PROCESS_IMAGE_PATH,
        Operation::Transcribe => TRANSCRIBE_AUDIO_PATH,
        Operation::GenerateStory => GENERATE_STORY_PATH,
        Operation::Translate => TRANSLATE_PATH,
    }
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct StoryBody<'a> {
    pub audio_transcription: &'a str,
    pub language: &'a str,
    pub artisan_id: Option<&'a str>,
    pub cultural_context: CulturalContext,
}

impl<'a> StoryBody<'a> {
    #[must_use]
    pub fn from_request(request: &'a ProcessingRequest, transcription: &'a str) -> Self {
        Self {
            audio_transcription: transcription,
            language: request.aux(AUX_LANGUAGE).unwrap_or("en"),
            artisan_id: request.aux(AUX_ARTISAN_ID),
            cultural_context: request.cultural_context(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranslateBody<'a> {
    pub text: &'a str,
    pub source_language: &'a str,
    pub target_language: &'a str,
    pub context: &'a str,
}

impl<'a> TranslateBody<'a> {
    #[must_use]
    pub fn from_request(request: &'a ProcessingRequest, text: &'a str) -> Self {
        Self {
            text,
            source_language: request.aux(AUX_SOURCE_LANGUAGE).unwrap_or("en"),
            target_language: request.aux(AUX_TARGET_LANGUAGE).unwrap_or("en"),
            context: request.aux(AUX_CONTEXT).unwrap_or("general"),
        }
    }
}

// =============================================================================
// RESPONSE BODIES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ImageEnvelope {
    result: ImageResult,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    #[serde(default)]
    processed_image: Option<String>,
    #[serde(default)]
    enhanced_image: Option<String>,
    #[serde(default)]
    mockup_description: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StoryEnvelope {
    story: String,
    #[serde(default)]
    cultural_context: CulturalContext,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionEnvelope {
    #[serde(default)]
    transcription: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateEnvelope {
    translated_text: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse a 2xx body for `operation` into data plus any server note.
///
/// # Errors
///
/// Returns [`WireError`] when the body is not JSON or lacks the field the
/// operation needs.
pub fn parse_response(operation: Operation, body: &str) -> Result<(Processed, Option<String>), WireError> {
    match operation {
        Operation::RemoveBg | Operation::Enhance | Operation::GenerateMockup => parse_image(operation, body),
        Operation::Transcribe => parse_transcription(body),
        Operation::GenerateStory => parse_story(body),
        Operation::Translate => parse_translation(body),
    }
}

fn decode<'de, T: Deserialize<'de>>(body: &'de str) -> Result<T, WireError> {
    serde_json::from_str(body).map_err(|e| WireError::Parse(e.to_string()))
}

fn parse_image(operation: Operation, body: &str) -> Result<(Processed, Option<String>), WireError> {
    let envelope: ImageEnvelope = decode(body)?;
    // Result-level note wins; older deployments put it on the envelope.
    let note = envelope.result.note.or(envelope.note);
    let data = match operation {
        Operation::RemoveBg => Processed::Image(
            envelope
                .result
                .processed_image
                .ok_or(WireError::MissingField("result.processed_image"))?,
        ),
        Operation::Enhance => Processed::Image(
            envelope
                .result
                .enhanced_image
                .ok_or(WireError::MissingField("result.enhanced_image"))?,
        ),
        _ => Processed::MockupDescription(
            envelope
                .result
                .mockup_description
                .ok_or(WireError::MissingField("result.mockup_description"))?,
        ),
    };
    Ok((data, note))
}

fn parse_story(body: &str) -> Result<(Processed, Option<String>), WireError> {
    let envelope: StoryEnvelope = decode(body)?;
    Ok((Processed::Story { story: envelope.story, cultural_context: envelope.cultural_context }, envelope.note))
}

fn parse_transcription(body: &str) -> Result<(Processed, Option<String>), WireError> {
    let envelope: TranscriptionEnvelope = decode(body)?;
    let text = envelope
        .transcription
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| EMPTY_TRANSCRIPTION.to_string());
    Ok((Processed::Transcription(text), envelope.note))
}

fn parse_translation(body: &str) -> Result<(Processed, Option<String>), WireError> {
    let envelope: TranslateEnvelope = decode(body)?;
    let text = envelope
        .translated_text
        .filter(|t| !t.trim().is_empty())
        .ok_or(WireError::MissingField("translated_text"))?;
    Ok((Processed::Translation(text), None))
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
