//! Remote processing types: requests, outcomes, and payloads.
//!
//! Provider-neutral shapes shared by the HTTP client, the degradation policy,
//! and the feature modules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const AUX_LANGUAGE: &str = "language";
pub const AUX_ARTISAN_ID: &str = "artisan_id";
pub const AUX_REGION: &str = "region";
pub const AUX_CRAFT_CATEGORY: &str = "craft_category";
pub const AUX_CULTURAL_BACKGROUND: &str = "cultural_background";
pub const AUX_SOURCE_LANGUAGE: &str = "source_language";
pub const AUX_TARGET_LANGUAGE: &str = "target_language";
pub const AUX_CONTEXT: &str = "context";

// =============================================================================
// OPERATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RemoveBg,
    Enhance,
    GenerateMockup,
    Transcribe,
    GenerateStory,
    Translate,
}

impl Operation {
    /// Wire name, as sent in the `operation` form field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoveBg => "remove_bg",
            Self::Enhance => "enhance",
            Self::GenerateMockup => "generate_mockup",
            Self::Transcribe => "transcribe",
            Self::GenerateStory => "generate_story",
            Self::Translate => "translate",
        }
    }

    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, Self::RemoveBg | Self::Enhance | Self::GenerateMockup)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw media bytes (recorded audio).
    Bytes { data: Vec<u8>, mime: String },
    /// Text: a data URI for images, a transcription, or text to translate.
    Text(String),
}

impl Payload {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bytes { data, .. } => data.is_empty(),
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

/// One remote call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingRequest {
    payload: Payload,
    operation: Operation,
    auxiliary: BTreeMap<String, String>,
}

impl ProcessingRequest {
    #[must_use]
    pub fn new(operation: Operation, payload: Payload, auxiliary: BTreeMap<String, String>) -> Self {
        Self { payload, operation, auxiliary }
    }

    /// Image operation over a data URI, optionally attributed to an artisan.
    #[must_use]
    pub fn image(operation: Operation, data_uri: &str, artisan_id: Option<&str>) -> Self {
        let mut auxiliary = BTreeMap::new();
        if let Some(id) = artisan_id {
            auxiliary.insert(AUX_ARTISAN_ID.to_string(), id.to_string());
        }
        Self::new(operation, Payload::Text(data_uri.to_string()), auxiliary)
    }

    #[must_use]
    pub fn transcription(audio: Vec<u8>, mime: &str, language: &str) -> Self {
        let auxiliary = BTreeMap::from([(AUX_LANGUAGE.to_string(), language.to_string())]);
        Self::new(Operation::Transcribe, Payload::Bytes { data: audio, mime: mime.to_string() }, auxiliary)
    }

    #[must_use]
    pub fn story(transcription: &str, language: &str, artisan_id: Option<&str>, context: &CulturalContext) -> Self {
        let mut auxiliary = BTreeMap::from([(AUX_LANGUAGE.to_string(), language.to_string())]);
        if let Some(id) = artisan_id {
            auxiliary.insert(AUX_ARTISAN_ID.to_string(), id.to_string());
        }
        for (key, value) in [
            (AUX_REGION, &context.region),
            (AUX_CRAFT_CATEGORY, &context.craft_category),
            (AUX_CULTURAL_BACKGROUND, &context.cultural_background),
        ] {
            if let Some(v) = value {
                auxiliary.insert(key.to_string(), v.clone());
            }
        }
        Self::new(Operation::GenerateStory, Payload::Text(transcription.to_string()), auxiliary)
    }

    #[must_use]
    pub fn translation(text: &str, source: &str, target: &str, context: &str) -> Self {
        let auxiliary = BTreeMap::from([
            (AUX_SOURCE_LANGUAGE.to_string(), source.to_string()),
            (AUX_TARGET_LANGUAGE.to_string(), target.to_string()),
            (AUX_CONTEXT.to_string(), context.to_string()),
        ]);
        Self::new(Operation::Translate, Payload::Text(text.to_string()), auxiliary)
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[must_use]
    pub fn aux(&self, key: &str) -> Option<&str> {
        self.auxiliary.get(key).map(String::as_str)
    }

    /// Cultural context carried in the auxiliary map.
    #[must_use]
    pub fn cultural_context(&self) -> CulturalContext {
        CulturalContext {
            region: self.aux(AUX_REGION).map(str::to_string),
            craft_category: self.aux(AUX_CRAFT_CATEGORY).map(str::to_string),
            cultural_background: self.aux(AUX_CULTURAL_BACKGROUND).map(str::to_string),
        }
    }
}

// =============================================================================
// RESULT DATA
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craft_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_background: Option<String>,
}

impl CulturalContext {
    #[must_use]
    pub fn new(region: &str, craft_category: &str, cultural_background: &str) -> Self {
        Self {
            region: Some(region.to_string()),
            craft_category: Some(craft_category.to_string()),
            cultural_background: Some(cultural_background.to_string()),
        }
    }
}

/// Data produced by a remote call (or substituted for one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processed {
    /// Processed image as a data URI or URL.
    Image(String),
    MockupDescription(String),
    Transcription(String),
    Story { story: String, cultural_context: CulturalContext },
    Translation(String),
}

// =============================================================================
// OUTCOME
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// Server answered with non-2xx or a body we could not parse.
    ServiceError,
    /// Connection could not be established.
    ServiceUnreachable,
    /// Timeout or any other transport failure.
    NetworkFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Unauthenticated,
    InvalidInput,
}

/// Terminal result of one remote call. Exactly one variant applies.
///
/// `Degraded` carries no data at this layer: the degradation policy attaches
/// substitute data from the caller's mock supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Success { data: Processed, server_note: Option<String> },
    Degraded { reason: DegradeReason, detail: String },
    Rejected { reason: RejectReason },
}

impl ProcessingOutcome {
    #[must_use]
    pub fn degraded(reason: DegradeReason, detail: impl Into<String>) -> Self {
        Self::Degraded { reason, detail: detail.into() }
    }

    #[must_use]
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }
}
