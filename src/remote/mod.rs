//! Remote processing client: one HTTP call per request, never an error.
//!
//! DESIGN
//! ======
//! [`RemoteProcessing::send`] always returns a [`ProcessingOutcome`]. Transport
//! failures, non-2xx statuses and malformed bodies are classified into
//! `Degraded` here so no feature module ever sees a raw HTTP error. Each call
//! is attempted exactly once; there is no retry.
//!
//! The call is raced against an outer deadline with `tokio::time::timeout`.
//! Dropping the losing future aborts the in-flight reqwest request.

pub mod types;
pub mod wire;

use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::session::Token;
use types::{AUX_ARTISAN_ID, AUX_LANGUAGE, DegradeReason, Operation, Payload, RejectReason};
pub use types::{ProcessingOutcome, ProcessingRequest};

const AUDIO_FILE_NAME: &str = "recording.wav";
const ERROR_BODY_LOG_LIMIT: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Async seam between feature modules and the API. Enables mocking in tests.
#[async_trait::async_trait]
pub trait RemoteProcessing: Send + Sync {
    /// Issue `request` once with `token` as bearer credential.
    async fn send(&self, request: &ProcessingRequest, token: &Token) -> ProcessingOutcome;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct RemoteClient {
    http: reqwest::Client,
    api_base_url: String,
    translate_base_url: String,
    deadline: Duration,
}

impl RemoteClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::HttpClientBuild`] if the TLS backend fails to
    /// initialize.
    pub fn new(config: &AppConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| RemoteError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_base_url: config.api_base_url.clone(),
            translate_base_url: config.translate_base_url.clone(),
            deadline: config.timeouts.deadline(),
        })
    }

    /// Override the outer per-call deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    fn url_for(&self, operation: Operation) -> String {
        let base = if operation == Operation::Translate { &self.translate_base_url } else { &self.api_base_url };
        format!("{base}{}", wire::endpoint_path(operation))
    }

    async fn dispatch(&self, request: &ProcessingRequest, token: &Token) -> Result<(u16, String), reqwest::Error> {
        let operation = request.operation();
        let builder = self
            .http
            .post(self.url_for(operation))
            .bearer_auth(token.as_str());

        let builder = match (operation, request.payload()) {
            (Operation::Transcribe, Payload::Bytes { data, mime }) => {
                let audio = Part::bytes(data.clone())
                    .file_name(AUDIO_FILE_NAME)
                    .mime_str(mime)?;
                let form = Form::new()
                    .part("audio", audio)
                    .text("language", request.aux(AUX_LANGUAGE).unwrap_or("en").to_string());
                builder.multipart(form)
            }
            (op, Payload::Text(data_uri)) if op.is_image() => {
                let mut form = Form::new()
                    .text("image_url", data_uri.clone())
                    .text("operation", op.as_str());
                if let Some(id) = request.aux(AUX_ARTISAN_ID) {
                    form = form.text("artisan_id", id.to_string());
                }
                builder.multipart(form)
            }
            (Operation::GenerateStory, Payload::Text(text)) => {
                builder.json(&wire::StoryBody::from_request(request, text))
            }
            (Operation::Translate, Payload::Text(text)) => {
                builder.json(&wire::TranslateBody::from_request(request, text))
            }
            // Shape mismatches are rejected by `validate` before dispatch.
            (_, Payload::Bytes { .. } | Payload::Text(_)) => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

#[async_trait::async_trait]
impl RemoteProcessing for RemoteClient {
    async fn send(&self, request: &ProcessingRequest, token: &Token) -> ProcessingOutcome {
        let operation = request.operation();
        if let Err(reason) = validate(request) {
            warn!(%operation, reason, "remote: request rejected before dispatch");
            return ProcessingOutcome::rejected(RejectReason::InvalidInput);
        }

        let started = Instant::now();
        let result = tokio::time::timeout(self.deadline, self.dispatch(request, token)).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Err(_) => {
                warn!(%operation, elapsed_ms, "remote: deadline expired");
                ProcessingOutcome::degraded(DegradeReason::NetworkFailure, "deadline expired")
            }
            Ok(Err(e)) if e.is_builder() => {
                warn!(%operation, error = %e, "remote: request could not be built");
                ProcessingOutcome::rejected(RejectReason::InvalidInput)
            }
            Ok(Err(e)) => {
                let reason = classify_transport(&e);
                warn!(%operation, ?reason, error = %e, elapsed_ms, "remote: transport failure");
                ProcessingOutcome::degraded(reason, e.to_string())
            }
            Ok(Ok((status, body))) if !(200..300).contains(&status) => {
                let snippet: String = body.chars().take(ERROR_BODY_LOG_LIMIT).collect();
                warn!(%operation, status, body = %snippet, elapsed_ms, "remote: service error");
                ProcessingOutcome::degraded(DegradeReason::ServiceError, format!("status {status}"))
            }
            Ok(Ok((status, body))) => match wire::parse_response(operation, &body) {
                Ok((data, server_note)) => {
                    info!(%operation, status, elapsed_ms, noted = server_note.is_some(), "remote: success");
                    ProcessingOutcome::Success { data, server_note }
                }
                Err(e) => {
                    warn!(%operation, status, error = %e, "remote: malformed success body");
                    ProcessingOutcome::degraded(DegradeReason::ServiceError, e.to_string())
                }
            },
        }
    }
}

/// Local shape check: non-empty payload of the kind the operation expects.
fn validate(request: &ProcessingRequest) -> Result<(), &'static str> {
    if request.payload().is_empty() {
        return Err("empty payload");
    }
    match (request.operation(), request.payload()) {
        (Operation::Transcribe, Payload::Bytes { .. }) => Ok(()),
        (Operation::Transcribe, Payload::Text(_)) => Err("transcription needs audio bytes"),
        (_, Payload::Text(_)) => Ok(()),
        (op, Payload::Bytes { .. }) => {
            debug!(%op, "remote: bytes payload for text operation");
            Err("operation needs a text payload")
        }
    }
}

fn classify_transport(err: &reqwest::Error) -> DegradeReason {
    if err.is_connect() { DegradeReason::ServiceUnreachable } else { DegradeReason::NetworkFailure }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
