//! Digital studio: product photo touch-up.
//!
//! Three remote image operations (background removal, enhancement, mockup
//! generation) share one image slot. Removal and enhancement degrade to the
//! untouched original; mockup generation degrades to a fixed description.
//!
//! The camera modal holds its stream in a [`StreamGuard`], so closing the
//! modal, using a photo, or dropping the studio all release the camera.

use std::sync::Mutex;

use tracing::{info, warn};
use uuid::Uuid;

use super::{ActionReport, ActionSlot, FeatureContext};
use crate::datauri;
use crate::degrade::ActionCopy;
use crate::device::{DeviceKind, StreamGuard};
use crate::mock;
use crate::remote::types::{Operation, Processed};
use crate::remote::ProcessingRequest;
use crate::status::{StatusMessage, StatusSlot};
use crate::storage::{ImageRecord, KIND_CAPTURED};

const LOGIN_REQUIRED: &str = "Please log in to use image processing features.";
const NO_IMAGE: &str = "Please select an image first.";
const CAPTURE_MIME: &str = "image/jpeg";
const IMAGE_CHANGED: &str = "Image changed before processing finished. Please try again.";

pub const REMOVE_BG_COPY: ActionCopy = ActionCopy {
    pending: "Removing background...",
    done: "Background removed successfully!",
    simulated: "Background removal simulated",
    login_required: LOGIN_REQUIRED,
    invalid_input: NO_IMAGE,
};

pub const ENHANCE_COPY: ActionCopy = ActionCopy {
    pending: "Enhancing image...",
    done: "Image enhanced successfully!",
    simulated: "Image enhancement simulated",
    login_required: LOGIN_REQUIRED,
    invalid_input: NO_IMAGE,
};

pub const MOCKUP_COPY: ActionCopy = ActionCopy {
    pending: "Generating mockup...",
    done: "Mockup generated",
    simulated: "Mockup generation simulated",
    login_required: LOGIN_REQUIRED,
    invalid_input: NO_IMAGE,
};

#[derive(Debug, Default)]
struct Images {
    original: Option<String>,
    processed: Option<String>,
    mockup_description: Option<String>,
}

struct CameraModal {
    stream: StreamGuard,
    frame: Option<Vec<u8>>,
}

pub struct DigitalStudio {
    ctx: FeatureContext,
    status: StatusSlot,
    images: Mutex<Images>,
    camera: Mutex<Option<CameraModal>>,
    history: Mutex<Vec<ImageRecord>>,
    remove_bg: ActionSlot,
    enhance: ActionSlot,
    mockup: ActionSlot,
}

impl DigitalStudio {
    #[must_use]
    pub fn new(ctx: FeatureContext) -> Self {
        Self {
            ctx,
            status: StatusSlot::new(),
            images: Mutex::new(Images::default()),
            camera: Mutex::new(None),
            history: Mutex::new(Vec::new()),
            remove_bg: ActionSlot::new("studio.remove_bg"),
            enhance: ActionSlot::new("studio.enhance"),
            mockup: ActionSlot::new("studio.mockup"),
        }
    }

    #[must_use]
    pub fn status(&self) -> &StatusSlot {
        &self.status
    }

    #[must_use]
    pub fn original_image(&self) -> Option<String> {
        lock(&self.images).original.clone()
    }

    #[must_use]
    pub fn processed_image(&self) -> Option<String> {
        lock(&self.images).processed.clone()
    }

    #[must_use]
    pub fn mockup_description(&self) -> Option<String> {
        lock(&self.images).mockup_description.clone()
    }

    /// Accept an uploaded file. Only `image/*` types are taken.
    pub fn load_image(&self, mime: &str, bytes: &[u8]) -> StatusMessage {
        if !mime.starts_with("image/") || bytes.is_empty() {
            return self.post(StatusMessage::error("Please select a valid image file.", self.ctx.status_ttl));
        }
        self.set_original(datauri::encode(mime, bytes));
        info!(%mime, bytes = bytes.len(), "studio: image loaded");
        self.post(StatusMessage::success("Image loaded successfully!", self.ctx.status_ttl))
    }

    // =========================================================================
    // REMOTE OPERATIONS
    // =========================================================================

    pub async fn remove_background(&self) -> ActionReport<Processed> {
        self.process(Operation::RemoveBg, &self.remove_bg, &REMOVE_BG_COPY).await
    }

    pub async fn enhance_image(&self) -> ActionReport<Processed> {
        self.process(Operation::Enhance, &self.enhance, &ENHANCE_COPY).await
    }

    /// Status text carries the description after a colon.
    pub async fn generate_mockup(&self) -> ActionReport<Processed> {
        let mut report = self.process(Operation::GenerateMockup, &self.mockup, &MOCKUP_COPY).await;
        if let Some(Processed::MockupDescription(description)) = &report.data {
            report.status.text = format!("{}: {description}", report.status.text);
            self.status.post(report.status.clone());
        }
        report
    }

    async fn process(&self, operation: Operation, slot: &ActionSlot, copy: &ActionCopy) -> ActionReport<Processed> {
        let Some(original) = self.original_image() else {
            return self.ctx.reject_locally(slot, &self.status, copy.invalid_input);
        };
        let (ticket, token) = match self.ctx.begin_remote(slot, &self.status, copy).await {
            Ok(pair) => pair,
            Err(report) => return report,
        };

        let artisan_id = self.ctx.prefs.snapshot().artisan_id;
        let request = ProcessingRequest::image(operation, &original, artisan_id.as_deref());
        let outcome = self.ctx.remote.send(&request, &token).await;

        let mut images = lock(&self.images);
        if images.original.as_deref() != Some(original.as_str()) {
            drop(images);
            return self.ctx.discard_remote(ticket, &self.status, IMAGE_CHANGED);
        }
        let report = self.ctx.finish_remote(ticket, &self.status, copy, outcome, move || {
            if operation == Operation::GenerateMockup {
                Processed::MockupDescription(mock::MOCK_MOCKUP_DESCRIPTION.to_string())
            } else {
                Processed::Image(original)
            }
        });
        match &report.data {
            Some(Processed::Image(uri)) => images.processed = Some(uri.clone()),
            Some(Processed::MockupDescription(text)) => images.mockup_description = Some(text.clone()),
            _ => {}
        }
        report
    }

    // =========================================================================
    // CAMERA
    // =========================================================================

    #[must_use]
    pub fn camera_open(&self) -> bool {
        lock(&self.camera).is_some()
    }

    pub fn open_camera(&self) -> StatusMessage {
        let ttl = self.ctx.status_ttl;
        let mut camera = lock(&self.camera);
        if camera.is_some() {
            return self.post(StatusMessage::info("Camera is already open.", ttl));
        }
        match StreamGuard::acquire(self.ctx.devices.as_ref(), DeviceKind::Camera) {
            Ok(stream) => {
                *camera = Some(CameraModal { stream, frame: None });
                self.post(StatusMessage::success("Camera opened successfully!", ttl))
            }
            Err(e) => {
                warn!(error = %e, "studio: camera unavailable");
                self.post(StatusMessage::error("Error accessing camera. Please check permissions.", ttl))
            }
        }
    }

    pub fn capture_photo(&self) -> StatusMessage {
        let ttl = self.ctx.status_ttl;
        let mut camera = lock(&self.camera);
        let Some(modal) = camera.as_mut() else {
            return self.post(StatusMessage::error("Open the camera first.", ttl));
        };
        match modal.stream.capture() {
            Ok(frame) => {
                modal.frame = Some(frame);
                self.post(StatusMessage::success("Photo captured! Click \"Use Photo\" to proceed.", ttl))
            }
            Err(e) => {
                warn!(error = %e, "studio: capture failed");
                self.post(StatusMessage::error("Error capturing photo. Please try again.", ttl))
            }
        }
    }

    pub fn retake_photo(&self) -> StatusMessage {
        if let Some(modal) = lock(&self.camera).as_mut() {
            modal.frame = None;
        }
        self.post(StatusMessage::info("Ready to capture photo.", self.ctx.status_ttl))
    }

    /// Adopt the captured frame as the working image, close the camera, and
    /// save the frame for the signed-in user.
    pub async fn use_photo(&self) -> StatusMessage {
        let ttl = self.ctx.status_ttl;
        let frame = {
            let mut camera = lock(&self.camera);
            let frame = camera.as_mut().and_then(|m| m.frame.take());
            if frame.is_some() {
                // Dropping the modal releases the camera.
                camera.take();
            }
            frame
        };
        let Some(frame) = frame else {
            return self.post(StatusMessage::error("No photo captured yet.", ttl));
        };
        self.set_original(datauri::encode(CAPTURE_MIME, &frame));

        let Some(user) = self.ctx.session.current_user() else {
            return self.post(StatusMessage::success("Photo loaded successfully!", ttl));
        };
        match self.ctx.store.save_image(&user.uid, &frame, CAPTURE_MIME, KIND_CAPTURED).await {
            Ok(record) => {
                info!(id = %record.id, "studio: capture saved");
                self.post(StatusMessage::success("Photo loaded successfully!", ttl))
            }
            Err(e) => {
                warn!(error = %e, "studio: capture not saved");
                self.post(StatusMessage::warning("Image captured but failed to save to cloud.", ttl))
            }
        }
    }

    pub fn close_camera(&self) {
        if lock(&self.camera).take().is_some() {
            info!("studio: camera closed");
        }
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// Fetch the signed-in user's most recent images.
    ///
    /// # Errors
    ///
    /// Returns the error status when nobody is signed in or the store fails.
    pub async fn load_history(&self) -> Result<Vec<ImageRecord>, StatusMessage> {
        let ttl = self.ctx.status_ttl;
        let Some(user) = self.ctx.session.current_user() else {
            return Err(self.post(StatusMessage::error("Please log in to view your image history.", ttl)));
        };
        self.status.post(StatusMessage::info("Loading image history...", ttl));
        match self.ctx.store.recent_images(&user.uid, self.ctx.history_limit).await {
            Ok(records) => {
                *lock(&self.history) = records.clone();
                self.post(StatusMessage::success(format!("Loaded {} images from history.", records.len()), ttl));
                Ok(records)
            }
            Err(e) => {
                warn!(error = %e, "studio: history unavailable");
                Err(self.post(StatusMessage::error("Error loading image history. Please try again.", ttl)))
            }
        }
    }

    /// Make a previously loaded history entry the working image.
    ///
    /// # Errors
    ///
    /// Returns the error status when `id` is not in the loaded history.
    pub fn load_from_history(&self, id: Uuid) -> Result<(), StatusMessage> {
        let ttl = self.ctx.status_ttl;
        let found = lock(&self.history).iter().find(|r| r.id == id).map(|r| r.image_url.clone());
        let Some(image_url) = found else {
            return Err(self.post(StatusMessage::error("Image not found in history.", ttl)));
        };
        self.set_original(image_url);
        self.post(StatusMessage::success("Image loaded from history!", ttl));
        Ok(())
    }

    fn set_original(&self, uri: String) {
        let mut images = lock(&self.images);
        images.original = Some(uri);
        images.processed = None;
        images.mockup_description = None;
    }

    fn post(&self, message: StatusMessage) -> StatusMessage {
        self.status.post(message.clone());
        message
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
#[path = "studio_test.rs"]
mod tests;
