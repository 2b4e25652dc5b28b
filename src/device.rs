//! Scoped camera / microphone acquisition.
//!
//! DESIGN
//! ======
//! A [`MediaStream`] is only ever held inside a [`StreamGuard`]. The guard's
//! `Drop` is the single place a stream is stopped, so every exit path (close,
//! error, completion, or the owner simply going away) releases the device
//! exactly once.

use std::path::PathBuf;

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Camera,
    Microphone,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{0} permission denied")]
    PermissionDenied(DeviceKind),
    #[error("{0} unavailable")]
    Unavailable(DeviceKind),
    #[error("capture failed: {0}")]
    Capture(String),
}

/// A live device stream.
pub trait MediaStream: Send {
    fn kind(&self) -> DeviceKind;

    /// Camera: one still frame (JPEG). Microphone: audio recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Capture`] if the device produced no data.
    fn capture(&mut self) -> Result<Vec<u8>, DeviceError>;

    /// Release the underlying device. Called once, by [`StreamGuard`].
    fn stop(&mut self);
}

/// Source of device streams (platform media API, files, or test fakes).
pub trait MediaDevices: Send + Sync {
    /// Acquire a stream for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] when permission is denied or no device exists.
    fn open(&self, kind: DeviceKind) -> Result<Box<dyn MediaStream>, DeviceError>;
}

// =============================================================================
// GUARD
// =============================================================================

pub struct StreamGuard {
    stream: Box<dyn MediaStream>,
}

impl StreamGuard {
    /// Acquire `kind` from `devices`, wrapped so it is always released.
    ///
    /// # Errors
    ///
    /// Propagates the acquisition error; nothing is held on failure.
    pub fn acquire(devices: &dyn MediaDevices, kind: DeviceKind) -> Result<Self, DeviceError> {
        let stream = devices.open(kind)?;
        info!(%kind, "device: acquired");
        Ok(Self { stream })
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.stream.kind()
    }

    /// # Errors
    ///
    /// Propagates [`MediaStream::capture`] failures.
    pub fn capture(&mut self) -> Result<Vec<u8>, DeviceError> {
        self.stream.capture()
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stream.stop();
        info!(kind = %self.stream.kind(), "device: released");
    }
}

// =============================================================================
// IMPLEMENTATIONS
// =============================================================================

/// No devices attached; every open fails.
pub struct NoDevices;

impl MediaDevices for NoDevices {
    fn open(&self, kind: DeviceKind) -> Result<Box<dyn MediaStream>, DeviceError> {
        Err(DeviceError::Unavailable(kind))
    }
}

/// Devices backed by files: the camera yields an image file, the microphone
/// yields an audio file.
#[derive(Debug, Default, Clone)]
pub struct FileDevices {
    pub camera: Option<PathBuf>,
    pub microphone: Option<PathBuf>,
}

impl MediaDevices for FileDevices {
    fn open(&self, kind: DeviceKind) -> Result<Box<dyn MediaStream>, DeviceError> {
        let path = match kind {
            DeviceKind::Camera => self.camera.clone(),
            DeviceKind::Microphone => self.microphone.clone(),
        };
        let path = path.ok_or(DeviceError::Unavailable(kind))?;
        Ok(Box::new(FileStream { kind, path }))
    }
}

struct FileStream {
    kind: DeviceKind,
    path: PathBuf,
}

impl MediaStream for FileStream {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn capture(&mut self) -> Result<Vec<u8>, DeviceError> {
        std::fs::read(&self.path).map_err(|e| DeviceError::Capture(format!("{}: {e}", self.path.display())))
    }

    fn stop(&mut self) {
        debug!(path = %self.path.display(), "device: file stream closed");
    }
}

#[cfg(test)]
#[path = "device_test.rs"]
mod tests;
