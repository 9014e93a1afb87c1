//! Camera drivers and the registry of available cameras.
//!
//! A capture may take seconds (the sensor warms up first), so handlers never
//! call [`Camera::capture`] inline: they reserve the camera and hand the
//! capture to a background task.

mod fake;
mod registry;

pub use fake::{FakeCamera, STOCK_PHOTO};
pub use registry::{CameraRegistry, CameraSlot, Reservation};

use std::path::Path;

use async_trait::async_trait;
use orderly_kernel::AppError;
use thiserror::Error;

/// Photo file extension.
pub const PHOTO_EXTENSION: &str = "jpg";

/// Camera errors.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera not found")]
    NotFound,

    #[error("photo not found")]
    PhotoNotFound,

    /// A capture is already in progress on this camera.
    #[error("camera is busy")]
    Busy,

    #[error("camera I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CameraError> for AppError {
    fn from(e: CameraError) -> Self {
        match e {
            CameraError::NotFound | CameraError::PhotoNotFound => AppError::NotFound(e.to_string()),
            CameraError::Busy => AppError::ResourceBusy(e.to_string()),
            CameraError::Io(io) => AppError::Internal(io.into()),
        }
    }
}

/// A device that produces photos.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Identifier used in URLs.
    fn id(&self) -> &str;

    /// Whether this camera is emulated rather than real hardware.
    fn is_emulated(&self) -> bool;

    /// Take a photo, store it in `dir` and return its filename.
    async fn capture(&self, dir: &Path) -> Result<String, CameraError>;
}

/// A fresh, unique photo filename.
pub fn new_photo_filename() -> String {
    format!("{}.{PHOTO_EXTENSION}", uuid::Uuid::new_v4().simple())
}

/// Whether `name` looks like a filename produced by [`new_photo_filename`].
///
/// Anything else (path separators, `..`, other extensions) is rejected
/// before the filesystem is touched.
pub fn is_photo_filename(name: &str) -> bool {
    let Some(stem) = name
        .strip_suffix(PHOTO_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
    else {
        return false;
    };
    stem.len() == 32 && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
