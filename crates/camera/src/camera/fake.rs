//! Emulated camera.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{Camera, CameraError, new_photo_filename};

/// The picture every fake capture produces.
pub const STOCK_PHOTO: &[u8] = include_bytes!("../../assets/stock.jpg");

/// A camera that "captures" by copying a stock JPEG.
#[derive(Debug, Clone)]
pub struct FakeCamera {
    id: String,
    warmup: Duration,
}

impl FakeCamera {
    pub fn new(warmup: Duration) -> Self {
        Self {
            id: "fake".to_string(),
            warmup,
        }
    }

    /// Override the camera id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

#[async_trait]
impl Camera for FakeCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_emulated(&self) -> bool {
        true
    }

    async fn capture(&self, dir: &Path) -> Result<String, CameraError> {
        tokio::time::sleep(self.warmup).await;

        let filename = new_photo_filename();
        let path = dir.join(&filename);
        let mut file = fs::File::create(&path).await?;
        file.write_all(STOCK_PHOTO).await?;
        file.flush().await?;

        debug!(camera = %self.id, path = ?path, "fake photo written");
        Ok(filename)
    }
}
