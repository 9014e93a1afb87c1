//! Registry of cameras and their photo directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::{Camera, CameraError, is_photo_filename};

/// One registered camera: the driver, its photo directory and a busy lock.
#[derive(Clone)]
pub struct CameraSlot {
    camera: Arc<dyn Camera>,
    dir: PathBuf,
    busy: Arc<Mutex<()>>,
}

impl CameraSlot {
    pub fn id(&self) -> &str {
        self.camera.id()
    }

    pub fn is_emulated(&self) -> bool {
        self.camera.is_emulated()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Claim the camera for a capture.
    ///
    /// Fails with [`CameraError::Busy`] while another reservation is alive.
    pub fn reserve(&self) -> Result<Reservation, CameraError> {
        let guard = self
            .busy
            .clone()
            .try_lock_owned()
            .map_err(|_| CameraError::Busy)?;
        Ok(Reservation {
            slot: self.clone(),
            _guard: guard,
        })
    }

    /// Stored photo filenames, sorted.
    pub async fn photos(&self) -> Result<Vec<String>, CameraError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut photos = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(name) = name.to_str()
                && is_photo_filename(name)
            {
                photos.push(name.to_string());
            }
        }
        photos.sort();
        Ok(photos)
    }

    /// Path of an existing photo.
    pub async fn photo_path(&self, filename: &str) -> Result<PathBuf, CameraError> {
        if !is_photo_filename(filename) {
            return Err(CameraError::PhotoNotFound);
        }
        let path = self.dir.join(filename);
        if !fs::try_exists(&path).await? {
            return Err(CameraError::PhotoNotFound);
        }
        Ok(path)
    }

    pub async fn read_photo(&self, filename: &str) -> Result<Vec<u8>, CameraError> {
        let path = self.photo_path(filename).await?;
        Ok(fs::read(&path).await?)
    }

    pub async fn delete_photo(&self, filename: &str) -> Result<(), CameraError> {
        let path = self.photo_path(filename).await?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(camera = %self.id(), filename = %filename, "photo deleted");
                Ok(())
            }
            // Lost a race with another delete.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CameraError::PhotoNotFound),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for CameraSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSlot")
            .field("id", &self.id())
            .field("emulated", &self.is_emulated())
            .field("dir", &self.dir)
            .finish()
    }
}

/// Exclusive use of a camera. The camera is released when this is dropped.
pub struct Reservation {
    slot: CameraSlot,
    _guard: OwnedMutexGuard<()>,
}

impl Reservation {
    pub fn slot(&self) -> &CameraSlot {
        &self.slot
    }

    /// Take one photo, returning its filename.
    pub async fn capture(&self) -> Result<String, CameraError> {
        let filename = self.slot.camera.capture(&self.slot.dir).await?;
        info!(camera = %self.slot.id(), filename = %filename, "photo captured");
        Ok(filename)
    }
}

/// The cameras available to this process, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CameraRegistry {
    cameras: BTreeMap<String, CameraSlot>,
}

impl CameraRegistry {
    /// Register `cameras`, each storing photos under `photos_dir/<id>`.
    ///
    /// Directories are created as needed.
    pub fn new(photos_dir: &Path, cameras: Vec<Arc<dyn Camera>>) -> Result<Self> {
        let mut registry = BTreeMap::new();
        for camera in cameras {
            let id = camera.id().to_string();
            let dir = photos_dir.join(&id);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create photo directory {}", dir.display()))?;
            debug!(camera = %id, dir = ?dir, "camera registered");

            let slot = CameraSlot {
                camera,
                dir,
                busy: Arc::new(Mutex::new(())),
            };
            if registry.insert(id.clone(), slot).is_some() {
                anyhow::bail!("camera {id:?} registered twice");
            }
        }
        Ok(Self { cameras: registry })
    }

    pub fn get(&self, id: &str) -> Result<&CameraSlot, CameraError> {
        self.cameras.get(id).ok_or(CameraError::NotFound)
    }

    /// All cameras, ordered by id.
    pub fn all(&self) -> impl Iterator<Item = &CameraSlot> {
        self.cameras.values()
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
