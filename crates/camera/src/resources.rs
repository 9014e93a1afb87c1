//! JSON projections of cameras and photos.

use orderly_kernel::{PublicUrl, Resource};
use serde_json::{Value, json};

use crate::camera::CameraSlot;

pub const CAMERAS_PATH: &str = "/cameras";

pub fn camera_url(base: &PublicUrl, camid: &str) -> String {
    base.join(&format!("{CAMERAS_PATH}/{camid}"))
}

pub fn photos_url(base: &PublicUrl, camid: &str) -> String {
    base.join(&format!("{CAMERAS_PATH}/{camid}/photos/"))
}

pub fn photo_url(base: &PublicUrl, camid: &str, filename: &str) -> String {
    base.join(&format!("{CAMERAS_PATH}/{camid}/photos/{filename}"))
}

/// A camera as exposed by the API.
#[derive(Debug, Clone)]
pub struct CameraResource {
    pub id: String,
    pub emulated: bool,
    base: PublicUrl,
}

impl CameraResource {
    pub fn new(slot: &CameraSlot, base: &PublicUrl) -> Self {
        Self {
            id: slot.id().to_string(),
            emulated: slot.is_emulated(),
            base: base.clone(),
        }
    }
}

impl Resource for CameraResource {
    fn url(&self) -> String {
        camera_url(&self.base, &self.id)
    }

    fn export_data(&self) -> Value {
        json!({
            "self_url": self.url(),
            "photos_url": photos_url(&self.base, &self.id),
            "emulated": self.emulated,
        })
    }
}

/// A stored photo.
#[derive(Debug, Clone)]
pub struct PhotoResource {
    pub camid: String,
    pub filename: String,
    base: PublicUrl,
}

impl PhotoResource {
    pub fn new(camid: &str, filename: String, base: &PublicUrl) -> Self {
        Self {
            camid: camid.to_string(),
            filename,
            base: base.clone(),
        }
    }
}

impl Resource for PhotoResource {
    fn url(&self) -> String {
        photo_url(&self.base, &self.camid, &self.filename)
    }

    fn export_data(&self) -> Value {
        json!({"self_url": self.url(), "filename": self.filename})
    }
}
