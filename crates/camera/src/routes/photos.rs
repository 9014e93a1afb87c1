//! Photo collections, single-shot captures and timelapses.
//!
//! Captures are slow, so both capture endpoints reserve the camera, start a
//! background task and answer 202 right away. A second capture request
//! while the camera is reserved gets 503.

use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use orderly_kernel::{ApiJson, ApiResponse, AppError, AppResult, Paginated};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::camera::{CameraError, Reservation};
use crate::resources::{PhotoResource, photo_url};
use crate::state::AppState;

/// Longest accepted timelapse.
pub const MAX_TIMELAPSE_PHOTOS: u64 = 100;

/// Longest accepted pause between timelapse shots, in seconds.
pub const MAX_TIMELAPSE_INTERVAL_SECS: f64 = 3600.0;

/// GET /cameras/{camid}/photos/
async fn list_photos(
    State(state): State<AppState>,
    Path(camid): Path<String>,
    page: Paginated,
) -> AppResult<ApiResponse> {
    let slot = state.cameras().get(&camid)?;
    let base = state.kernel().public_url();
    let photos: Vec<_> = slot
        .photos()
        .await?
        .into_iter()
        .map(|filename| PhotoResource::new(&camid, filename, base))
        .collect();
    Ok(ApiResponse::Body(page.paginate(&photos).into_body("photos")))
}

/// Serve a photo as JPEG.
///
/// GET /cameras/{camid}/photos/{filename}
async fn get_photo(
    State(state): State<AppState>,
    Path((camid, filename)): Path<(String, String)>,
) -> AppResult<Response> {
    let bytes = state.cameras().get(&camid)?.read_photo(&filename).await?;
    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"))],
        bytes,
    )
        .into_response())
}

/// Take a photo in the background.
///
/// POST /cameras/{camid}/photos/
async fn capture_photo(
    State(state): State<AppState>,
    Path(camid): Path<String>,
) -> AppResult<ApiResponse> {
    let reservation = state.cameras().get(&camid)?.reserve()?;
    let kernel = state.kernel().clone();

    Ok(state.kernel().start_task(async move {
        let filename = reservation.capture().await?;
        Ok::<_, AppError>(ApiResponse::created(&photo_url(
            kernel.public_url(),
            &camid,
            &filename,
        )))
    }))
}

#[derive(Debug, Deserialize)]
struct TimelapseData {
    count: Option<u64>,
    interval_secs: Option<f64>,
}

impl TimelapseData {
    fn validate(self) -> Result<(u64, Duration), AppError> {
        let invalid = |detail: &str| AppError::Validation(format!("Invalid timelapse: {detail}"));

        let count = self.count.ok_or_else(|| invalid("missing count"))?;
        if !(1..=MAX_TIMELAPSE_PHOTOS).contains(&count) {
            return Err(invalid(&format!(
                "count must be between 1 and {MAX_TIMELAPSE_PHOTOS}"
            )));
        }

        let interval = self.interval_secs.unwrap_or(0.0);
        if !interval.is_finite() || !(0.0..=MAX_TIMELAPSE_INTERVAL_SECS).contains(&interval) {
            return Err(invalid(&format!(
                "interval_secs must be between 0 and {MAX_TIMELAPSE_INTERVAL_SECS}"
            )));
        }

        Ok((count, Duration::from_secs_f64(interval)))
    }
}

/// Take `count` photos, `interval_secs` apart, in the background.
///
/// POST /cameras/{camid}/timelapse/
async fn start_timelapse(
    State(state): State<AppState>,
    Path(camid): Path<String>,
    ApiJson(data): ApiJson<TimelapseData>,
) -> AppResult<ApiResponse> {
    let slot = state.cameras().get(&camid)?;
    let (count, interval) = data.validate()?;
    let reservation = slot.reserve()?;
    let kernel = state.kernel().clone();

    info!(camera = %camid, count, interval_secs = interval.as_secs_f64(), "timelapse started");

    Ok(state.kernel().start_task(async move {
        let filenames = run_timelapse(&reservation, count, interval).await?;
        let photos: Vec<String> = filenames
            .iter()
            .map(|f| photo_url(kernel.public_url(), &camid, f))
            .collect();
        Ok::<_, AppError>(ApiResponse::WithStatus(
            StatusCode::CREATED,
            json!({ "photos": photos }),
        ))
    }))
}

async fn run_timelapse(
    reservation: &Reservation,
    count: u64,
    interval: Duration,
) -> Result<Vec<String>, CameraError> {
    let mut filenames = Vec::new();
    for shot in 0..count {
        if shot > 0 {
            tokio::time::sleep(interval).await;
        }
        filenames.push(reservation.capture().await?);
    }
    Ok(filenames)
}

/// DELETE /cameras/{camid}/photos/{filename}
async fn delete_photo(
    State(state): State<AppState>,
    Path((camid, filename)): Path<(String, String)>,
) -> AppResult<ApiResponse> {
    state.cameras().get(&camid)?.delete_photo(&filename).await?;
    Ok(ApiResponse::empty())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/cameras/{camid}/photos/",
            get(list_photos).post(capture_photo),
        )
        .route(
            "/cameras/{camid}/photos/{filename}",
            get(get_photo).delete(delete_photo),
        )
        .route("/cameras/{camid}/timelapse/", post(start_timelapse))
}
