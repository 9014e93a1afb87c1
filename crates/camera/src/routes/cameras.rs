//! Camera resources.

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;
use orderly_kernel::{ApiResponse, AppResult, Paginated};

use crate::resources::CameraResource;
use crate::state::AppState;

/// List available cameras.
///
/// GET /cameras/
async fn list_cameras(State(state): State<AppState>, page: Paginated) -> ApiResponse {
    let base = state.kernel().public_url();
    let cameras: Vec<_> = state
        .cameras()
        .all()
        .map(|slot| CameraResource::new(slot, base))
        .collect();
    ApiResponse::Body(page.paginate(&cameras).into_body("cameras"))
}

/// GET /cameras/{camid}
async fn get_camera(
    State(state): State<AppState>,
    Path(camid): Path<String>,
) -> AppResult<ApiResponse> {
    let slot = state.cameras().get(&camid)?;
    Ok(ApiResponse::resource(&CameraResource::new(
        slot,
        state.kernel().public_url(),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cameras/", get(list_cameras))
        .route("/cameras/{camid}", get(get_camera))
}
