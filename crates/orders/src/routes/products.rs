//! Product resources.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use orderly_kernel::{ApiJson, ApiResponse, AppError, AppResult, Paginated};
use tracing::info;

use super::Id;
use crate::models::ProductData;
use crate::state::AppState;

/// GET /api/v1/products/
async fn list_products(State(state): State<AppState>, page: Paginated) -> ApiResponse {
    let products = state.link_all(state.store().products());
    ApiResponse::Body(page.paginate(&products).into_body("products"))
}

/// GET /api/v1/products/{id}
async fn get_product(State(state): State<AppState>, Id(id): Id) -> AppResult<ApiResponse> {
    let product = state.store().product(id).ok_or_else(AppError::not_found)?;
    Ok(ApiResponse::resource(&state.link(product)))
}

/// POST /api/v1/products/
async fn new_product(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<ProductData>,
) -> AppResult<ApiResponse> {
    let product = state.store().insert_product(data.into_name()?);
    info!(product_id = product.id, "product created");
    Ok(ApiResponse::created(&state.links().product(product.id)))
}

/// PUT /api/v1/products/{id}
async fn edit_product(
    State(state): State<AppState>,
    Id(id): Id,
    ApiJson(data): ApiJson<ProductData>,
) -> AppResult<ApiResponse> {
    state.store().product(id).ok_or_else(AppError::not_found)?;
    if !state.store().update_product(id, data.into_name()?) {
        return Err(AppError::not_found());
    }
    Ok(ApiResponse::empty())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products/", get(list_products).post(new_product))
        .route("/products/{id}", get(get_product).put(edit_product))
}
