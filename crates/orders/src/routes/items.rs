//! Order line item resources.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use orderly_kernel::{ApiJson, ApiResponse, AppError, AppResult, Paginated};
use tracing::info;

use super::Id;
use crate::models::{ItemData, ItemFields};
use crate::state::AppState;

fn validate(state: &AppState, data: ItemData) -> AppResult<ItemFields> {
    data.validate(state.links(), |product_id| {
        state.store().product(product_id).is_some()
    })
}

/// GET /api/v1/orders/{id}/items/
async fn list_order_items(
    State(state): State<AppState>,
    Id(order_id): Id,
    page: Paginated,
) -> AppResult<ApiResponse> {
    state.store().order(order_id).ok_or_else(AppError::not_found)?;
    let items = state.link_all(state.store().order_items(order_id));
    Ok(ApiResponse::Body(page.paginate(&items).into_body("items")))
}

/// GET /api/v1/items/{id}
async fn get_item(State(state): State<AppState>, Id(id): Id) -> AppResult<ApiResponse> {
    let item = state.store().item(id).ok_or_else(AppError::not_found)?;
    Ok(ApiResponse::resource(&state.link(item)))
}

/// Add an item to an order.
///
/// POST /api/v1/orders/{id}/items/
async fn new_order_item(
    State(state): State<AppState>,
    Id(order_id): Id,
    ApiJson(data): ApiJson<ItemData>,
) -> AppResult<ApiResponse> {
    state.store().order(order_id).ok_or_else(AppError::not_found)?;
    let fields = validate(&state, data)?;
    let item = state
        .store()
        .insert_item(order_id, fields)
        .ok_or_else(AppError::not_found)?;
    info!(item_id = item.id, order_id, "item added");
    Ok(ApiResponse::created(&state.links().item(item.id)))
}

/// PUT /api/v1/items/{id}
async fn edit_item(
    State(state): State<AppState>,
    Id(id): Id,
    ApiJson(data): ApiJson<ItemData>,
) -> AppResult<ApiResponse> {
    state.store().item(id).ok_or_else(AppError::not_found)?;
    let fields = validate(&state, data)?;
    if !state.store().update_item(id, fields) {
        return Err(AppError::not_found());
    }
    Ok(ApiResponse::empty())
}

/// DELETE /api/v1/items/{id}
async fn delete_item(State(state): State<AppState>, Id(id): Id) -> AppResult<ApiResponse> {
    if !state.store().delete_item(id) {
        return Err(AppError::not_found());
    }
    Ok(ApiResponse::empty())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/orders/{id}/items/",
            get(list_order_items).post(new_order_item),
        )
        .route(
            "/items/{id}",
            get(get_item).put(edit_item).delete(delete_item),
        )
}
