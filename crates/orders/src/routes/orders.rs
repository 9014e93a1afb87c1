//! Order resources, globally and per customer.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use orderly_kernel::{ApiJson, ApiResponse, AppError, AppResult, Paginated};
use tracing::info;

use super::Id;
use crate::models::OrderData;
use crate::state::AppState;

/// GET /api/v1/orders/
async fn list_orders(State(state): State<AppState>, page: Paginated) -> ApiResponse {
    let orders = state.link_all(state.store().orders());
    ApiResponse::Body(page.paginate(&orders).into_body("orders"))
}

/// GET /api/v1/customers/{id}/orders/
async fn list_customer_orders(
    State(state): State<AppState>,
    Id(customer_id): Id,
    page: Paginated,
) -> AppResult<ApiResponse> {
    state
        .store()
        .customer(customer_id)
        .ok_or_else(AppError::not_found)?;
    let orders = state.link_all(state.store().customer_orders(customer_id));
    Ok(ApiResponse::Body(page.paginate(&orders).into_body("orders")))
}

/// GET /api/v1/orders/{id}
async fn get_order(State(state): State<AppState>, Id(id): Id) -> AppResult<ApiResponse> {
    let order = state.store().order(id).ok_or_else(AppError::not_found)?;
    Ok(ApiResponse::resource(&state.link(order)))
}

/// Place an order for a customer.
///
/// POST /api/v1/customers/{id}/orders/
async fn new_customer_order(
    State(state): State<AppState>,
    Id(customer_id): Id,
    ApiJson(data): ApiJson<OrderData>,
) -> AppResult<ApiResponse> {
    state
        .store()
        .customer(customer_id)
        .ok_or_else(AppError::not_found)?;
    let date = data.into_date()?;
    let order = state
        .store()
        .insert_order(customer_id, date)
        .ok_or_else(AppError::not_found)?;
    info!(order_id = order.id, customer_id, "order created");
    Ok(ApiResponse::created(&state.links().order(order.id)))
}

/// PUT /api/v1/orders/{id}
async fn edit_order(
    State(state): State<AppState>,
    Id(id): Id,
    ApiJson(data): ApiJson<OrderData>,
) -> AppResult<ApiResponse> {
    state.store().order(id).ok_or_else(AppError::not_found)?;
    if !state.store().update_order(id, data.into_date()?) {
        return Err(AppError::not_found());
    }
    Ok(ApiResponse::empty())
}

/// Delete an order together with its items.
///
/// DELETE /api/v1/orders/{id}
async fn delete_order(State(state): State<AppState>, Id(id): Id) -> AppResult<ApiResponse> {
    if !state.store().delete_order(id) {
        return Err(AppError::not_found());
    }
    info!(order_id = id, "order deleted");
    Ok(ApiResponse::empty())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders/", get(list_orders))
        .route(
            "/customers/{id}/orders/",
            get(list_customer_orders).post(new_customer_order),
        )
        .route(
            "/orders/{id}",
            get(get_order).put(edit_order).delete(delete_order),
        )
}
