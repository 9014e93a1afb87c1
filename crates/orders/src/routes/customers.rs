//! Customer resources.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use orderly_kernel::{ApiJson, ApiResponse, AppError, AppResult, Paginated};
use tracing::info;

use super::Id;
use crate::models::CustomerData;
use crate::state::AppState;

/// List customers.
///
/// GET /api/v1/customers/
async fn list_customers(State(state): State<AppState>, page: Paginated) -> ApiResponse {
    let customers = state.link_all(state.store().customers());
    ApiResponse::Body(page.paginate(&customers).into_body("customers"))
}

/// GET /api/v1/customers/{id}
async fn get_customer(State(state): State<AppState>, Id(id): Id) -> AppResult<ApiResponse> {
    let customer = state.store().customer(id).ok_or_else(AppError::not_found)?;
    Ok(ApiResponse::resource(&state.link(customer)))
}

/// Create a customer.
///
/// POST /api/v1/customers/
async fn new_customer(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CustomerData>,
) -> AppResult<ApiResponse> {
    let customer = state.store().insert_customer(data.into_name()?);
    info!(customer_id = customer.id, "customer created");
    Ok(ApiResponse::created(&state.links().customer(customer.id)))
}

/// Replace a customer.
///
/// PUT /api/v1/customers/{id}
async fn edit_customer(
    State(state): State<AppState>,
    Id(id): Id,
    ApiJson(data): ApiJson<CustomerData>,
) -> AppResult<ApiResponse> {
    state.store().customer(id).ok_or_else(AppError::not_found)?;
    if !state.store().update_customer(id, data.into_name()?) {
        return Err(AppError::not_found());
    }
    Ok(ApiResponse::empty())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers/", get(list_customers).post(new_customer))
        .route("/customers/{id}", get(get_customer).put(edit_customer))
}
