//! Direct customer lookup endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use encsearch_core::CustomerRecord;

use crate::error::AppError;
use crate::AppState;

/// Customer lookup routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/customers/:customer_id", get(get_customer))
}

/// Fetch one customer by correlation identifier, straight from the
/// relational store (no encrypted search involved).
async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerRecord>, AppError> {
    let record = state.service.get_customer(&customer_id).await?;
    Ok(Json(record))
}
