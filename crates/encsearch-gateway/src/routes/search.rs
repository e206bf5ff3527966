//! Generic search endpoint.
//!
//! One handler serves every (field, operator) combination:
//!
//! - `GET /api/v1/customers/search/:field?value=...`
//! - `GET /api/v1/customers/search/:field/:operator?value=...`
//!
//! The field/operator descriptor table in the core decides which
//! combinations are valid, so adding a searchable field never adds a route.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use encsearch_core::{
    SearchField, SearchMode, SearchOperator, SearchRequest, SearchResponse, MAX_LIMIT,
};

use crate::error::AppError;
use crate::AppState;

/// Search routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/customers/search/:field", get(search_equality))
        .route(
            "/api/v1/customers/search/:field/:operator",
            get(search_with_operator),
        )
}

/// Query parameters shared by both route shapes.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Plaintext search value; the driver encrypts it in transit.
    pub value: String,
    /// "hybrid" (default) or "primary_only".
    pub mode: Option<String>,
    /// Maximum records to return (1..=10000, default 100).
    pub limit: Option<usize>,
}

async fn search_equality(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    execute(state, &field, None, params).await
}

async fn search_with_operator(
    State(state): State<AppState>,
    Path((field, operator)): Path<(String, String)>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    execute(state, &field, Some(&operator), params).await
}

async fn execute(
    state: AppState,
    field: &str,
    operator: Option<&str>,
    params: SearchParams,
) -> Result<Json<SearchResponse>, AppError> {
    let field: SearchField = field.parse()?;
    let operator: SearchOperator = match operator {
        Some(op) => op.parse()?,
        None => SearchOperator::Equality,
    };
    let mode: SearchMode = match params.mode.as_deref() {
        Some(mode) => mode.parse()?,
        None => SearchMode::Hybrid,
    };

    if let Some(limit) = params.limit {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
    }

    // Hold a request slot for the full duration when throttling is enabled.
    let _permit = match &state.limiter {
        Some(limiter) => Some(limiter.acquire().await?),
        None => None,
    };

    let mut request = SearchRequest::new(field, operator, params.value, mode);
    request.limit = params.limit;

    let response = state.service.execute(&request).await?;
    Ok(Json(response))
}
