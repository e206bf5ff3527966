//! encsearch HTTP/REST gateway.
//!
//! Exposes the dual-store customer search over HTTP. All state is injected
//! at startup; the gateway owns no connections of its own.

pub mod config;
pub mod error;
pub mod json;
pub mod routes;

pub use config::{Args, GatewayConfig};
pub use error::AppError;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use encsearch_core::{RequestLimiter, SearchService};

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Search orchestrator over the injected store bundle.
    pub service: Arc<SearchService>,
    /// Optional bounded-concurrency limiter.
    pub limiter: Option<Arc<RequestLimiter>>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        service: SearchService,
        limiter: Option<RequestLimiter>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            service: Arc::new(service),
            limiter: limiter.map(Arc::new),
            config,
        }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .merge(routes::health::routes())
        .merge(routes::search::routes())
        .merge(routes::customers::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// API root: name, version and endpoint listing.
async fn index() -> Json<Value> {
    Json(json!({
        "name": "encsearch gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "search": "/api/v1/customers/search/{field}?value=&mode=&limit=",
            "search_with_operator": "/api/v1/customers/search/{field}/{operator}?value=&mode=&limit=",
            "get_by_id": "/api/v1/customers/{customer_id}",
            "health": "/health",
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use encsearch_core::{
        BackendQuery, Error, PrimaryStore, SearchResponse, SecondaryStore,
    };

    struct StubPrimary {
        ids: Vec<String>,
    }

    #[async_trait]
    impl PrimaryStore for StubPrimary {
        async fn search_ids(
            &self,
            _query: &BackendQuery,
            limit: usize,
        ) -> Result<Vec<String>, Error> {
            Ok(self.ids.iter().take(limit).cloned().collect())
        }

        async fn search_records(
            &self,
            _query: &BackendQuery,
            limit: usize,
        ) -> Result<Vec<Value>, Error> {
            Ok(self.ids.iter().take(limit).map(|id| doc(id)).collect())
        }

        async fn ping(&self) -> Result<(), Error> {
            Ok(())
        }

        async fn count(&self) -> Result<u64, Error> {
            Ok(self.ids.len() as u64)
        }
    }

    struct StubSecondary {
        found: bool,
    }

    #[async_trait]
    impl SecondaryStore for StubSecondary {
        async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Value>, Error> {
            if !self.found {
                return Ok(vec![]);
            }
            Ok(ids.iter().map(|id| row(id)).collect())
        }

        async fn ping(&self) -> Result<(), Error> {
            Ok(())
        }
    }

    fn doc(id: &str) -> Value {
        json!({
            "record_id": id,
            "searchable_name": "Test User",
            "searchable_email": "test@example.com",
            "searchable_phone": "+1-555-0101",
        })
    }

    fn row(id: &str) -> Value {
        json!({
            "customer_id": id,
            "full_name": "Test User",
            "email": "test@example.com",
            "phone": "+1-555-0101",
        })
    }

    fn server(ids: &[&str], found: bool) -> TestServer {
        let service = SearchService::new(
            Arc::new(StubPrimary {
                ids: ids.iter().map(|id| id.to_string()).collect(),
            }),
            Arc::new(StubSecondary { found }),
        );
        let state = AppState::new(service, None, GatewayConfig::default());
        TestServer::new(create_router(state)).unwrap()
    }

    #[tokio::test]
    async fn search_returns_the_response_envelope() {
        let server = server(&["a", "b"], true);

        let res = server
            .get("/api/v1/customers/search/phone")
            .add_query_param("value", "+1-555-0101")
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let body: SearchResponse = res.json();
        assert!(body.success);
        assert_eq!(body.metrics.results_count, 2);
        assert_eq!(body.data[0].customer_id, "a");
    }

    #[tokio::test]
    async fn out_of_range_limits_are_rejected() {
        let server = server(&["a"], true);

        for limit in ["0", "10001"] {
            let res = server
                .get("/api/v1/customers/search/phone")
                .add_query_param("value", "+1-555-0101")
                .add_query_param("limit", limit)
                .await;
            assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn unknown_field_is_a_bad_request() {
        let server = server(&["a"], true);

        let res = server
            .get("/api/v1/customers/search/ssn")
            .add_query_param("value", "123")
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

        let body: Value = res.json();
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn unsupported_operator_pair_is_a_bad_request() {
        let server = server(&["a"], true);

        let res = server
            .get("/api/v1/customers/search/phone/substring")
            .add_query_param("value", "55")
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_customer_is_not_found() {
        let server = server(&[], false);

        let res = server.get("/api/v1/customers/nope").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let body: Value = res.json();
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn health_reports_record_count() {
        let server = server(&["a", "b"], true);

        let res = server.get("/health").await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let body: Value = res.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["primary_records"], 2);
    }
}
