//! Dual-backend search orchestration.
//!
//! A request resolves in one of two modes:
//!
//! - **Hybrid**: identifier-only search on the primary encrypted store,
//!   then one batch record fetch from the secondary relational store. The
//!   secondary store is never contacted when the identifier search comes
//!   back empty.
//! - **Primary-only**: one search-and-decrypt round trip against the
//!   primary store.
//!
//! The two stages of a hybrid request run strictly sequentially; the
//! secondary fetch starts only after the primary search has returned a
//! non-empty identifier list.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Error;
use crate::fields::{build_query, BackendQuery};
use crate::model::{CustomerRecord, SearchRequest, SearchResponse};
use crate::model::SearchMode;
use crate::normalize::{normalize, BackendKind};

/// Primary encrypted-search store seam.
///
/// Implementations issue predicate queries built by the field mapper and
/// return plaintext-shaped results; key lifecycle is not managed here.
#[async_trait]
pub trait PrimaryStore: Send + Sync {
    /// Search for matching records, projecting only the correlation
    /// identifier. The store applies `limit` natively.
    async fn search_ids(&self, query: &BackendQuery, limit: usize) -> Result<Vec<String>, Error>;

    /// Search for matching records and return them fully decrypted.
    async fn search_records(&self, query: &BackendQuery, limit: usize)
        -> Result<Vec<Value>, Error>;

    /// Connectivity probe.
    async fn ping(&self) -> Result<(), Error>;

    /// Total number of stored records.
    async fn count(&self) -> Result<u64, Error>;
}

/// Secondary relational store seam.
#[async_trait]
pub trait SecondaryStore: Send + Sync {
    /// Batch-fetch full records for an identifier list in a single query.
    ///
    /// Implementations must roll back any transactional state on failure;
    /// a partial fetch is never surfaced as success.
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Value>, Error>;

    /// Connectivity probe.
    async fn ping(&self) -> Result<(), Error>;
}

/// Backend connectivity snapshot for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub primary_connected: bool,
    pub secondary_connected: bool,
    /// Record count in the primary store, when reachable.
    pub primary_records: u64,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.primary_connected && self.secondary_connected
    }
}

/// Executes search requests against an explicitly injected store bundle.
#[derive(Clone)]
pub struct SearchService {
    primary: Arc<dyn PrimaryStore>,
    secondary: Arc<dyn SecondaryStore>,
}

impl SearchService {
    pub fn new(primary: Arc<dyn PrimaryStore>, secondary: Arc<dyn SecondaryStore>) -> Self {
        Self { primary, secondary }
    }

    /// Execute one search request end to end: build the backend query,
    /// dispatch per mode, normalize, and attach the timing breakdown.
    pub async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse, Error> {
        let started = Instant::now();
        let query = build_query(request.field, request.operator, &request.value)?;
        let limit = request.effective_limit();

        info!(
            field = %request.field,
            operator = %request.operator,
            mode = %request.mode,
            limit,
            "executing search"
        );

        match request.mode {
            SearchMode::PrimaryOnly => self.execute_primary_only(request, &query, limit, started).await,
            SearchMode::Hybrid => self.execute_hybrid(request, &query, limit, started).await,
        }
    }

    async fn execute_primary_only(
        &self,
        request: &SearchRequest,
        query: &BackendQuery,
        limit: usize,
        started: Instant,
    ) -> Result<SearchResponse, Error> {
        let search_started = Instant::now();
        let raw = self.primary.search_records(query, limit).await?;
        let search_ms = elapsed_ms(search_started);

        let mut records = normalize_all(&raw, BackendKind::Document);
        records.truncate(limit);

        info!(
            results = records.len(),
            search_ms, "primary-only search complete"
        );
        Ok(SearchResponse::wrap(
            records,
            request.mode,
            search_ms,
            0.0,
            elapsed_ms(started),
        ))
    }

    async fn execute_hybrid(
        &self,
        request: &SearchRequest,
        query: &BackendQuery,
        limit: usize,
        started: Instant,
    ) -> Result<SearchResponse, Error> {
        let search_started = Instant::now();
        let ids = self.primary.search_ids(query, limit).await?;
        let search_ms = elapsed_ms(search_started);

        // Short-circuit: no identifiers, no secondary round trip.
        if ids.is_empty() {
            info!(search_ms, "identifier search returned nothing");
            return Ok(SearchResponse::wrap(
                vec![],
                request.mode,
                search_ms,
                0.0,
                elapsed_ms(started),
            ));
        }

        let fetch_started = Instant::now();
        let raw = self
            .secondary
            .fetch_by_ids(&ids)
            .await
            .map_err(|e| Error::PartialFetch(e.to_string()))?;
        let fetch_ms = elapsed_ms(fetch_started);

        let mut records = normalize_all(&raw, BackendKind::Relational);
        records.truncate(limit);

        info!(
            ids = ids.len(),
            results = records.len(),
            search_ms,
            fetch_ms,
            "hybrid search complete"
        );
        Ok(SearchResponse::wrap(
            records,
            request.mode,
            search_ms,
            fetch_ms,
            elapsed_ms(started),
        ))
    }

    /// Fetch one record by its correlation identifier, straight from the
    /// secondary store.
    pub async fn get_customer(&self, customer_id: &str) -> Result<CustomerRecord, Error> {
        let ids = [customer_id.to_string()];
        let raw = self.secondary.fetch_by_ids(&ids).await?;
        raw.first()
            .and_then(|value| normalize(value, BackendKind::Relational).ok())
            .ok_or(Error::NotFound)
    }

    /// Probe both stores.
    pub async fn health(&self) -> HealthStatus {
        let primary_connected = self.primary.ping().await.is_ok();
        let secondary_connected = self.secondary.ping().await.is_ok();
        let primary_records = if primary_connected {
            self.primary.count().await.unwrap_or(0)
        } else {
            0
        };

        HealthStatus {
            primary_connected,
            secondary_connected,
            primary_records,
        }
    }
}

fn normalize_all(raw: &[Value], kind: BackendKind) -> Vec<CustomerRecord> {
    raw.iter()
        .filter_map(|value| match normalize(value, kind) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(%err, "skipping malformed record");
                None
            }
        })
        .collect()
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SearchField, SearchOperator};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn doc(id: &str) -> Value {
        json!({
            "record_id": id,
            "searchable_name": "Test User",
            "searchable_email": "test@example.com",
            "searchable_phone": "+1-555-0101",
            "address": {"street": "1 Main St", "city": "X", "state": "Y", "zip_code": "0"},
            "preferences": {"k": "v"},
            "metadata": {"tier": "gold", "loyalty_points": 1, "last_purchase_date": "2026-01-01", "lifetime_value": 1.0}
        })
    }

    fn row(id: &str) -> Value {
        json!({
            "customer_id": id,
            "full_name": "Test User",
            "email": "test@example.com",
            "phone": "+1-555-0101",
            "address": {"street": "1 Main St", "city": "X", "state": "Y", "zip_code": "0"},
            "preferences": {"k": "v"},
            "tier": "gold",
            "loyalty_points": 1,
            "last_purchase_date": "2026-01-01",
            "lifetime_value": 1.0
        })
    }

    #[derive(Default)]
    struct MockPrimary {
        ids: Vec<String>,
        searches: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PrimaryStore for MockPrimary {
        async fn search_ids(
            &self,
            _query: &BackendQuery,
            limit: usize,
        ) -> Result<Vec<String>, Error> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Primary("boom".into()));
            }
            Ok(self.ids.iter().take(limit).cloned().collect())
        }

        async fn search_records(
            &self,
            _query: &BackendQuery,
            limit: usize,
        ) -> Result<Vec<Value>, Error> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Primary("boom".into()));
            }
            Ok(self.ids.iter().take(limit).map(|id| doc(id)).collect())
        }

        async fn ping(&self) -> Result<(), Error> {
            Ok(())
        }

        async fn count(&self) -> Result<u64, Error> {
            Ok(self.ids.len() as u64)
        }
    }

    #[derive(Default)]
    struct MockSecondary {
        fetches: AtomicUsize,
        fail: bool,
        empty: bool,
    }

    #[async_trait]
    impl SecondaryStore for MockSecondary {
        async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Value>, Error> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Secondary("db down".into()));
            }
            if self.empty {
                return Ok(vec![]);
            }
            Ok(ids.iter().map(|id| row(id)).collect())
        }

        async fn ping(&self) -> Result<(), Error> {
            Ok(())
        }
    }

    fn service(primary: MockPrimary, secondary: MockSecondary) -> (SearchService, Arc<MockPrimary>, Arc<MockSecondary>) {
        let primary = Arc::new(primary);
        let secondary = Arc::new(secondary);
        (
            SearchService::new(primary.clone(), secondary.clone()),
            primary,
            secondary,
        )
    }

    fn phone_request(mode: SearchMode) -> SearchRequest {
        SearchRequest::new(SearchField::Phone, SearchOperator::Equality, "+1-555-0101", mode)
    }

    #[tokio::test]
    async fn hybrid_correlates_ids_between_stores() {
        let (svc, _, secondary) = service(
            MockPrimary {
                ids: vec!["a".into(), "b".into()],
                ..Default::default()
            },
            MockSecondary::default(),
        );

        let response = svc.execute(&phone_request(SearchMode::Hybrid)).await.unwrap();
        assert_eq!(response.metrics.results_count, 2);
        let returned: Vec<_> = response.data.iter().map(|r| r.customer_id.as_str()).collect();
        assert_eq!(returned, vec!["a", "b"]);
        assert_eq!(secondary.fetches.load(Ordering::SeqCst), 1);
        assert!(response.metrics.secondary_fetch_ms >= 0.0);
    }

    #[tokio::test]
    async fn empty_identifier_search_short_circuits() {
        let (svc, _, secondary) = service(MockPrimary::default(), MockSecondary::default());

        let response = svc.execute(&phone_request(SearchMode::Hybrid)).await.unwrap();
        assert!(response.success);
        assert_eq!(response.metrics.results_count, 0);
        assert_eq!(response.metrics.secondary_fetch_ms, 0.0);
        assert_eq!(secondary.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn primary_only_never_touches_secondary() {
        let (svc, _, secondary) = service(
            MockPrimary {
                ids: vec!["a".into()],
                ..Default::default()
            },
            MockSecondary::default(),
        );

        let response = svc
            .execute(&phone_request(SearchMode::PrimaryOnly))
            .await
            .unwrap();
        assert_eq!(response.metrics.results_count, 1);
        assert_eq!(response.metrics.secondary_fetch_ms, 0.0);
        assert_eq!(secondary.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn limit_is_never_exceeded() {
        let ids: Vec<String> = (0..20).map(|i| format!("id-{i}")).collect();
        let (svc, _, _) = service(
            MockPrimary {
                ids,
                ..Default::default()
            },
            MockSecondary::default(),
        );

        let request = phone_request(SearchMode::Hybrid).with_limit(5);
        let response = svc.execute(&request).await.unwrap();
        assert_eq!(response.metrics.results_count, 5);
    }

    #[tokio::test]
    async fn secondary_failure_after_ids_is_fatal() {
        let (svc, _, _) = service(
            MockPrimary {
                ids: vec!["a".into()],
                ..Default::default()
            },
            MockSecondary {
                fail: true,
                ..Default::default()
            },
        );

        let err = svc.execute(&phone_request(SearchMode::Hybrid)).await.unwrap_err();
        assert!(matches!(err, Error::PartialFetch(_)));
    }

    #[tokio::test]
    async fn primary_failure_is_fatal() {
        let (svc, _, secondary) = service(
            MockPrimary {
                fail: true,
                ..Default::default()
            },
            MockSecondary::default(),
        );

        let err = svc.execute(&phone_request(SearchMode::Hybrid)).await.unwrap_err();
        assert!(matches!(err, Error::Primary(_)));
        assert_eq!(secondary.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn configuration_error_rejected_before_any_backend_call() {
        let (svc, primary, secondary) = service(MockPrimary::default(), MockSecondary::default());

        let request = SearchRequest::new(
            SearchField::Phone,
            SearchOperator::Substring,
            "55",
            SearchMode::Hybrid,
        );
        let err = svc.execute(&request).await.unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(primary.searches.load(Ordering::SeqCst), 0);
        assert_eq!(secondary.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_customer_fetches_by_identifier() {
        let (svc, _, _) = service(MockPrimary::default(), MockSecondary::default());

        let record = svc.get_customer("a").await.unwrap();
        assert_eq!(record.customer_id, "a");
    }

    #[tokio::test]
    async fn get_customer_maps_missing_row_to_not_found() {
        let (svc, _, _) = service(
            MockPrimary::default(),
            MockSecondary {
                empty: true,
                ..Default::default()
            },
        );

        let err = svc.get_customer("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }
}
