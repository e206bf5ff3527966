//! Request and response data model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default result limit applied when a request does not specify one.
pub const DEFAULT_LIMIT: usize = 100;

/// Upper bound for caller-supplied result limits.
pub const MAX_LIMIT: usize = 10_000;

/// Searchable customer fields exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Email,
    Name,
    Phone,
    Category,
    Status,
}

impl SearchField {
    /// All searchable fields.
    pub const ALL: [SearchField; 5] = [
        SearchField::Email,
        SearchField::Name,
        SearchField::Phone,
        SearchField::Category,
        SearchField::Status,
    ];

    /// API name, as it appears in URL paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Email => "email",
            SearchField::Name => "name",
            SearchField::Phone => "phone",
            SearchField::Category => "category",
            SearchField::Status => "status",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(SearchField::Email),
            "name" => Ok(SearchField::Name),
            "phone" => Ok(SearchField::Phone),
            "category" => Ok(SearchField::Category),
            "status" => Ok(SearchField::Status),
            other => Err(Error::InvalidParameter {
                name: "field".to_string(),
                message: format!("unknown search field '{}'", other),
            }),
        }
    }
}

/// Supported search operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOperator {
    Equality,
    Prefix,
    Suffix,
    Substring,
}

impl SearchOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::Equality => "equality",
            SearchOperator::Prefix => "prefix",
            SearchOperator::Suffix => "suffix",
            SearchOperator::Substring => "substring",
        }
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equality" => Ok(SearchOperator::Equality),
            "prefix" => Ok(SearchOperator::Prefix),
            "suffix" => Ok(SearchOperator::Suffix),
            "substring" => Ok(SearchOperator::Substring),
            other => Err(Error::InvalidParameter {
                name: "operator".to_string(),
                message: format!("unknown operator '{}'", other),
            }),
        }
    }
}

/// Whether a request resolves through both stores or the primary store alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Encrypted identifier search on the primary store, batch record fetch
    /// from the secondary store.
    Hybrid,
    /// Search and decrypt entirely within the primary store.
    PrimaryOnly,
}

impl SearchMode {
    pub const ALL: [SearchMode; 2] = [SearchMode::Hybrid, SearchMode::PrimaryOnly];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Hybrid => "hybrid",
            SearchMode::PrimaryOnly => "primary_only",
        }
    }

    /// Human-readable label used in test and report names.
    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::Hybrid => "Hybrid",
            SearchMode::PrimaryOnly => "Primary-Only",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hybrid" => Ok(SearchMode::Hybrid),
            "primary_only" => Ok(SearchMode::PrimaryOnly),
            other => Err(Error::InvalidParameter {
                name: "mode".to_string(),
                message: format!("unknown mode '{}' (expected 'hybrid' or 'primary_only')", other),
            }),
        }
    }
}

/// A single search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub field: SearchField,
    pub operator: SearchOperator,
    pub value: String,
    pub mode: SearchMode,
    /// Maximum number of records to return. `None` means [`DEFAULT_LIMIT`].
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(
        field: SearchField,
        operator: SearchOperator,
        value: impl Into<String>,
        mode: SearchMode,
    ) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
            mode,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Effective result limit for this request.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// Postal address carried by every customer record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

/// Canonical customer record shape, identical for both backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Correlation identifier shared by both stores.
    pub customer_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub preferences: BTreeMap<String, serde_json::Value>,
    pub tier: String,
    pub loyalty_points: u64,
    pub last_purchase_date: String,
    pub lifetime_value: f64,
}

/// Per-request timing breakdown. Created once per request, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Time spent in the primary store. In primary-only mode this covers the
    /// combined search-and-decrypt round trip.
    pub primary_search_ms: f64,
    /// Time spent in the secondary store. Always zero in primary-only mode
    /// and when the identifier search came back empty.
    pub secondary_fetch_ms: f64,
    pub total_ms: f64,
    pub results_count: usize,
    pub mode: SearchMode,
}

/// Complete search response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<CustomerRecord>,
    pub metrics: PerformanceMetrics,
    pub timestamp: String,
}

impl SearchResponse {
    /// Wrap normalized records with their timing breakdown.
    ///
    /// `results_count` is always derived from the record list, so the
    /// envelope cannot disagree with its payload.
    pub fn wrap(
        data: Vec<CustomerRecord>,
        mode: SearchMode,
        primary_search_ms: f64,
        secondary_fetch_ms: f64,
        total_ms: f64,
    ) -> Self {
        let metrics = PerformanceMetrics {
            primary_search_ms,
            secondary_fetch_ms,
            total_ms,
            results_count: data.len(),
            mode,
        };
        Self {
            success: true,
            data,
            metrics,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_round_trips_through_str() {
        for field in SearchField::ALL {
            assert_eq!(field.as_str().parse::<SearchField>().unwrap(), field);
        }
    }

    #[test]
    fn unknown_field_is_a_parameter_error() {
        let err = "ssn".parse::<SearchField>().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn wrap_derives_results_count_from_data() {
        let records = vec![CustomerRecord::default(), CustomerRecord::default()];
        let response = SearchResponse::wrap(records, SearchMode::Hybrid, 1.0, 2.0, 3.5);
        assert!(response.success);
        assert_eq!(response.metrics.results_count, response.data.len());
        assert_eq!(response.metrics.mode, SearchMode::Hybrid);
    }

    #[test]
    fn zero_results_is_still_a_success_envelope() {
        let response = SearchResponse::wrap(vec![], SearchMode::PrimaryOnly, 4.0, 0.0, 4.2);
        assert!(response.success);
        assert_eq!(response.metrics.results_count, 0);
        assert_eq!(response.metrics.secondary_fetch_ms, 0.0);
    }
}
