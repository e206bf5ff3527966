//! encsearch core - query routing, normalization and benchmark aggregation
//! for encrypted dual-store search.
//!
//! The core is backend-agnostic: concrete store clients implement the
//! [`PrimaryStore`] and [`SecondaryStore`] seams and are injected into the
//! [`SearchService`].

pub mod error;
pub mod fields;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod report;
pub mod stats;
pub mod throttle;
pub mod validate;

pub use error::Error;
pub use fields::{build_query, field_spec, BackendQuery, FieldSpec, OperatorSpec};
pub use model::{
    Address, CustomerRecord, PerformanceMetrics, SearchField, SearchMode, SearchOperator,
    SearchRequest, SearchResponse, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use normalize::{normalize, BackendKind};
pub use orchestrator::{HealthStatus, PrimaryStore, SearchService, SecondaryStore};
pub use report::{
    ComparisonReport, ComparisonRow, OperationStatistics, ReportBuilder, TestOutcome, TestSummary,
};
pub use stats::{BenchmarkSample, BenchmarkStatistics};
pub use throttle::{RequestLimiter, RequestPermit, ThrottleStats};
pub use validate::{validate_result_count, CountValidation, STATUS_NA};
