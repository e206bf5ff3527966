//! JSON response types specific to the HTTP gateway.
//!
//! The search envelope itself ([`encsearch_core::SearchResponse`]) is
//! serialized directly; only gateway-local responses live here.

use serde::Serialize;

use encsearch_core::ThrottleStats;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" when both stores respond, "degraded" otherwise.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Whether the encrypted document store responds.
    pub primary_connected: bool,
    /// Whether the relational store responds.
    pub secondary_connected: bool,
    /// Record count in the document store.
    pub primary_records: u64,
    /// Limiter usage, when throttling is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle: Option<ThrottleStats>,
    pub timestamp: String,
}
