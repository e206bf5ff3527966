//! Functional and performance test runner for the encsearch gateway.
//!
//! Everything here talks to a running gateway over HTTP; no store access.
//! The suite collects [`encsearch_core::TestOutcome`]s and benchmark
//! statistics into a [`encsearch_core::ComparisonReport`].

pub mod client;
pub mod pool;
pub mod runner;
pub mod suite;

pub use client::{ApiClient, BenchError, HealthSnapshot};
pub use pool::{PoolKey, SamplePool};
pub use runner::{operations, OperationConfig, ValueRule};
