//! Test outcome collection and cross-mode comparison reporting.
//!
//! The reporter emits plain serde data; rendering (HTML, console tables) is
//! the consumer's concern.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::model::SearchMode;
use crate::stats::BenchmarkStatistics;
use crate::throttle::ThrottleStats;
use crate::validate::CountValidation;

/// Outcome of one discrete functional test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Display name, unique per (operation, result size, mode).
    pub name: String,
    /// Base operation name shared across modes and result sizes.
    pub operation: String,
    /// Mode the test ran in; `None` for mode-less tests (health check).
    pub mode: Option<SearchMode>,
    /// Declared result-size variant, when the test pinned a limit.
    pub result_size: Option<usize>,
    pub passed: bool,
    /// Wall-clock duration observed by the test client.
    pub duration_ms: f64,
    pub results_count: Option<usize>,
    pub expected_count: Option<usize>,
    /// "NA" for the insufficient-data soft pass, a message on failure.
    pub status: Option<String>,
    /// Server-reported total latency, used by the comparison table.
    pub total_ms: Option<f64>,
    /// Whether this outcome may feed performance aggregation.
    pub countable: bool,
    pub timestamp: String,
}

impl TestOutcome {
    /// Build an outcome from a count validation plus timing data.
    #[allow(clippy::too_many_arguments)]
    pub fn from_validation(
        name: impl Into<String>,
        operation: impl Into<String>,
        mode: SearchMode,
        result_size: Option<usize>,
        validation: &CountValidation,
        results_count: usize,
        duration_ms: f64,
        total_ms: f64,
    ) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            mode: Some(mode),
            result_size,
            passed: validation.passed,
            duration_ms,
            results_count: Some(results_count),
            expected_count: result_size,
            status: validation.status.clone(),
            total_ms: Some(total_ms),
            countable: validation.countable,
            timestamp: now(),
        }
    }

    /// Build a failed outcome from an error message.
    pub fn failure(
        name: impl Into<String>,
        operation: impl Into<String>,
        mode: Option<SearchMode>,
        duration_ms: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            mode,
            result_size: None,
            passed: false,
            duration_ms,
            results_count: None,
            expected_count: None,
            status: Some(message.into()),
            total_ms: None,
            countable: false,
            timestamp: now(),
        }
    }

    /// Build a passed outcome with no count expectation (e.g. health check).
    pub fn success(
        name: impl Into<String>,
        operation: impl Into<String>,
        mode: Option<SearchMode>,
        duration_ms: f64,
    ) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            mode,
            result_size: None,
            passed: true,
            duration_ms,
            results_count: None,
            expected_count: None,
            status: None,
            total_ms: None,
            countable: false,
            timestamp: now(),
        }
    }
}

/// Aggregate pass/fail counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub total_duration_ms: f64,
}

/// Benchmark statistics for one operation across both modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationStatistics {
    pub operation: String,
    pub hybrid: Option<BenchmarkStatistics>,
    pub primary_only: Option<BenchmarkStatistics>,
}

/// One row of the cross-mode comparison table.
///
/// `diff_ms` is `primary_only_ms - hybrid_ms`; positive means the
/// primary-only mode is slower. It is present only when both modes produced
/// a countable sample for the same (operation, result-size) pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub operation: String,
    pub result_size: Option<usize>,
    pub hybrid_ms: Option<f64>,
    pub primary_only_ms: Option<f64>,
    pub diff_ms: Option<f64>,
}

impl ComparisonRow {
    pub fn has_data(&self) -> bool {
        self.diff_ms.is_some()
    }
}

/// Final report handed to the external renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: String,
    pub summary: TestSummary,
    pub outcomes: Vec<TestOutcome>,
    pub statistics: Vec<OperationStatistics>,
    pub comparisons: Vec<ComparisonRow>,
    pub throttle: Option<ThrottleStats>,
}

/// Collects outcomes and benchmark statistics, then aggregates them.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    outcomes: Vec<TestOutcome>,
    benchmarks: Vec<BenchmarkStatistics>,
    throttle: Option<ThrottleStats>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_outcome(&mut self, outcome: TestOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn add_statistics(&mut self, stats: BenchmarkStatistics) {
        self.benchmarks.push(stats);
    }

    pub fn set_throttle_stats(&mut self, stats: ThrottleStats) {
        self.throttle = Some(stats);
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Aggregate everything collected so far into the final report.
    pub fn build(self) -> ComparisonReport {
        let summary = summarize(&self.outcomes);
        let statistics = group_statistics(&self.benchmarks);
        let comparisons = build_comparisons(&self.outcomes);

        ComparisonReport {
            generated_at: now(),
            summary,
            outcomes: self.outcomes,
            statistics,
            comparisons,
            throttle: self.throttle,
        }
    }
}

fn summarize(outcomes: &[TestOutcome]) -> TestSummary {
    let total = outcomes.len();
    let passed = outcomes.iter().filter(|o| o.passed).count();
    let failed = total - passed;
    let pass_rate = if total > 0 {
        passed as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let total_duration_ms = outcomes.iter().map(|o| o.duration_ms).sum();

    TestSummary {
        total,
        passed,
        failed,
        pass_rate,
        total_duration_ms,
    }
}

fn group_statistics(benchmarks: &[BenchmarkStatistics]) -> Vec<OperationStatistics> {
    let mut grouped: BTreeMap<String, OperationStatistics> = BTreeMap::new();
    for stats in benchmarks {
        let entry = grouped
            .entry(stats.operation.clone())
            .or_insert_with(|| OperationStatistics {
                operation: stats.operation.clone(),
                hybrid: None,
                primary_only: None,
            });
        match stats.mode {
            SearchMode::Hybrid => entry.hybrid = Some(stats.clone()),
            SearchMode::PrimaryOnly => entry.primary_only = Some(stats.clone()),
        }
    }
    grouped.into_values().collect()
}

fn build_comparisons(outcomes: &[TestOutcome]) -> Vec<ComparisonRow> {
    // Key: (operation, result size). NA and failed outcomes contribute no
    // timing, so a key missing one mode renders as a "no data" row.
    let mut keyed: BTreeMap<(String, Option<usize>), (Option<f64>, Option<f64>)> = BTreeMap::new();

    for outcome in outcomes {
        let Some(mode) = outcome.mode else { continue };
        let key = (outcome.operation.clone(), outcome.result_size);
        let entry = keyed.entry(key).or_default();

        let timing = if outcome.passed && outcome.countable {
            outcome.total_ms
        } else {
            None
        };
        match mode {
            SearchMode::Hybrid => entry.0 = entry.0.or(timing),
            SearchMode::PrimaryOnly => entry.1 = entry.1.or(timing),
        }
    }

    keyed
        .into_iter()
        .map(|((operation, result_size), (hybrid_ms, primary_only_ms))| {
            let diff_ms = match (hybrid_ms, primary_only_ms) {
                (Some(h), Some(p)) => Some(p - h),
                _ => None,
            };
            ComparisonRow {
                operation,
                result_size,
                hybrid_ms,
                primary_only_ms,
                diff_ms,
            }
        })
        .collect()
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
