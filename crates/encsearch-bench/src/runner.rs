//! Performance benchmark runner.
//!
//! Runs the full operation catalog in both modes, collecting client-observed
//! latencies into [`BenchmarkSample`]s. Iterations are spaced out so the
//! gateway is measured at a steady trickle, not hammered; the spacing never
//! counts toward a latency. Failed iterations are logged and excluded from
//! the sample.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use encsearch_core::{
    BenchmarkSample, BenchmarkStatistics, ReportBuilder, SearchField, SearchMode, SearchOperator,
    SearchResponse,
};

use crate::client::ApiClient;
use crate::pool::{PoolKey, SamplePool};

/// Pause between benchmark iterations.
pub const ITERATION_DELAY: Duration = Duration::from_millis(50);

/// How a pooled value is reshaped before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// Send the pooled value unchanged.
    AsIs,
    /// Last whitespace token, clamped to the substring operator maximum.
    LastWord,
    /// First four characters.
    ShortPrefix,
}

/// One benchmarked operation: a (field, operator) pairing plus where its
/// values come from.
#[derive(Debug, Clone, Copy)]
pub struct OperationConfig {
    pub name: &'static str,
    pub field: SearchField,
    pub operator: SearchOperator,
    pub pool: PoolKey,
    pub rule: ValueRule,
}

impl OperationConfig {
    /// Resolve the search value for one iteration.
    pub fn value_for(
        &self,
        pool: &SamplePool,
        iteration: usize,
        iterations: usize,
    ) -> Option<String> {
        let base = pool.value_for(self.pool, iteration, iterations)?;
        let value = match self.rule {
            ValueRule::AsIs => base.to_string(),
            ValueRule::LastWord => base.split_whitespace().last()?.chars().take(10).collect(),
            ValueRule::ShortPrefix => base.chars().take(4).collect(),
        };
        (value.chars().count() >= 2).then_some(value)
    }
}

/// The benchmarked operation catalog. Every supported (field, operator)
/// pairing appears once, plus the two reshaped name variants.
pub fn operations() -> Vec<OperationConfig> {
    use SearchOperator::{Equality, Prefix, Substring};

    vec![
        OperationConfig {
            name: "Phone Search",
            field: SearchField::Phone,
            operator: Equality,
            pool: PoolKey::Phones,
            rule: ValueRule::AsIs,
        },
        OperationConfig {
            name: "Email Search",
            field: SearchField::Email,
            operator: Equality,
            pool: PoolKey::Emails,
            rule: ValueRule::AsIs,
        },
        OperationConfig {
            name: "Name Search",
            field: SearchField::Name,
            operator: Equality,
            pool: PoolKey::Names,
            rule: ValueRule::AsIs,
        },
        OperationConfig {
            name: "Category Search",
            field: SearchField::Category,
            operator: Equality,
            pool: PoolKey::Categories,
            rule: ValueRule::AsIs,
        },
        OperationConfig {
            name: "Status Search",
            field: SearchField::Status,
            operator: Equality,
            pool: PoolKey::Statuses,
            rule: ValueRule::AsIs,
        },
        OperationConfig {
            name: "Email Prefix Search",
            field: SearchField::Email,
            operator: Prefix,
            pool: PoolKey::EmailPrefixes,
            rule: ValueRule::AsIs,
        },
        OperationConfig {
            name: "Name Substring Search",
            field: SearchField::Name,
            operator: Substring,
            pool: PoolKey::NameSubstrings,
            rule: ValueRule::AsIs,
        },
        OperationConfig {
            name: "Last Name Search",
            field: SearchField::Name,
            operator: Substring,
            pool: PoolKey::Names,
            rule: ValueRule::LastWord,
        },
        OperationConfig {
            name: "Partial Name Match",
            field: SearchField::Name,
            operator: Substring,
            pool: PoolKey::NameSubstrings,
            rule: ValueRule::ShortPrefix,
        },
    ]
}

/// Run the whole catalog in both modes, feeding statistics into the report.
pub async fn run_performance_suite(
    client: &ApiClient,
    pool: &SamplePool,
    iterations: usize,
    builder: &mut ReportBuilder,
) {
    for mode in SearchMode::ALL {
        info!(mode = mode.label(), "Benchmarking all operations");
        for op in operations() {
            match run_operation(client, pool, &op, mode, iterations).await {
                Some(stats) => {
                    info!(
                        operation = op.name,
                        mode = mode.label(),
                        avg_ms = format!("{:.2}", stats.average),
                        median_ms = format!("{:.2}", stats.median),
                        samples = stats.sample_count,
                        "Operation benchmarked"
                    );
                    builder.add_statistics(stats);
                }
                None => warn!(
                    operation = op.name,
                    mode = mode.label(),
                    "No successful iterations, operation skipped"
                ),
            }
        }
    }
}

async fn run_operation(
    client: &ApiClient,
    pool: &SamplePool,
    op: &OperationConfig,
    mode: SearchMode,
    iterations: usize,
) -> Option<BenchmarkStatistics> {
    if pool.values(op.pool).is_empty() {
        warn!(operation = op.name, "Value pool is empty, operation skipped");
        return None;
    }

    let mut sample = BenchmarkSample::new(op.name, mode);
    for i in 0..iterations {
        if i > 0 {
            tokio::time::sleep(ITERATION_DELAY).await;
        }
        let Some(value) = op.value_for(pool, i, iterations) else {
            continue;
        };

        let start = Instant::now();
        match client.search(op.field, op.operator, &value, mode, None).await {
            Ok(response) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                match sample_latency(&response, elapsed_ms) {
                    Some(latency) => sample.record(latency),
                    None => debug!(
                        operation = op.name,
                        iteration = i,
                        "Empty or unsuccessful iteration excluded"
                    ),
                }
            }
            Err(err) => debug!(
                operation = op.name,
                iteration = i,
                error = %err,
                "Iteration failed"
            ),
        }
    }

    sample.finish()
}

/// Latency to record for one iteration, if any. Zero-result iterations say
/// nothing about the operation under load and never enter the sample; the
/// batch itself continues.
fn sample_latency(response: &SearchResponse, elapsed_ms: f64) -> Option<f64> {
    (response.success && response.metrics.results_count > 0).then_some(elapsed_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encsearch_core::CustomerRecord;

    fn pool() -> SamplePool {
        SamplePool::from_records(&[CustomerRecord {
            customer_id: "c-1".to_string(),
            full_name: "Maria Fernanda Oliveira".to_string(),
            email: "maria.oliveira@example.com".to_string(),
            phone: "+1-555-0101".to_string(),
            ..CustomerRecord::default()
        }])
    }

    #[test]
    fn catalog_covers_nine_operations_with_unique_names() {
        let ops = operations();
        assert_eq!(ops.len(), 9);

        let mut names: Vec<_> = ops.iter().map(|op| op.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn last_word_rule_takes_the_final_token() {
        let op = operations()
            .into_iter()
            .find(|op| op.rule == ValueRule::LastWord)
            .unwrap();
        assert_eq!(op.value_for(&pool(), 0, 1).unwrap(), "Oliveira");
    }

    #[test]
    fn short_prefix_rule_clamps_to_four_characters() {
        let op = operations()
            .into_iter()
            .find(|op| op.rule == ValueRule::ShortPrefix)
            .unwrap();
        // Pool substring is "Maria"; the rule keeps its first four characters.
        assert_eq!(op.value_for(&pool(), 0, 1).unwrap(), "Mari");
    }

    #[test]
    fn empty_pool_yields_no_value() {
        let empty = SamplePool::from_records(&[]);
        let op = operations()[0];
        assert!(op.value_for(&empty, 0, 1).is_none());
    }

    #[test]
    fn zero_result_iterations_are_excluded_from_the_sample() {
        let empty = SearchResponse::wrap(vec![], SearchMode::Hybrid, 1.0, 0.0, 1.5);
        assert!(empty.success);
        assert_eq!(sample_latency(&empty, 12.0), None);
    }

    #[test]
    fn non_empty_iterations_record_the_observed_latency() {
        let response = SearchResponse::wrap(
            vec![CustomerRecord::default()],
            SearchMode::PrimaryOnly,
            1.0,
            0.0,
            1.5,
        );
        assert_eq!(sample_latency(&response, 12.0), Some(12.0));
    }
}
