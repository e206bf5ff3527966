//! Benchmark sample bookkeeping and descriptive statistics.

use serde::{Deserialize, Serialize};

use crate::model::SearchMode;

/// Per-iteration latencies collected for one (operation, mode) pairing.
#[derive(Debug, Clone)]
pub struct BenchmarkSample {
    pub operation: String,
    pub mode: SearchMode,
    latencies_ms: Vec<f64>,
}

impl BenchmarkSample {
    pub fn new(operation: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            operation: operation.into(),
            mode,
            latencies_ms: Vec::new(),
        }
    }

    /// Record one successful iteration. Failed iterations are simply not
    /// recorded; they must never appear as zero latencies.
    pub fn record(&mut self, latency_ms: f64) {
        self.latencies_ms.push(latency_ms);
    }

    pub fn len(&self) -> usize {
        self.latencies_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latencies_ms.is_empty()
    }

    pub fn latencies(&self) -> &[f64] {
        &self.latencies_ms
    }

    /// Compute final statistics. `None` when no iteration succeeded.
    pub fn finish(self) -> Option<BenchmarkStatistics> {
        BenchmarkStatistics::from_latencies(self.operation, self.mode, &self.latencies_ms)
    }
}

/// Descriptive statistics over a latency sample, computed once after all
/// iterations finish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    pub operation: String,
    pub mode: SearchMode,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; zero with fewer than two samples.
    pub stddev: f64,
    pub sample_count: usize,
}

impl BenchmarkStatistics {
    /// Compute statistics over a latency sample. `None` for an empty sample.
    pub fn from_latencies(
        operation: impl Into<String>,
        mode: SearchMode,
        latencies_ms: &[f64],
    ) -> Option<Self> {
        if latencies_ms.is_empty() {
            return None;
        }

        let count = latencies_ms.len();
        let sum: f64 = latencies_ms.iter().sum();
        let average = sum / count as f64;

        let mut sorted = latencies_ms.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        let stddev = if count < 2 {
            0.0
        } else {
            let variance = latencies_ms
                .iter()
                .map(|x| (x - average).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        };

        Some(Self {
            operation: operation.into(),
            mode,
            average,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            stddev,
            sample_count: count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sequence_statistics() {
        let stats = BenchmarkStatistics::from_latencies(
            "op",
            SearchMode::Hybrid,
            &[10.0, 20.0, 30.0, 40.0],
        )
        .unwrap();

        assert_eq!(stats.average, 25.0);
        assert_eq!(stats.median, 25.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 40.0);
        assert!((stats.stddev - 12.909944487358056).abs() < 1e-9);
        assert_eq!(stats.sample_count, 4);
    }

    #[test]
    fn odd_sample_median_is_middle_value() {
        let stats =
            BenchmarkStatistics::from_latencies("op", SearchMode::Hybrid, &[5.0, 1.0, 3.0])
                .unwrap();
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn single_sample_has_zero_stddev() {
        let stats =
            BenchmarkStatistics::from_latencies("op", SearchMode::PrimaryOnly, &[42.0]).unwrap();
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.average, 42.0);
        assert_eq!(stats.median, 42.0);
    }

    #[test]
    fn empty_sample_yields_no_statistics() {
        assert!(BenchmarkStatistics::from_latencies("op", SearchMode::Hybrid, &[]).is_none());

        let sample = BenchmarkSample::new("op", SearchMode::Hybrid);
        assert!(sample.finish().is_none());
    }

    #[test]
    fn sample_records_only_what_it_is_given() {
        let mut sample = BenchmarkSample::new("op", SearchMode::Hybrid);
        sample.record(10.0);
        sample.record(20.0);
        assert_eq!(sample.len(), 2);

        let stats = sample.finish().unwrap();
        assert_eq!(stats.sample_count, 2);
        assert_eq!(stats.average, 15.0);
    }
}
