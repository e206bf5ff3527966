//! encsearch benchmark and functional test binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use encsearch_bench::client::ApiClient;
use encsearch_bench::pool::{SamplePool, BOOTSTRAP_CATEGORY};
use encsearch_bench::{runner, suite};
use encsearch_core::{
    ComparisonReport, ReportBuilder, SearchField, SearchMode, SearchOperator,
};

/// Minimum seed records for meaningful benchmark numbers.
const RECOMMENDED_RECORDS: u64 = 100;

#[derive(Debug, Parser)]
#[command(name = "encsearch-bench", about = "Benchmark and test the encsearch gateway")]
struct Args {
    /// Gateway base URL.
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Benchmark iterations per (operation, mode) pairing.
    #[arg(long, default_value_t = 100)]
    iterations: usize,

    /// Where to write the JSON comparison report.
    #[arg(long, default_value = "comparison_report.json")]
    report: PathBuf,

    /// Skip the functional suite and run only the performance benchmark.
    #[arg(long)]
    skip_functional: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    request_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let client = ApiClient::new(
        args.base_url.clone(),
        Duration::from_millis(args.request_timeout_ms),
    )?;
    info!(base_url = client.base_url(), iterations = args.iterations, "Starting test run");

    // Gate on gateway health before spending any benchmark time.
    let health = client
        .health()
        .await
        .map_err(|e| anyhow::anyhow!("gateway unreachable at {}: {e}", client.base_url()))?;
    if !health.is_healthy() {
        anyhow::bail!(
            "gateway degraded (primary_connected={}, secondary_connected={})",
            health.primary_connected,
            health.secondary_connected
        );
    }
    if health.primary_records < RECOMMENDED_RECORDS {
        warn!(
            records = health.primary_records,
            "Seed dataset is small; large result-size tests will report NA"
        );
    }
    info!(records = health.primary_records, "Gateway healthy");

    let pool = bootstrap_pool(&client, args.iterations).await?;
    info!(records = pool.record_count(), "Sample pool ready");

    let mut builder = ReportBuilder::new();

    if args.skip_functional {
        info!("Functional suite skipped");
    } else {
        suite::run_functional_suite(&client, &pool, &mut builder).await;
    }

    runner::run_performance_suite(&client, &pool, args.iterations, &mut builder).await;

    // Limiter counters accumulate over the whole run; snapshot them last.
    if let Ok(health) = client.health().await {
        if let Some(throttle) = health.throttle {
            builder.set_throttle_stats(throttle);
        }
    }

    let report = builder.build();
    std::fs::write(&args.report, serde_json::to_string_pretty(&report)?)?;
    info!(path = %args.report.display(), "Report written");

    print_summary(&report);

    if report.summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Fetch seed records through the gateway itself and build the value pool.
async fn bootstrap_pool(client: &ApiClient, iterations: usize) -> anyhow::Result<SamplePool> {
    let limit = SamplePool::bootstrap_limit(iterations);
    let response = client
        .search(
            SearchField::Category,
            SearchOperator::Equality,
            BOOTSTRAP_CATEGORY,
            SearchMode::Hybrid,
            Some(limit),
        )
        .await
        .map_err(|e| anyhow::anyhow!("bootstrap search failed: {e}"))?;

    if response.data.is_empty() {
        warn!(
            category = BOOTSTRAP_CATEGORY,
            "Bootstrap search returned no records; only seeded value sets are available"
        );
    }
    Ok(SamplePool::from_records(&response.data))
}

fn print_summary(report: &ComparisonReport) {
    println!();
    println!("==================== Test Summary ====================");
    println!(
        "  {} tests, {} passed, {} failed ({:.1}% pass rate)",
        report.summary.total, report.summary.passed, report.summary.failed, report.summary.pass_rate
    );

    if !report.statistics.is_empty() {
        println!();
        println!("Latency by operation (ms):");
        for op in &report.statistics {
            println!("  {}", op.operation);
            for (label, stats) in [("hybrid", &op.hybrid), ("primary-only", &op.primary_only)] {
                match stats {
                    Some(s) => println!(
                        "    {label:>12}: avg {:.2}  median {:.2}  min {:.2}  max {:.2}  stddev {:.2}  (n={})",
                        s.average, s.median, s.min, s.max, s.stddev, s.sample_count
                    ),
                    None => println!("    {label:>12}: no data"),
                }
            }
        }
    }

    if !report.comparisons.is_empty() {
        println!();
        println!("Mode comparison (diff = primary-only - hybrid, ms):");
        for row in &report.comparisons {
            let size = row
                .result_size
                .map(|s| format!(" [{s}]"))
                .unwrap_or_default();
            match (row.hybrid_ms, row.primary_only_ms, row.diff_ms) {
                (Some(h), Some(p), Some(d)) => println!(
                    "  {}{size}: hybrid {h:.2}  primary-only {p:.2}  diff {d:+.2}",
                    row.operation
                ),
                _ => println!("  {}{size}: no data", row.operation),
            }
        }
    }

    if let Some(throttle) = &report.throttle {
        println!();
        println!(
            "Throttling: {} requests, {} throttled, peak {} of {} concurrent",
            throttle.total_requests,
            throttle.throttled_requests,
            throttle.peak_concurrent,
            throttle.max_concurrent
        );
    }
    println!("======================================================");
}
