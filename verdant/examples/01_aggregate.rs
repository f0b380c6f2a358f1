mod common;

use std::sync::Arc;

use verdant::{Aggregator, Monitor, MonitorConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,verdant=debug,verdant_core=debug
    common::init_tracing();

    // 1. Registry and adapters (mocks in CI when VERDANT_EXAMPLES_USE_MOCK is set).
    let (registry, adapters) = common::setup()?;
    let monitor = Arc::new(Monitor::new(registry.clone(), MonitorConfig::default()));

    // 2. Build the aggregator.
    let aggregator = Aggregator::builder()
        .registry(registry)
        .with_adapters(adapters)
        .monitor(monitor.clone())
        .batch_size(10)
        .max_records(50)
        .build()?;

    // 3. Fetch every provider. Failures land in the warnings.
    let report = aggregator.fetch_all().await?;
    println!("{} data points from {:?}", report.data_points.len(), report.providers());
    for q in &report.quality_reports {
        println!(
            "  {:<24} records={:<4} quality={:.1} issues={:?}",
            q.provider, q.record_count, q.overall, q.issues
        );
    }
    for w in &report.warnings {
        println!("  warning: {w}");
    }

    // 4. What the monitor saw.
    let health = monitor.snapshot();
    println!("overall health: {:?}", health.overall);
    for (name, p) in &health.providers {
        println!("  {name:<24} {:?} samples={}", p.status, p.samples);
    }
    for alert in monitor.recent_alerts(5) {
        println!("  [{:?}] {}", alert.severity, alert.message);
    }

    Ok(())
}
