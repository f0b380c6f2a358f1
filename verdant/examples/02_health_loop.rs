mod common;

use std::sync::Arc;
use std::time::Duration;

use verdant::{Monitor, MonitorConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let (registry, adapters) = common::setup()?;
    let cfg = MonitorConfig {
        health_check_interval: Duration::from_secs(2),
        ..MonitorConfig::default()
    };
    let monitor = Arc::new(Monitor::new(registry, cfg));

    println!("Running health checks for ~5s...");
    let handle = monitor.spawn_health_checks(adapters)?;
    tokio::time::sleep(Duration::from_secs(5)).await;
    handle.stop().await;

    let health = monitor.snapshot();
    println!("{health:#?}");
    println!("removed {} expired entries", monitor.cleanup());

    Ok(())
}
