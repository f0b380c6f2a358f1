use verdant::{AlertKind, Aggregator, ProviderStatus, Severity};

use crate::helpers::*;

#[tokio::test]
async fn calls_and_reports_reach_the_monitor() {
    let a = mock(ALPHA).fails_with(http_error(ALPHA, 404)).build();
    let b = mock(BETA).records(25).remaining(3).build();
    let adapters = vec![a, b];
    let registry = registry_for(&adapters);
    let monitor = monitor_for(&registry);
    let agg = Aggregator::builder()
        .registry(registry)
        .with_adapters(as_dyn(&adapters))
        .monitor(monitor.clone())
        .build()
        .unwrap();

    agg.fetch_all().await.unwrap();

    let perf = monitor.performance_metrics(ms(60_000));
    assert_eq!(perf.total_calls, 4);
    assert_eq!(perf.failed_calls, 1);
    assert_eq!(perf.records_fetched, 25);

    let alerts = monitor.recent_alerts(50);
    assert!(alerts
        .iter()
        .any(|a| a.kind == AlertKind::ApiFailure && a.provider == ALPHA && a.severity == Severity::Error));
    assert_eq!(
        alerts.iter().filter(|a| a.kind == AlertKind::RateLimitLow).count(),
        3
    );

    let trends = monitor.quality_trends(ms(60_000));
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[BETA].len(), 1);

    let health = monitor.snapshot();
    assert_eq!(health.providers[ALPHA].status, ProviderStatus::Offline);
    assert_eq!(health.providers[BETA].status, ProviderStatus::Online);
    assert!(health.data_quality.provider_scores.contains_key(BETA));
}
