use verdant::{AlertKind, CallMetric, OverallHealth, ProviderStatus, Severity};

use crate::helpers::*;

fn call(ok: bool) -> CallMetric {
    if ok {
        CallMetric::success(ALPHA, "/esg", ms(100))
    } else {
        CallMetric::failure(ALPHA, "/esg", ms(100), "http status 500").with_status(500)
    }
}

fn degraded_alerts(alerts: &[verdant::Alert]) -> usize {
    alerts
        .iter()
        .filter(|a| a.kind == AlertKind::PerformanceDegraded)
        .count()
}

#[test]
fn error_rate_over_threshold_degrades_provider() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);

    for ok in [true, true, false, true, true, true] {
        m.record_call(call(ok));
    }

    let alerts = m.recent_alerts(100);
    assert_eq!(degraded_alerts(&alerts), 1);
    let perf = alerts
        .iter()
        .find(|a| a.kind == AlertKind::PerformanceDegraded)
        .unwrap();
    assert_eq!(perf.severity, Severity::Warning);
    assert_eq!(perf.provider, ALPHA);
    assert_eq!(perf.metadata["samples"], serde_json::json!(5));

    let health = m.snapshot();
    assert_eq!(health.providers[ALPHA].status, ProviderStatus::Degraded);
    assert_eq!(health.providers[ALPHA].samples, 6);
    assert_eq!(health.overall, OverallHealth::Degraded);
}

#[test]
fn too_few_samples_never_degrade() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);
    for _ in 0..4 {
        m.record_call(call(false));
    }
    assert_eq!(degraded_alerts(&m.recent_alerts(100)), 0);
    assert_ne!(m.snapshot().providers[ALPHA].status, ProviderStatus::Degraded);
}

#[test]
fn slow_calls_degrade_provider() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);
    for _ in 0..5 {
        m.record_call(CallMetric::success(ALPHA, "/esg", ms(6_000)));
    }
    assert_eq!(degraded_alerts(&m.recent_alerts(100)), 1);
    let p = &m.snapshot().providers[ALPHA];
    assert_eq!(p.status, ProviderStatus::Degraded);
    assert_eq!(p.avg_response_time, ms(6_000));
    assert!(p.error_rate.abs() < f64::EPSILON);
}

#[test]
fn alert_fires_again_after_recovery() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);

    m.record_call(call(false));
    for _ in 0..4 {
        m.record_call(call(true));
    }
    assert_eq!(degraded_alerts(&m.recent_alerts(100)), 1);

    // 1 failure in 11 calls is under 10%.
    for _ in 0..6 {
        m.record_call(call(true));
    }
    assert_eq!(m.snapshot().providers[ALPHA].status, ProviderStatus::Online);

    m.record_call(call(false));
    assert_eq!(degraded_alerts(&m.recent_alerts(100)), 2);
}
