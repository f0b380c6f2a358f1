use chrono::{TimeDelta, Utc};
use verdant::{
    AlertKind, CallMetric, Monitor, MonitorConfig, OverallHealth, ProviderStatus, Severity,
};

use crate::helpers::*;

#[test]
fn snapshot_is_idempotent() {
    let reg = registry_for(&[mock(ALPHA).build(), mock(BETA).build()]);
    let m = monitor_for(&reg);
    m.record_call(CallMetric::success(ALPHA, "/esg", ms(120)));
    m.record_call(CallMetric::failure(BETA, "/esg", ms(80), "boom"));
    m.record_quality(report(ALPHA, 82.0, Utc::now()));

    let now = Utc::now();
    let first = m.snapshot_at(now);
    let second = m.snapshot_at(now);
    assert_eq!(first, second);
    assert_eq!(m.recent_alerts(10).len(), 1);
}

#[test]
fn silent_provider_goes_offline() {
    let reg = registry_for(&[mock(ALPHA).build(), mock(BETA).build()]);
    let m = monitor_for(&reg);
    let now = Utc::now();
    m.record_call(CallMetric::success(ALPHA, "/esg", ms(100)).at(now));

    let fresh = m.snapshot_at(now + TimeDelta::minutes(5));
    assert_eq!(fresh.providers[ALPHA].status, ProviderStatus::Online);
    assert_eq!(fresh.providers[BETA].status, ProviderStatus::Unknown);
    assert_eq!(fresh.overall, OverallHealth::Healthy);

    let stale = m.snapshot_at(now + TimeDelta::minutes(11));
    assert_eq!(stale.providers[ALPHA].status, ProviderStatus::Offline);
    assert_eq!(stale.overall, OverallHealth::Unhealthy);
}

#[test]
fn quality_drives_the_verdict() {
    let reg = registry_for(&[mock(ALPHA).build(), mock(BETA).build()]);
    let m = monitor_for(&reg);
    let now = Utc::now();
    m.record_call(CallMetric::success(ALPHA, "/esg", ms(10)).at(now));
    m.record_call(CallMetric::success(BETA, "/esg", ms(10)).at(now));

    m.record_quality(report(ALPHA, 90.0, now));
    m.record_quality(report(BETA, 80.0, now));
    let s = m.snapshot_at(now);
    assert_eq!(s.data_quality.average_score, Some(85.0));
    assert_eq!(s.overall, OverallHealth::Healthy);

    m.record_quality(report(BETA, 40.0, now));
    let s = m.snapshot_at(now);
    assert_eq!(s.data_quality.provider_scores[BETA], 40.0);
    assert_eq!(s.data_quality.average_score, Some(65.0));
    assert_eq!(s.alerts.critical, 1);
    assert_eq!(s.overall, OverallHealth::Unhealthy);

    let alert = &m.recent_alerts(1)[0];
    assert_eq!(alert.kind, AlertKind::QualityBelowThreshold);
    assert_eq!(alert.severity, Severity::Critical);
}

#[test]
fn alerts_age_out_of_the_verdict() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);
    let now = Utc::now();
    m.record_call(CallMetric::success(ALPHA, "/esg", ms(10)).with_remaining(Some(2)).at(now));

    assert_eq!(m.snapshot_at(now).overall, OverallHealth::Degraded);
    assert_eq!(m.snapshot_at(now).alerts.warnings, 1);

    let later = m.snapshot_at(now + TimeDelta::minutes(61));
    assert_eq!(later.alerts.active, 0);
}

#[test]
fn histories_are_bounded() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let cfg = MonitorConfig {
        max_alerts: 3,
        max_metrics_per_provider: 4,
        ..MonitorConfig::default()
    };
    let m = Monitor::new(reg, cfg);
    for _ in 0..10 {
        m.record_call(CallMetric::failure(ALPHA, "/esg", ms(10), "down"));
    }

    let alerts = m.recent_alerts(100);
    let ids: Vec<u64> = alerts.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![9, 8, 7]);
    assert_eq!(m.performance_metrics(ms(60_000)).total_calls, 4);
    assert_eq!(m.recent_alerts(1).len(), 1);
}

#[test]
fn only_enabled_providers_are_reported() {
    let disabled = mock(GAMMA)
        .descriptor(
            verdant::SourceDescriptor::new(GAMMA, verdant::Tier::Free, "mock://gamma")
                .enabled(false),
        )
        .build();
    let reg = registry_for(&[mock(ALPHA).build(), disabled]);
    let m = monitor_for(&reg);
    let s = m.snapshot();
    assert!(s.providers.contains_key(ALPHA));
    assert!(!s.providers.contains_key(GAMMA));
}
