use std::sync::Arc;
use std::time::Duration;

use verdant::{
    AlertKind, Monitor, MonitorConfig, ProviderStatus, Severity, SourceDescriptor, Tier,
    VerdantError,
};
use verdant_mock::{MockBehavior, fixtures};

use crate::helpers::*;

#[tokio::test]
async fn failure_then_recovery_raises_both_alerts() {
    let a = mock(ALPHA).fails_with(http_error(ALPHA, 500)).build();
    let reg = registry_for(std::slice::from_ref(&a));
    let m = monitor_for(&reg);

    assert!(!m.health_check(&*a).await);
    let alerts = m.recent_alerts(10);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::HealthCheckFailed);
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert_eq!(m.snapshot().providers[ALPHA].status, ProviderStatus::Offline);

    a.set_behavior(MockBehavior::Dataset(fixtures::records(0, 1)));
    assert!(m.health_check(&*a).await);
    let alerts = m.recent_alerts(10);
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].kind, AlertKind::HealthCheckPassed);
    assert_eq!(alerts[0].severity, Severity::Info);

    assert!(m.health_check(&*a).await);
    assert_eq!(m.recent_alerts(10).len(), 2);
    let p = &m.snapshot().providers[ALPHA];
    assert_eq!(p.status, ProviderStatus::Online);
    assert!(p.last_success.is_some());
}

#[tokio::test(start_paused = true)]
async fn stalled_check_times_out() {
    let a = mock(ALPHA).hangs().build();
    let reg = registry_for(std::slice::from_ref(&a));
    let m = monitor_for(&reg);

    let started = tokio::time::Instant::now();
    assert!(!m.health_check(&*a).await);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert_eq!(m.recent_alerts(1)[0].kind, AlertKind::HealthCheckFailed);
}

#[tokio::test(start_paused = true)]
async fn round_skips_disabled_providers_and_paces_calls() {
    let a = mock(ALPHA).records(1).build();
    let b = mock(BETA).fails_with(http_error(BETA, 503)).build();
    let off = mock(GAMMA)
        .descriptor(SourceDescriptor::new(GAMMA, Tier::Free, "mock://gamma").enabled(false))
        .records(1)
        .build();
    let adapters = vec![a, b, off.clone()];
    let reg = registry_for(&adapters);
    let m = monitor_for(&reg);

    let started = tokio::time::Instant::now();
    let results = m.run_health_checks(&as_dyn(&adapters)).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[ALPHA], true);
    assert_eq!(results[BETA], false);
    assert_eq!(off.call_count(), 0);
    assert_eq!(started.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn background_loop_ticks_until_stopped() {
    let a = mock(ALPHA).records(1).build();
    let reg = registry_for(std::slice::from_ref(&a));
    let cfg = MonitorConfig {
        health_check_interval: Duration::from_secs(60),
        ..MonitorConfig::default()
    };
    let m = Arc::new(Monitor::new(reg, cfg));

    let handle = m.spawn_health_checks(as_dyn(std::slice::from_ref(&a))).unwrap();
    let second = m.spawn_health_checks(Vec::new());
    assert!(matches!(second, Err(VerdantError::Monitoring(_))));

    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(a.call_count(), 3);

    handle.stop().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(a.call_count(), 3);

    let again = m.spawn_health_checks(Vec::new()).unwrap();
    again.stop().await;
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let cfg = MonitorConfig {
        health_check_interval: Duration::ZERO,
        ..MonitorConfig::default()
    };
    let m = Arc::new(Monitor::new(reg, cfg));
    let err = m.spawn_health_checks(Vec::new()).err().expect("zero interval");
    assert!(err.is_configuration());
}

#[tokio::test]
async fn unknown_adapter_is_not_checked() {
    let stray = mock(BETA).records(1).build();
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);
    assert!(!m.health_check(&*stray).await);
    assert_eq!(stray.call_count(), 0);
    assert!(m.recent_alerts(10).is_empty());
}
