use verdant::{AlertKind, CallMetric, RateLimitStatus, Severity};

use crate::helpers::*;

fn with_remaining(remaining: Option<u64>) -> CallMetric {
    CallMetric::success(ALPHA, "/esg", ms(50)).with_remaining(remaining)
}

#[test]
fn exhausted_budget_is_critical() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);
    m.record_call(with_remaining(Some(0)));

    let alerts = m.recent_alerts(10);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::RateLimitExceeded);
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert_eq!(
        m.snapshot().providers[ALPHA].rate_limit_status,
        RateLimitStatus::Exceeded
    );
    assert_eq!(m.performance_metrics(ms(60_000)).rate_limit_hits, 1);
}

#[test]
fn low_budget_is_a_warning() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);
    m.record_call(with_remaining(Some(4)));

    let alerts = m.recent_alerts(10);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::RateLimitLow);
    assert_eq!(alerts[0].severity, Severity::Warning);
    assert_eq!(
        m.snapshot().providers[ALPHA].rate_limit_status,
        RateLimitStatus::Warning
    );
}

#[test]
fn plenty_of_budget_or_no_hint_is_quiet() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);
    m.record_call(with_remaining(Some(5)));
    m.record_call(with_remaining(None));
    assert!(m.recent_alerts(10).is_empty());
    assert_eq!(
        m.snapshot().providers[ALPHA].rate_limit_status,
        RateLimitStatus::Ok
    );
}
