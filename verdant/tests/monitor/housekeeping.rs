use chrono::{TimeDelta, Utc};
use verdant::CallMetric;

use crate::helpers::*;

const HOUR: u64 = 60 * 60 * 1000;

#[test]
fn performance_metrics_respect_the_window() {
    let reg = registry_for(&[mock(ALPHA).build(), mock(BETA).build()]);
    let m = monitor_for(&reg);
    let now = Utc::now();
    m.record_call(
        CallMetric::success(ALPHA, "/esg", ms(100))
            .with_records(10)
            .at(now - TimeDelta::minutes(30)),
    );
    m.record_call(
        CallMetric::failure(BETA, "/esg", ms(300), "down").at(now - TimeDelta::hours(3)),
    );

    let last_hour = m.performance_metrics_at(ms(HOUR), now);
    assert_eq!(last_hour.total_calls, 1);
    assert_eq!(last_hour.successful_calls, 1);
    assert_eq!(last_hour.records_fetched, 10);
    assert_eq!(last_hour.avg_latency, ms(100));

    let last_day = m.performance_metrics_at(ms(24 * HOUR), now);
    assert_eq!(last_day.window, ms(24 * HOUR));
    assert_eq!(last_day.total_calls, 2);
    assert_eq!(last_day.failed_calls, 1);
    assert_eq!(last_day.avg_latency, ms(200));
}

#[test]
fn quality_trends_are_windowed_per_provider() {
    let reg = registry_for(&[mock(ALPHA).build(), mock(BETA).build()]);
    let m = monitor_for(&reg);
    let now = Utc::now();
    m.record_quality(report(ALPHA, 75.0, now - TimeDelta::days(10)));
    m.record_quality(report(ALPHA, 80.0, now - TimeDelta::days(2)));
    m.record_quality(report(ALPHA, 90.0, now));

    let trends = m.quality_trends_at(ms(7 * 24 * HOUR), now);
    assert_eq!(trends.len(), 1);
    let scores: Vec<f64> = trends[ALPHA].iter().map(|p| p.score).collect();
    assert_eq!(scores, vec![80.0, 90.0]);
    assert_eq!(trends[ALPHA][1].at, now);
}

#[test]
fn cleanup_evicts_expired_entries() {
    let reg = registry_for(&[mock(ALPHA).build()]);
    let m = monitor_for(&reg);
    let now = Utc::now();
    let old = now - TimeDelta::days(2);
    m.record_call(CallMetric::success(ALPHA, "/esg", ms(10)).at(old));
    m.record_call(CallMetric::success(ALPHA, "/esg", ms(10)).at(now));
    m.record_quality(report(ALPHA, 40.0, old));
    m.record_quality(report(ALPHA, 95.0, now));
    assert_eq!(m.recent_alerts(10).len(), 1);

    assert_eq!(m.cleanup_at(now), 3);
    assert!(m.recent_alerts(10).is_empty());
    assert_eq!(m.performance_metrics_at(ms(72 * HOUR), now).total_calls, 1);
    assert_eq!(m.quality_trends_at(ms(72 * HOUR), now)[ALPHA].len(), 1);

    assert_eq!(m.cleanup_at(now), 0);
}
