use chrono::Utc;
use proptest::prelude::*;
use verdant::{AlertKind, CallMetric};
use verdant_mock::{MockBehavior, fixtures};

use crate::helpers::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn counters_match_recorded_calls(outcomes in prop::collection::vec((any::<bool>(), 1u64..2_000), 1..40)) {
        let reg = registry_for(&[mock(ALPHA).build()]);
        let m = monitor_for(&reg);
        for (ok, latency) in &outcomes {
            let metric = if *ok {
                CallMetric::success(ALPHA, "/esg", ms(*latency))
            } else {
                CallMetric::failure(ALPHA, "/esg", ms(*latency), "down")
            };
            m.record_call(metric);
        }
        let failures = outcomes.iter().filter(|(ok, _)| !ok).count();

        let perf = m.performance_metrics(ms(60_000));
        prop_assert_eq!(perf.total_calls, outcomes.len());
        prop_assert_eq!(perf.failed_calls, failures);

        let api_alerts = m
            .recent_alerts(usize::MAX)
            .iter()
            .filter(|a| a.kind == AlertKind::ApiFailure)
            .count();
        prop_assert_eq!(api_alerts, failures);

        let now = Utc::now();
        prop_assert_eq!(m.snapshot_at(now), m.snapshot_at(now));
        let rate = m.snapshot_at(now).performance.success_rate;
        prop_assert!((0.0..=100.0).contains(&rate));
    }

    #[test]
    fn recovery_alerts_follow_transitions(checks in prop::collection::vec(any::<bool>(), 1..12)) {
        let a = mock(ALPHA).records(1).build();
        let reg = registry_for(std::slice::from_ref(&a));
        let m = monitor_for(&reg);

        let mut expected_recoveries = 0;
        let mut previous_failed = false;
        for pass in &checks {
            if *pass {
                a.set_behavior(MockBehavior::Dataset(fixtures::records(0, 1)));
            } else {
                a.set_behavior(MockBehavior::Fail(http_error(ALPHA, 500)));
            }
            let ok = tokio_test::block_on(m.health_check(&*a));
            prop_assert_eq!(ok, *pass);
            if *pass && previous_failed {
                expected_recoveries += 1;
            }
            previous_failed = !*pass;
        }

        let alerts = m.recent_alerts(usize::MAX);
        let recoveries = alerts.iter().filter(|x| x.kind == AlertKind::HealthCheckPassed).count();
        let failures = alerts.iter().filter(|x| x.kind == AlertKind::HealthCheckFailed).count();
        prop_assert_eq!(recoveries, expected_recoveries);
        prop_assert_eq!(failures, checks.iter().filter(|p| !**p).count());
    }
}
