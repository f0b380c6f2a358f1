use std::time::Duration;

use verdant::{Aggregator, MergePolicy, OffsetRule, Pagination, VerdantError};

use crate::helpers::*;

#[tokio::test]
async fn failing_provider_does_not_fail_the_batch() {
    let a = mock(ALPHA).fails_with(http_error(ALPHA, 404)).build();
    let b = mock(BETA).records(15).build();
    let adapters = vec![a.clone(), b.clone()];
    let agg = Aggregator::builder()
        .registry(registry_for(&adapters))
        .with_adapters(as_dyn(&adapters))
        .build()
        .unwrap();

    let report = agg.fetch_all().await.expect("best effort never fails");

    assert_eq!(report.data_points.len(), 15);
    assert!(report.data_points.iter().all(|p| p.provider == BETA));
    assert_eq!(report.providers(), vec![BETA]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].provider(), Some(ALPHA));
    assert_eq!(a.call_count(), 1);
    assert_eq!(b.call_count(), 2);
}

#[tokio::test]
async fn fail_fast_reports_every_failure() {
    let a = mock(ALPHA).fails_with(http_error(ALPHA, 404)).build();
    let b = mock(BETA).records(3).build();
    let adapters = vec![a, b];
    let agg = Aggregator::builder()
        .registry(registry_for(&adapters))
        .with_adapters(as_dyn(&adapters))
        .merge_policy(MergePolicy::FailFast)
        .build()
        .unwrap();

    let err = agg.fetch_all().await.unwrap_err();
    assert!(matches!(&err, VerdantError::AllProvidersFailed(v) if v.len() == 1));
    assert_eq!(err.flatten()[0].provider(), Some(ALPHA));
}

#[tokio::test]
async fn provider_configuration_fault_only_excludes_that_provider() {
    let a = mock(ALPHA)
        .fails_with(VerdantError::invalid_config("bad url not a url/country"))
        .build();
    let b = mock(BETA).records(5).build();
    let adapters = vec![a.clone(), b.clone()];
    let registry = registry_for(&adapters);
    let monitor = monitor_for(&registry);
    let agg = Aggregator::builder()
        .registry(registry)
        .with_adapters(as_dyn(&adapters))
        .monitor(monitor.clone())
        .build()
        .unwrap();

    let report = agg.fetch_all().await.expect("other providers still merge");

    assert_eq!(report.data_points.len(), 5);
    assert_eq!(report.providers(), vec![BETA]);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        VerdantError::Misconfigured { provider, .. } if provider == ALPHA
    ));
    assert!(!report.warnings[0].is_configuration());
    assert_eq!(monitor.quality_trends(Duration::from_secs(3600))[BETA].len(), 1);
}

#[tokio::test]
async fn misaligned_batch_size_fails_before_any_call() {
    let a = mock(ALPHA)
        .pagination(Pagination {
            offset_rule: OffsetRule::MultipleOf(10),
            max_page_size: 100,
            safety_ceiling: 1000,
        })
        .records(20)
        .build();
    let b = mock(BETA).records(5).build();
    let adapters = vec![a.clone(), b.clone()];
    let registry = registry_for(&adapters);
    let monitor = monitor_for(&registry);
    let agg = Aggregator::builder()
        .registry(registry)
        .with_adapters(as_dyn(&adapters))
        .monitor(monitor.clone())
        .batch_size(15)
        .build()
        .unwrap();

    let err = agg.fetch_all().await.unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains(ALPHA));
    assert_eq!(a.call_count(), 0);
    assert_eq!(b.call_count(), 0);
    assert!(monitor.quality_trends(Duration::from_secs(3600)).is_empty());
}

#[tokio::test]
async fn every_provider_failing_still_returns_a_report() {
    let a = mock(ALPHA).fails_with(http_error(ALPHA, 500)).build();
    let b = mock(BETA).fails_with(http_error(BETA, 403)).build();
    let adapters = vec![a, b];
    let agg = Aggregator::builder()
        .registry(registry_for(&adapters))
        .with_adapters(as_dyn(&adapters))
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();
    assert!(report.data_points.is_empty());
    assert!(report.quality_reports.is_empty());
    assert_eq!(report.warnings.len(), 2);
}
