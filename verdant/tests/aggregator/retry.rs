use verdant::{Aggregator, BackoffConfig, RetryPolicy};
use verdant_mock::MockPage;

use crate::helpers::*;

fn quick_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff: BackoffConfig {
            min_backoff_ms: 100,
            max_backoff_ms: 1000,
            factor: 2,
            jitter_percent: 0,
        },
    }
}

#[tokio::test(start_paused = true)]
async fn retryable_failure_is_retried() {
    let flaky = mock(ALPHA)
        .script(vec![
            Err(http_error(ALPHA, 503)),
            Ok(MockPage::of(0, 3, false)),
        ])
        .build();
    let agg = Aggregator::builder()
        .registry(registry_for(std::slice::from_ref(&flaky)))
        .with_adapter(flaky.clone())
        .retry(quick_retry(3))
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();
    assert_eq!(flaky.call_count(), 2);
    assert_eq!(report.data_points.len(), 3);
    assert!(report.warnings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn retries_stop_at_the_attempt_limit() {
    let down = mock(ALPHA).fails_with(http_error(ALPHA, 502)).build();
    let agg = Aggregator::builder()
        .registry(registry_for(std::slice::from_ref(&down)))
        .with_adapter(down.clone())
        .retry(quick_retry(3))
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();
    assert_eq!(down.call_count(), 3);
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let gone = mock(ALPHA).fails_with(http_error(ALPHA, 404)).build();
    let agg = Aggregator::builder()
        .registry(registry_for(std::slice::from_ref(&gone)))
        .with_adapter(gone.clone())
        .retry(quick_retry(5))
        .build()
        .unwrap();

    agg.fetch_all().await.unwrap();
    assert_eq!(gone.call_count(), 1);
}
