use verdant::{Aggregator, Reliability, Tier, VerdantError};

use crate::helpers::*;

#[tokio::test]
async fn batches_merge_in_priority_order() {
    let medium = mock(ALPHA).reliability(Reliability::Medium).records(2).build();
    let high = mock(BETA).records(2).build();
    let adapters = vec![medium, high];
    let agg = Aggregator::builder()
        .registry(registry_for(&adapters))
        .with_adapters(as_dyn(&adapters))
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();

    assert_eq!(report.providers(), vec![BETA, ALPHA]);
    let tags: Vec<&str> = report.data_points.iter().map(|p| p.provider.as_str()).collect();
    assert_eq!(tags, vec![BETA, BETA, ALPHA, ALPHA]);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn premium_without_credential_is_skipped_with_warning() {
    let premium = mock(GAMMA).tier(Tier::Premium).records(4).build();
    let free = mock(ALPHA).records(1).build();
    let adapters = vec![premium.clone(), free];
    let agg = Aggregator::builder()
        .registry(registry_for(&adapters))
        .with_adapters(as_dyn(&adapters))
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();

    assert_eq!(premium.call_count(), 0);
    assert_eq!(report.providers(), vec![ALPHA]);
    assert_eq!(
        report.warnings,
        vec![VerdantError::MissingCredential {
            provider: GAMMA.to_string()
        }]
    );
}

#[tokio::test]
async fn registered_provider_without_adapter_is_ignored() {
    let a = mock(ALPHA).records(1).build();
    let b = mock(BETA).records(1).build();
    let agg = Aggregator::builder()
        .registry(registry_for(&[a.clone(), b]))
        .with_adapter(a)
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();
    assert_eq!(report.providers(), vec![ALPHA]);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn filters_reach_every_provider() {
    let a = mock(ALPHA).records(1).build();
    let b = mock(BETA).records(1).build();
    let adapters = vec![a.clone(), b.clone()];
    let agg = Aggregator::builder()
        .registry(registry_for(&adapters))
        .with_adapters(as_dyn(&adapters))
        .filter("country", "DEU")
        .build()
        .unwrap();

    agg.fetch_all().await.unwrap();
    for m in [a, b] {
        let calls = m.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].filters.get("country").map(String::as_str), Some("DEU"));
    }
}
