use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use verdant::{
    Aggregator, QualityThresholds, Reliability, SourceDescriptor, VerdantError,
};
use verdant_core::{Normalized, Page, PageRequest, Pagination, ProviderAdapter, RawPayload};
use verdant_mock::MockAdapter;

use crate::helpers::*;

#[tokio::test]
async fn sparse_batch_is_flagged_but_kept() {
    let sparse = mock(ALPHA)
        .dataset(vec![json!({"id": "X1", "name": "Sparse Corp"})])
        .build();
    let agg = Aggregator::builder()
        .registry(registry_for(std::slice::from_ref(&sparse)))
        .with_adapter(sparse)
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();

    assert_eq!(report.data_points.len(), 1);
    let q = &report.quality_reports[0];
    assert!(q.metrics.completeness < 60.0);
    assert!(matches!(
        &report.warnings[..],
        [VerdantError::LowQuality { provider, reason }]
            if provider == ALPHA && reason.starts_with("completeness")
    ));
}

#[tokio::test]
async fn unreliable_provider_is_flagged() {
    let low = mock(ALPHA).reliability(Reliability::Low).records(2).build();
    let agg = Aggregator::builder()
        .registry(registry_for(std::slice::from_ref(&low)))
        .with_adapter(low)
        .quality_thresholds(QualityThresholds {
            minimum_completeness: 50.0,
            minimum_reliability: Reliability::Medium,
        })
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();
    assert_eq!(report.data_points.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].to_string().contains("reliability"));
}

/// Adapter that wraps a mock but tags one record with another provider name.
struct Mistagging(Arc<MockAdapter>);

#[async_trait]
impl ProviderAdapter for Mistagging {
    fn descriptor(&self) -> &SourceDescriptor {
        self.0.descriptor()
    }

    fn pagination(&self) -> Pagination {
        self.0.pagination()
    }

    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, VerdantError> {
        self.0.fetch_page(req).await
    }

    fn normalize(&self, raw: &RawPayload) -> Normalized {
        let mut out = self.0.normalize(raw);
        if let Some(p) = out.points.first_mut() {
            p.provider = BETA.to_string();
        }
        out
    }
}

#[tokio::test]
async fn mistagged_records_are_dropped() {
    let inner = mock(ALPHA).records(3).build();
    let agg = Aggregator::builder()
        .registry(registry_for(std::slice::from_ref(&inner)))
        .with_adapter(Arc::new(Mistagging(inner)))
        .build()
        .unwrap();

    let report = agg.fetch_all().await.unwrap();
    assert_eq!(report.data_points.len(), 2);
    assert!(report.data_points.iter().all(|p| p.provider == ALPHA));
    assert!(matches!(&report.warnings[..], [VerdantError::Transform { .. }]));
    assert_eq!(report.quality_reports[0].record_count, 2);
}
