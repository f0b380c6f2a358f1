// Shared fixtures so tests can `use crate::helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use verdant::{
    FetchCause, Monitor, MonitorConfig, ProviderAdapter, QualityMetrics, QualityReport, Registry,
    Reliability, VerdantError,
};
use verdant_mock::{MockAdapter, MockAdapterBuilder};

pub const ALPHA: &str = "alpha";
pub const BETA: &str = "beta";
pub const GAMMA: &str = "gamma";

/// Free, unthrottled mock named `name`.
pub fn mock(name: &str) -> MockAdapterBuilder {
    MockAdapter::builder(name)
}

/// Registry declaring exactly the descriptors of `adapters`, in order.
pub fn registry_for(adapters: &[Arc<MockAdapter>]) -> Arc<Registry> {
    let sources = adapters.iter().map(|a| a.descriptor().clone()).collect();
    Arc::new(Registry::new(sources).expect("unique names"))
}

pub fn as_dyn(adapters: &[Arc<MockAdapter>]) -> Vec<Arc<dyn ProviderAdapter>> {
    adapters
        .iter()
        .map(|a| Arc::clone(a) as Arc<dyn ProviderAdapter>)
        .collect()
}

pub fn monitor_for(registry: &Arc<Registry>) -> Arc<Monitor> {
    Arc::new(Monitor::new(Arc::clone(registry), MonitorConfig::default()))
}

pub fn http_error(provider: &str, status: u16) -> VerdantError {
    VerdantError::fetch(provider, FetchCause::Http { status })
}

pub fn report(provider: &str, overall: f64, at: DateTime<Utc>) -> QualityReport {
    QualityReport {
        provider: provider.to_string(),
        record_count: 5,
        metrics: QualityMetrics {
            completeness: 100.0,
            accuracy: 90.0,
            timeliness: 100.0,
            consistency: 90.0,
            reliability: Reliability::High,
        },
        issues: Vec::new(),
        overall,
        assessed_at: at,
    }
}

pub const fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}
