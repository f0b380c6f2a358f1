//! Shared data model, configuration primitives and the error type for verdant.
#![warn(missing_docs)]

mod config;
mod datapoint;
mod descriptor;
mod error;
mod monitoring;
mod quality;
mod reports;

pub use config::{
    AggregatorConfig, BackoffConfig, MergePolicy, MonitorConfig, QualityThresholds, RetryPolicy,
};
pub use datapoint::{EntityKind, EsgDataPoint, MetricBag, Pillar, Provenance, Scores};
pub use descriptor::{
    Coverage, CredentialSlot, DataType, RateLimit, Reliability, SourceDescriptor, Tier,
};
pub use error::{FetchCause, VerdantError};
pub use monitoring::{
    Alert, AlertCounts, AlertKind, CallMetric, DataQualitySummary, HealthStatus, OverallHealth,
    PerformanceMetrics, PerformanceSummary, ProviderHealth, ProviderStatus, QualityTrendPoint,
    RateLimitStatus, Severity,
};
pub use quality::{QualityMetrics, QualityReport};
pub use reports::AggregateReport;
