//! Verdant aggregates ESG data from several providers and watches their health.
//!
//! Overview
//! - [`Aggregator`] fans out to every enabled provider with a registered
//!   adapter, paginates each one sequentially and merges the batches in
//!   priority order (free before premium, then by reliability).
//! - A failing provider never fails the batch under the default
//!   [`MergePolicy::BestEffort`]; its error lands in the report's warnings.
//! - Every batch is assessed for quality and the report is forwarded to the
//!   [`Monitor`].
//! - [`Monitor`] records per-call metrics and quality reports, raises alerts
//!   and derives a point-in-time [`HealthStatus`]. It can also run periodic
//!   synthetic health checks on a background task.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use verdant::{Aggregator, Monitor, MonitorConfig, Registry};
//!
//! let registry = Arc::new(Registry::from_env());
//! let monitor = Arc::new(Monitor::new(registry.clone(), MonitorConfig::default()));
//!
//! let aggregator = Aggregator::builder()
//!     .registry(registry.clone())
//!     .with_adapters(verdant_providers::default_adapters(&registry))
//!     .monitor(monitor.clone())
//!     .build()?;
//!
//! let report = aggregator.fetch_all().await?;
//! for w in &report.warnings {
//!     eprintln!("warning: {w}");
//! }
//! let health = monitor.snapshot();
//! ```
//!
//! See `verdant/examples/` for runnable demonstrations.
#![warn(missing_docs)]

mod aggregator;
mod backoff;
mod monitor;

pub use aggregator::{Aggregator, AggregatorBuilder};
pub use monitor::Monitor;

pub use verdant_core::{
    AggregateReport, AggregatorConfig, Alert, AlertCounts, AlertKind, BackoffConfig, CallMetric,
    CallObserver, DataQualitySummary, EsgDataPoint, FetchCause, FetchOutcome, HealthStatus,
    MergePolicy, MonitorConfig, NoopObserver, OffsetRule, OverallHealth, Pagination,
    PerformanceMetrics, PerformanceSummary, ProviderAdapter, ProviderHealth, ProviderStatus, QualityMetrics,
    QualityReport, QualityThresholds, QualityTrendPoint, RateLimitStatus, Registry, Reliability,
    RetryPolicy, Severity, SourceDescriptor, TaskHandle, Tier, VerdantError,
};
