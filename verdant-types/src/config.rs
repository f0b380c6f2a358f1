//! Configuration types shared by the aggregator and the monitor.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::descriptor::Reliability;

/// How provider failures affect a fan-out fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MergePolicy {
    /// Exclude failing providers and return whatever the rest produced.
    #[default]
    BestEffort,
    /// Any provider failure fails the whole fetch.
    FailFast,
}

/// Exponential backoff configuration for provider retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Minimum backoff delay in milliseconds.
    pub min_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 500,
            max_backoff_ms: 30_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

/// Retry behaviour applied by the aggregator to a failed provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per provider, including the first. `1` disables retries.
    pub max_attempts: u32,
    /// Delay schedule between attempts.
    pub backoff: BackoffConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Minimum acceptable quality for a provider batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Completeness below this adds a warning to the aggregate report.
    pub minimum_completeness: f64,
    /// Providers less reliable than this add a warning to the aggregate report.
    pub minimum_reliability: Reliability,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            minimum_completeness: 60.0,
            minimum_reliability: Reliability::Medium,
        }
    }
}

/// Configuration for the `Aggregator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Page size requested from each provider.
    pub batch_size: usize,
    /// Record ceiling per provider and fetch.
    pub max_records: usize,
    /// Entity filters forwarded verbatim to every provider.
    pub filters: BTreeMap<String, String>,
    /// Failure handling across providers.
    pub merge_policy: MergePolicy,
    /// Retry behaviour for failed providers.
    pub retry: RetryPolicy,
    /// Quality floor used to annotate reports.
    pub quality_thresholds: QualityThresholds,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_records: 1000,
            filters: BTreeMap::new(),
            merge_policy: MergePolicy::BestEffort,
            retry: RetryPolicy::default(),
            quality_thresholds: QualityThresholds::default(),
        }
    }
}

/// Configuration for the `Monitor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Call metrics kept per provider.
    pub max_metrics_per_provider: usize,
    /// Quality reports kept per provider.
    pub max_reports_per_provider: usize,
    /// Alerts kept globally.
    pub max_alerts: usize,
    /// Trailing window for the performance rule and snapshot figures.
    pub performance_window: Duration,
    /// Samples required before the performance rule fires.
    pub min_performance_samples: usize,
    /// Average latency above this is degraded.
    pub latency_threshold: Duration,
    /// Error rate (0-100) above this is degraded.
    pub error_rate_threshold: f64,
    /// Remaining budget below this raises a low-budget warning.
    pub rate_limit_low_watermark: u64,
    /// Quality score under this raises a warning.
    pub quality_warning_threshold: f64,
    /// Quality score under this raises a critical alert.
    pub quality_critical_threshold: f64,
    /// A provider without success for longer than this is offline.
    pub offline_after: Duration,
    /// Window in which alerts count as active.
    pub alert_window: Duration,
    /// Success rate (0-100) under this degrades the verdict.
    pub min_success_rate: f64,
    /// Interval between health-check rounds.
    pub health_check_interval: Duration,
    /// Timeout for one synthetic health check.
    pub health_check_timeout: Duration,
    /// Pause between providers inside one round.
    pub health_check_spacing: Duration,
    /// Entries older than this are removed by cleanup.
    pub retention: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_metrics_per_provider: 1000,
            max_reports_per_provider: 100,
            max_alerts: 500,
            performance_window: Duration::from_secs(60 * 60),
            min_performance_samples: 5,
            latency_threshold: Duration::from_secs(5),
            error_rate_threshold: 10.0,
            rate_limit_low_watermark: 5,
            quality_warning_threshold: 70.0,
            quality_critical_threshold: 50.0,
            offline_after: Duration::from_secs(10 * 60),
            alert_window: Duration::from_secs(60 * 60),
            min_success_rate: 90.0,
            health_check_interval: Duration::from_secs(5 * 60),
            health_check_timeout: Duration::from_secs(10),
            health_check_spacing: Duration::from_secs(1),
            retention: Duration::from_secs(24 * 60 * 60),
        }
    }
}
