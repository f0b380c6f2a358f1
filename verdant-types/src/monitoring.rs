//! Call metrics, alerts and health snapshots exchanged with the monitor.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one outbound provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetric {
    /// Provider called.
    pub provider: String,
    /// Endpoint path or URL called.
    pub endpoint: String,
    /// Wall-clock latency.
    pub latency: Duration,
    /// Whether the call produced a usable response.
    pub success: bool,
    /// HTTP status, when one was received.
    pub status: Option<u16>,
    /// Error description for failed calls.
    pub error: Option<String>,
    /// Remaining request budget reported by or derived for the provider.
    pub rate_limit_remaining: Option<u64>,
    /// Raw records received.
    pub records: usize,
    /// When the call completed.
    pub at: DateTime<Utc>,
}

impl CallMetric {
    /// Successful call completed now.
    pub fn success(provider: impl Into<String>, endpoint: impl Into<String>, latency: Duration) -> Self {
        Self {
            provider: provider.into(),
            endpoint: endpoint.into(),
            latency,
            success: true,
            status: None,
            error: None,
            rate_limit_remaining: None,
            records: 0,
            at: Utc::now(),
        }
    }

    /// Failed call completed now.
    pub fn failure(
        provider: impl Into<String>,
        endpoint: impl Into<String>,
        latency: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::success(provider, endpoint, latency)
        }
    }

    /// Attach an HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a remaining-budget hint.
    #[must_use]
    pub const fn with_remaining(mut self, remaining: Option<u64>) -> Self {
        self.rate_limit_remaining = remaining;
        self
    }

    /// Attach the number of raw records received.
    #[must_use]
    pub const fn with_records(mut self, records: usize) -> Self {
        self.records = records;
        self
    }

    /// Override the completion timestamp.
    #[must_use]
    pub const fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

/// Alert severity, ordered `Info < Warning < Error < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Info,
    /// Needs attention.
    Warning,
    /// A call failed.
    Error,
    /// Service impact.
    Critical,
}

/// Condition that raised an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum AlertKind {
    /// A provider call failed.
    ApiFailure,
    /// Remaining request budget is nearly exhausted.
    RateLimitLow,
    /// Remaining request budget is exhausted.
    RateLimitExceeded,
    /// A quality report scored under threshold.
    QualityBelowThreshold,
    /// Trailing latency or error rate crossed a threshold.
    PerformanceDegraded,
    /// A synthetic health check failed.
    HealthCheckFailed,
    /// A synthetic health check passed after a failure.
    HealthCheckPassed,
}

/// Alert raised by a monitor rule. Alerts are never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Monotonic identifier within one monitor.
    pub id: u64,
    /// Triggering condition.
    pub kind: AlertKind,
    /// Severity derived from the condition.
    pub severity: Severity,
    /// Provider concerned.
    pub provider: String,
    /// When the alert was raised.
    pub at: DateTime<Utc>,
    /// Human-readable message.
    pub message: String,
    /// Structured context (thresholds, observed values).
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Per-provider status derived by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    /// Nothing observed yet.
    Unknown,
    /// Recently healthy and within thresholds.
    Online,
    /// Recently healthy but slow or erroring.
    Degraded,
    /// No recent success.
    Offline,
}

/// Overall verdict across providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    /// Nothing to report.
    Healthy,
    /// Warnings, low success rate or low quality.
    Degraded,
    /// A provider is offline or a critical alert is active.
    Unhealthy,
}

/// Request-budget headroom classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitStatus {
    /// Plenty of headroom, or no hint available.
    Ok,
    /// Under the low watermark.
    Warning,
    /// Exhausted.
    Exceeded,
}

/// Health of one provider inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealth {
    /// Derived status.
    pub status: ProviderStatus,
    /// Last call or health check, successful or not.
    pub last_check: Option<DateTime<Utc>>,
    /// Last successful call or health check.
    pub last_success: Option<DateTime<Utc>>,
    /// Average latency over the performance window.
    pub avg_response_time: Duration,
    /// Failed share of calls over the performance window, 0-100.
    pub error_rate: f64,
    /// Headroom according to the latest hint.
    pub rate_limit_status: RateLimitStatus,
    /// Calls inside the performance window.
    pub samples: usize,
}

/// Aggregate call performance inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Average latency across providers over the performance window.
    pub avg_response_time: Duration,
    /// Successful share of calls over the performance window, 0-100.
    pub success_rate: f64,
}

/// Aggregate data quality inside a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQualitySummary {
    /// Mean of the latest score per provider, if any report exists.
    pub average_score: Option<f64>,
    /// Latest score per provider.
    pub provider_scores: BTreeMap<String, f64>,
}

/// Alert counts over the active window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    /// Alerts raised within the active window.
    pub active: usize,
    /// Critical alerts within the active window.
    pub critical: usize,
    /// Warning alerts within the active window.
    pub warnings: usize,
}

/// Point-in-time health view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall verdict.
    pub overall: OverallHealth,
    /// Per-provider health keyed by provider name.
    pub providers: BTreeMap<String, ProviderHealth>,
    /// Call performance.
    pub performance: PerformanceSummary,
    /// Data quality.
    pub data_quality: DataQualitySummary,
    /// Alert counts.
    pub alerts: AlertCounts,
}

/// Call statistics over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Window the figures cover.
    pub window: Duration,
    /// Calls recorded.
    pub total_calls: usize,
    /// Successful calls.
    pub successful_calls: usize,
    /// Failed calls.
    pub failed_calls: usize,
    /// Mean latency, zero when no calls.
    pub avg_latency: Duration,
    /// Calls that reported an exhausted budget.
    pub rate_limit_hits: usize,
    /// Raw records received.
    pub records_fetched: usize,
}

/// One point of a quality trend series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityTrendPoint {
    /// Assessment time.
    pub at: DateTime<Utc>,
    /// Overall score.
    pub score: f64,
}
