//! Pure alert rules. Each returns the alerts a fresh observation warrants.

use serde_json::{Map, Value, json};
use verdant_core::{
    AlertKind, CallMetric, MonitorConfig, OverallHealth, ProviderStatus, QualityReport,
    RateLimitStatus, Severity,
};

use super::history::WindowStats;

/// Alert before it is stamped with an id, provider and time.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub metadata: Map<String, Value>,
}

impl AlertDraft {
    fn new(kind: AlertKind, severity: Severity, message: String, metadata: Value) -> Self {
        let metadata = match metadata {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        Self {
            kind,
            severity,
            message,
            metadata,
        }
    }
}

pub fn api_failure(metric: &CallMetric) -> Option<AlertDraft> {
    if metric.success {
        return None;
    }
    let error = metric.error.as_deref().unwrap_or("unknown error");
    Some(AlertDraft::new(
        AlertKind::ApiFailure,
        Severity::Error,
        format!("{} call to {} failed: {error}", metric.provider, metric.endpoint),
        json!({
            "endpoint": metric.endpoint,
            "status": metric.status,
            "error": error,
        }),
    ))
}

pub fn rate_limit(metric: &CallMetric, cfg: &MonitorConfig) -> Option<AlertDraft> {
    let remaining = metric.rate_limit_remaining?;
    match rate_limit_status(Some(remaining), cfg) {
        RateLimitStatus::Exceeded => Some(AlertDraft::new(
            AlertKind::RateLimitExceeded,
            Severity::Critical,
            format!("{} request budget exhausted", metric.provider),
            json!({ "remaining": remaining }),
        )),
        RateLimitStatus::Warning => Some(AlertDraft::new(
            AlertKind::RateLimitLow,
            Severity::Warning,
            format!("{} has {remaining} requests left", metric.provider),
            json!({
                "remaining": remaining,
                "watermark": cfg.rate_limit_low_watermark,
            }),
        )),
        RateLimitStatus::Ok => None,
    }
}

pub fn rate_limit_status(remaining: Option<u64>, cfg: &MonitorConfig) -> RateLimitStatus {
    match remaining {
        Some(0) => RateLimitStatus::Exceeded,
        Some(n) if n < cfg.rate_limit_low_watermark => RateLimitStatus::Warning,
        _ => RateLimitStatus::Ok,
    }
}

/// True when the window has enough samples and breaches a threshold.
pub fn is_degraded(stats: &WindowStats, cfg: &MonitorConfig) -> bool {
    stats.samples >= cfg.min_performance_samples
        && (stats.avg_latency() > cfg.latency_threshold
            || stats.error_rate() > cfg.error_rate_threshold)
}

/// Fires on the transition into a degraded window only.
pub fn performance(
    provider: &str,
    stats: &WindowStats,
    was_degraded: bool,
    cfg: &MonitorConfig,
) -> Option<AlertDraft> {
    if was_degraded || !is_degraded(stats, cfg) {
        return None;
    }
    let avg_ms = u64::try_from(stats.avg_latency().as_millis()).unwrap_or(u64::MAX);
    Some(AlertDraft::new(
        AlertKind::PerformanceDegraded,
        Severity::Warning,
        format!(
            "{provider} degraded: avg latency {avg_ms} ms, error rate {:.1}%",
            stats.error_rate()
        ),
        json!({
            "samples": stats.samples,
            "avg_latency_ms": avg_ms,
            "error_rate": stats.error_rate(),
        }),
    ))
}

pub fn quality(report: &QualityReport, cfg: &MonitorConfig) -> Option<AlertDraft> {
    let severity = if report.overall < cfg.quality_critical_threshold {
        Severity::Critical
    } else if report.overall < cfg.quality_warning_threshold {
        Severity::Warning
    } else {
        return None;
    };
    Some(AlertDraft::new(
        AlertKind::QualityBelowThreshold,
        severity,
        format!(
            "{} quality score {:.1} below threshold",
            report.provider, report.overall
        ),
        json!({
            "score": report.overall,
            "records": report.record_count,
            "warning_threshold": cfg.quality_warning_threshold,
            "critical_threshold": cfg.quality_critical_threshold,
        }),
    ))
}

pub fn health_failed(provider: &str, error: &str) -> AlertDraft {
    AlertDraft::new(
        AlertKind::HealthCheckFailed,
        Severity::Critical,
        format!("{provider} health check failed: {error}"),
        json!({ "error": error }),
    )
}

pub fn health_recovered(provider: &str) -> AlertDraft {
    AlertDraft::new(
        AlertKind::HealthCheckPassed,
        Severity::Info,
        format!("{provider} health check passed"),
        json!({}),
    )
}

/// Status of one provider from what has been observed.
pub fn provider_status(
    observed: bool,
    recently_successful: bool,
    stats: &WindowStats,
    cfg: &MonitorConfig,
) -> ProviderStatus {
    if !observed {
        ProviderStatus::Unknown
    } else if !recently_successful {
        ProviderStatus::Offline
    } else if is_degraded(stats, cfg) {
        ProviderStatus::Degraded
    } else {
        ProviderStatus::Online
    }
}

/// Inputs to the overall verdict.
#[derive(Debug, Clone, Copy)]
pub struct Verdict {
    pub any_offline: bool,
    pub any_degraded: bool,
    pub critical_alerts: usize,
    pub warning_alerts: usize,
    pub success_rate: f64,
    pub average_quality: Option<f64>,
}

pub fn overall(v: &Verdict, cfg: &MonitorConfig) -> OverallHealth {
    let q = v.average_quality;
    if v.any_offline
        || v.critical_alerts > 0
        || q.is_some_and(|s| s < cfg.quality_critical_threshold)
    {
        OverallHealth::Unhealthy
    } else if v.warning_alerts > 0
        || v.any_degraded
        || v.success_rate < cfg.min_success_rate
        || q.is_some_and(|s| s < cfg.quality_warning_threshold)
    {
        OverallHealth::Degraded
    } else {
        OverallHealth::Healthy
    }
}
