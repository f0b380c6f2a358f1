use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use verdant_core::{CallMetric, QualityReport};

/// Call statistics over a trailing window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStats {
    pub samples: usize,
    pub failures: usize,
    pub latency_sum: Duration,
    pub rate_limit_hits: usize,
    pub records: usize,
}

impl WindowStats {
    pub fn avg_latency(&self) -> Duration {
        match u32::try_from(self.samples) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.latency_sum / n,
            Err(_) => Duration::ZERO,
        }
    }

    /// Failed share of calls, 0-100. Zero when no calls.
    #[allow(clippy::cast_precision_loss)]
    pub fn error_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.failures as f64 * 100.0 / self.samples as f64
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.samples += other.samples;
        self.failures += other.failures;
        self.latency_sum += other.latency_sum;
        self.rate_limit_hits += other.rate_limit_hits;
        self.records += other.records;
    }
}

/// Bounded per-provider history.
#[derive(Debug, Default)]
pub struct ProviderState {
    calls: VecDeque<CallMetric>,
    reports: VecDeque<QualityReport>,
    pub last_check: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub health_failed: bool,
    pub performance_degraded: bool,
}

impl ProviderState {
    pub fn push_call(&mut self, metric: CallMetric, cap: usize) {
        self.last_check = Some(later(self.last_check, metric.at));
        if metric.success {
            self.last_success = Some(later(self.last_success, metric.at));
        }
        self.calls.push_back(metric);
        while self.calls.len() > cap {
            self.calls.pop_front();
        }
    }

    pub fn push_report(&mut self, report: QualityReport, cap: usize) {
        self.reports.push_back(report);
        while self.reports.len() > cap {
            self.reports.pop_front();
        }
    }

    pub fn mark_check(&mut self, at: DateTime<Utc>, ok: bool) {
        self.last_check = Some(later(self.last_check, at));
        if ok {
            self.last_success = Some(later(self.last_success, at));
        }
    }

    /// True once any call or health check has been observed.
    pub fn observed(&self) -> bool {
        self.last_check.is_some()
    }

    #[cfg(test)]
    pub fn calls(&self) -> impl Iterator<Item = &CallMetric> {
        self.calls.iter()
    }

    pub fn reports(&self) -> impl Iterator<Item = &QualityReport> {
        self.reports.iter()
    }

    pub fn latest_report(&self) -> Option<&QualityReport> {
        self.reports.back()
    }

    pub fn latest_remaining(&self) -> Option<u64> {
        self.calls.iter().rev().find_map(|c| c.rate_limit_remaining)
    }

    /// Calls at or after `since`.
    pub fn window(&self, since: DateTime<Utc>) -> WindowStats {
        let mut stats = WindowStats::default();
        for c in self.calls.iter().filter(|c| c.at >= since) {
            stats.samples += 1;
            if !c.success {
                stats.failures += 1;
            }
            stats.latency_sum += c.latency;
            if c.rate_limit_remaining == Some(0) {
                stats.rate_limit_hits += 1;
            }
            stats.records += c.records;
        }
        stats
    }

    /// Drop calls and reports older than `cutoff`.
    pub fn evict_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.calls.len() + self.reports.len();
        self.calls.retain(|c| c.at >= cutoff);
        self.reports.retain(|r| r.assessed_at >= cutoff);
        before - self.calls.len() - self.reports.len()
    }
}

fn later(current: Option<DateTime<Utc>>, at: DateTime<Utc>) -> DateTime<Utc> {
    current.map_or(at, |c| c.max(at))
}
