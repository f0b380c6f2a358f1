use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use verdant_core::{
    Alert, AlertCounts, CallMetric, CallObserver, DataQualitySummary, HealthStatus,
    MonitorConfig, PerformanceMetrics, PerformanceSummary, ProviderHealth, ProviderStatus,
    QualityReport, QualityTrendPoint, RateLimitStatus, Registry, Severity,
};

mod health;
mod history;
mod rules;

use history::{ProviderState, WindowStats};
use rules::AlertDraft;

#[derive(Debug, Default)]
struct AlertLog {
    next_id: u64,
    entries: VecDeque<Alert>,
}

/// Records provider call metrics and quality reports, raises alerts and
/// derives health snapshots.
///
/// Per-provider histories sit behind their own mutex; the outer map lock is
/// held only to find the entry. Alerts share one global log. Invalid input is
/// logged and dropped, and poisoned locks are recovered.
pub struct Monitor {
    registry: Arc<Registry>,
    cfg: MonitorConfig,
    providers: RwLock<HashMap<String, Arc<Mutex<ProviderState>>>>,
    alerts: Mutex<AlertLog>,
    health_loop: Arc<AtomicBool>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `now - d`, saturating at the earliest representable instant.
fn ago(now: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(d)
        .ok()
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl Monitor {
    /// New monitor over the providers in `registry`.
    #[must_use]
    pub fn new(registry: Arc<Registry>, cfg: MonitorConfig) -> Self {
        Self {
            registry,
            cfg,
            providers: RwLock::new(HashMap::new()),
            alerts: Mutex::new(AlertLog::default()),
            health_loop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    /// Provider catalogue.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn existing(&self, provider: &str) -> Option<Arc<Mutex<ProviderState>>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .cloned()
    }

    fn state(&self, provider: &str) -> Arc<Mutex<ProviderState>> {
        if let Some(s) = self.existing(provider) {
            return s;
        }
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(provider.to_string())
            .or_default()
            .clone()
    }

    fn known(&self, provider: &str) -> bool {
        !provider.trim().is_empty() && self.registry.get(provider).is_ok()
    }

    fn raise(&self, provider: &str, at: DateTime<Utc>, drafts: Vec<AlertDraft>) {
        if drafts.is_empty() {
            return;
        }
        let mut log = lock(&self.alerts);
        for d in drafts {
            match d.severity {
                Severity::Info => tracing::info!(provider = %provider, kind = ?d.kind, "{}", d.message),
                _ => tracing::warn!(
                    provider = %provider,
                    kind = ?d.kind,
                    severity = ?d.severity,
                    "{}",
                    d.message
                ),
            }
            let id = log.next_id;
            log.next_id += 1;
            log.entries.push_back(Alert {
                id,
                kind: d.kind,
                severity: d.severity,
                provider: provider.to_string(),
                at,
                message: d.message,
                metadata: d.metadata,
            });
            while log.entries.len() > self.cfg.max_alerts {
                log.entries.pop_front();
            }
        }
    }

    /// Record one provider call and evaluate the failure, rate-limit and
    /// performance rules.
    pub fn record_call(&self, metric: CallMetric) {
        if !self.known(&metric.provider) {
            tracing::warn!(provider = %metric.provider, "dropping call metric for unknown provider");
            return;
        }
        let now = Utc::now().max(metric.at);
        let provider = metric.provider.clone();
        let mut drafts = Vec::new();
        drafts.extend(rules::api_failure(&metric));
        drafts.extend(rules::rate_limit(&metric, &self.cfg));
        {
            let state = self.state(&provider);
            let mut st = lock(&state);
            st.push_call(metric, self.cfg.max_metrics_per_provider);
            let stats = st.window(ago(now, self.cfg.performance_window));
            drafts.extend(rules::performance(
                &provider,
                &stats,
                st.performance_degraded,
                &self.cfg,
            ));
            st.performance_degraded = rules::is_degraded(&stats, &self.cfg);
        }
        self.raise(&provider, now, drafts);
    }

    /// Record one batch quality report and evaluate the quality rule.
    pub fn record_quality(&self, report: QualityReport) {
        if !self.known(&report.provider) {
            tracing::warn!(provider = %report.provider, "dropping quality report for unknown provider");
            return;
        }
        if !report.is_well_formed() {
            tracing::warn!(provider = %report.provider, "dropping malformed quality report");
            return;
        }
        let provider = report.provider.clone();
        let at = report.assessed_at;
        let draft = rules::quality(&report, &self.cfg);
        {
            let state = self.state(&provider);
            lock(&state).push_report(report, self.cfg.max_reports_per_provider);
        }
        self.raise(&provider, at, draft.into_iter().collect());
    }

    /// Point-in-time health view.
    #[must_use]
    pub fn snapshot(&self) -> HealthStatus {
        self.snapshot_at(Utc::now())
    }

    /// Health view as of `now`. Does not modify any state.
    #[must_use]
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> HealthStatus {
        let window_start = ago(now, self.cfg.performance_window);
        let offline_cut = ago(now, self.cfg.offline_after);

        let mut providers = BTreeMap::new();
        let mut provider_scores = BTreeMap::new();
        let mut total = WindowStats::default();
        let mut any_offline = false;
        let mut any_degraded = false;

        for d in self.registry.list_enabled() {
            let health = match self.existing(&d.name) {
                None => ProviderHealth {
                    status: ProviderStatus::Unknown,
                    last_check: None,
                    last_success: None,
                    avg_response_time: Duration::ZERO,
                    error_rate: 0.0,
                    rate_limit_status: RateLimitStatus::Ok,
                    samples: 0,
                },
                Some(state) => {
                    let st = lock(&state);
                    let stats = st.window(window_start);
                    let recent = st.last_success.is_some_and(|t| t >= offline_cut);
                    if let Some(r) = st.latest_report() {
                        provider_scores.insert(d.name.clone(), r.overall);
                    }
                    total.merge(stats);
                    ProviderHealth {
                        status: rules::provider_status(st.observed(), recent, &stats, &self.cfg),
                        last_check: st.last_check,
                        last_success: st.last_success,
                        avg_response_time: stats.avg_latency(),
                        error_rate: stats.error_rate(),
                        rate_limit_status: rules::rate_limit_status(
                            st.latest_remaining(),
                            &self.cfg,
                        ),
                        samples: stats.samples,
                    }
                }
            };
            any_offline |= health.status == ProviderStatus::Offline;
            any_degraded |= health.status == ProviderStatus::Degraded;
            providers.insert(d.name.clone(), health);
        }

        #[allow(clippy::cast_precision_loss)]
        let average_score = (!provider_scores.is_empty())
            .then(|| provider_scores.values().sum::<f64>() / provider_scores.len() as f64);
        let success_rate = 100.0 - total.error_rate();
        let alerts = self.alert_counts(ago(now, self.cfg.alert_window));

        let verdict = rules::Verdict {
            any_offline,
            any_degraded,
            critical_alerts: alerts.critical,
            warning_alerts: alerts.warnings,
            success_rate,
            average_quality: average_score,
        };
        HealthStatus {
            overall: rules::overall(&verdict, &self.cfg),
            providers,
            performance: PerformanceSummary {
                avg_response_time: total.avg_latency(),
                success_rate,
            },
            data_quality: DataQualitySummary {
                average_score,
                provider_scores,
            },
            alerts,
        }
    }

    /// Counts alerts raised at or after `since`. `warnings` includes
    /// `Error` severity.
    fn alert_counts(&self, since: DateTime<Utc>) -> AlertCounts {
        let log = lock(&self.alerts);
        let mut counts = AlertCounts::default();
        for a in log.entries.iter().filter(|a| a.at >= since) {
            counts.active += 1;
            match a.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Warning | Severity::Error => counts.warnings += 1,
                Severity::Info => {}
            }
        }
        counts
    }

    /// Up to `limit` alerts, newest first.
    #[must_use]
    pub fn recent_alerts(&self, limit: usize) -> Vec<Alert> {
        lock(&self.alerts)
            .entries
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Call statistics across all providers over the trailing `window`.
    #[must_use]
    pub fn performance_metrics(&self, window: Duration) -> PerformanceMetrics {
        self.performance_metrics_at(window, Utc::now())
    }

    /// [`Monitor::performance_metrics`] as of `now`.
    #[must_use]
    pub fn performance_metrics_at(&self, window: Duration, now: DateTime<Utc>) -> PerformanceMetrics {
        let since = ago(now, window);
        let mut total = WindowStats::default();
        for state in self.states() {
            total.merge(lock(&state).window(since));
        }
        PerformanceMetrics {
            window,
            total_calls: total.samples,
            successful_calls: total.samples - total.failures,
            failed_calls: total.failures,
            avg_latency: total.avg_latency(),
            rate_limit_hits: total.rate_limit_hits,
            records_fetched: total.records,
        }
    }

    /// Per-provider quality scores assessed within the trailing `window`,
    /// oldest first. Providers without reports are omitted.
    #[must_use]
    pub fn quality_trends(&self, window: Duration) -> BTreeMap<String, Vec<QualityTrendPoint>> {
        self.quality_trends_at(window, Utc::now())
    }

    /// [`Monitor::quality_trends`] as of `now`.
    #[must_use]
    pub fn quality_trends_at(
        &self,
        window: Duration,
        now: DateTime<Utc>,
    ) -> BTreeMap<String, Vec<QualityTrendPoint>> {
        let since = ago(now, window);
        let entries: Vec<(String, Arc<Mutex<ProviderState>>)> = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();

        let mut out = BTreeMap::new();
        for (name, state) in entries {
            let series: Vec<QualityTrendPoint> = lock(&state)
                .reports()
                .filter(|r| r.assessed_at >= since)
                .map(|r| QualityTrendPoint {
                    at: r.assessed_at,
                    score: r.overall,
                })
                .collect();
            if !series.is_empty() {
                out.insert(name, series);
            }
        }
        out
    }

    /// Evict metrics, reports and alerts older than the retention window.
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Utc::now())
    }

    /// [`Monitor::cleanup`] as of `now`.
    pub fn cleanup_at(&self, now: DateTime<Utc>) -> usize {
        let cutoff = ago(now, self.cfg.retention);
        let mut removed = 0;
        for state in self.states() {
            removed += lock(&state).evict_before(cutoff);
        }
        {
            let mut log = lock(&self.alerts);
            let before = log.entries.len();
            log.entries.retain(|a| a.at >= cutoff);
            removed += before - log.entries.len();
        }
        tracing::debug!(removed, "monitor cleanup");
        removed
    }

    fn states(&self) -> Vec<Arc<Mutex<ProviderState>>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

impl CallObserver for Monitor {
    fn on_call(&self, metric: CallMetric) {
        self.record_call(metric);
    }
}
