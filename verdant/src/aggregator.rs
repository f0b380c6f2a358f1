use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use verdant_core::{
    AggregateReport, AggregatorConfig, CallObserver, FetchOutcome, MergePolicy, NoopObserver,
    ProviderAdapter, QualityReport, QualityThresholds, Registry, RetryPolicy, VerdantError,
};

use crate::backoff;
use crate::monitor::Monitor;

/// Orchestrator that fetches every eligible provider and merges the results.
pub struct Aggregator {
    registry: Arc<Registry>,
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    monitor: Option<Arc<Monitor>>,
    cfg: AggregatorConfig,
}

/// Builder for an [`Aggregator`].
pub struct AggregatorBuilder {
    registry: Option<Arc<Registry>>,
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    monitor: Option<Arc<Monitor>>,
    cfg: AggregatorConfig,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregatorBuilder {
    /// Empty builder with [`AggregatorConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: None,
            adapters: Vec::new(),
            monitor: None,
            cfg: AggregatorConfig::default(),
        }
    }

    /// Provider catalogue. Required.
    #[must_use]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register one adapter. Its name must exist in the registry.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Register several adapters.
    #[must_use]
    pub fn with_adapters<I>(mut self, adapters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ProviderAdapter>>,
    {
        self.adapters.extend(adapters);
        self
    }

    /// Mirror every call and quality report into `monitor`.
    #[must_use]
    pub fn monitor(mut self, monitor: Arc<Monitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: AggregatorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Records requested per page.
    #[must_use]
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.cfg.batch_size = batch_size;
        self
    }

    /// Upper bound on records fetched from one provider.
    #[must_use]
    pub const fn max_records(mut self, max_records: usize) -> Self {
        self.cfg.max_records = max_records;
        self
    }

    /// Add an entity filter forwarded verbatim to every provider call.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cfg.filters.insert(key.into(), value.into());
        self
    }

    /// How provider failures affect the batch.
    #[must_use]
    pub const fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.cfg.merge_policy = policy;
        self
    }

    /// Retry policy for retryable provider failures.
    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.cfg.retry = retry;
        self
    }

    /// Quality floor below which a batch is flagged in the warnings.
    #[must_use]
    pub const fn quality_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.cfg.quality_thresholds = thresholds;
        self
    }

    /// Build the aggregator.
    ///
    /// # Errors
    /// Returns `InvalidConfig` when no registry or adapter is set, a size is
    /// zero or two adapters share a name, and `NotFound` when an adapter name
    /// is missing from the registry.
    pub fn build(self) -> Result<Aggregator, VerdantError> {
        let registry = self.registry.ok_or_else(|| {
            VerdantError::invalid_config("no registry configured; set one via registry(...)")
        })?;
        if self.cfg.batch_size == 0 {
            return Err(VerdantError::invalid_config("batch_size must be positive"));
        }
        if self.cfg.max_records == 0 {
            return Err(VerdantError::invalid_config("max_records must be positive"));
        }
        if self.adapters.is_empty() {
            return Err(VerdantError::invalid_config(
                "no adapters registered; add at least one via with_adapter(...)",
            ));
        }
        let mut seen = HashSet::new();
        for a in &self.adapters {
            registry.get(a.name())?;
            if !seen.insert(a.name().to_string()) {
                return Err(VerdantError::invalid_config(format!(
                    "adapter {} registered twice",
                    a.name()
                )));
            }
        }

        Ok(Aggregator {
            registry,
            adapters: self.adapters,
            monitor: self.monitor,
            cfg: self.cfg,
        })
    }
}

impl Aggregator {
    /// Start building an aggregator.
    #[must_use]
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &AggregatorConfig {
        &self.cfg
    }

    /// Provider catalogue.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn adapter(&self, name: &str) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.iter().find(|a| a.name() == name)
    }

    /// Fetch every eligible provider concurrently and merge the batches.
    ///
    /// Providers are visited in registry priority order. Those without an
    /// adapter are skipped; those without a usable credential are skipped with
    /// a `MissingCredential` warning. Provider failures become warnings under
    /// [`MergePolicy::BestEffort`]; a configuration fault raised by one
    /// adapter only excludes that provider, as `Misconfigured`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` before any call when the batch size breaks an
    /// eligible provider's pagination rule, and `AllProvidersFailed` under
    /// [`MergePolicy::FailFast`] when any provider fails.
    #[tracing::instrument(name = "verdant::aggregator::fetch_all", skip(self))]
    pub async fn fetch_all(&self) -> Result<AggregateReport, VerdantError> {
        let mut report = AggregateReport::default();
        let mut eligible: Vec<&Arc<dyn ProviderAdapter>> = Vec::new();

        for name in self.registry.priority_order() {
            let Some(adapter) = self.adapter(name) else {
                tracing::debug!(provider = %name, "no adapter registered; skipping");
                continue;
            };
            if !self.registry.has_valid_credential(name) {
                tracing::warn!(provider = %name, "credential missing; skipping");
                report.warnings.push(VerdantError::MissingCredential {
                    provider: name.to_string(),
                });
                continue;
            }
            eligible.push(adapter);
        }

        for adapter in &eligible {
            adapter
                .pagination()
                .batch(self.cfg.batch_size)
                .map_err(|e| match e {
                    VerdantError::InvalidConfig(msg) => {
                        VerdantError::invalid_config(format!("{}: {msg}", adapter.name()))
                    }
                    other => other,
                })?;
        }

        let observer: &dyn CallObserver = match self.monitor.as_deref() {
            Some(m) => m,
            None => &NoopObserver,
        };
        let results = futures::future::join_all(
            eligible
                .iter()
                .map(|a| self.fetch_provider(a.as_ref(), observer)),
        )
        .await;

        let mut failures = Vec::new();
        for (adapter, result) in eligible.iter().zip(results) {
            let name = adapter.name();
            match result {
                Ok(outcome) => self.merge(adapter.as_ref(), outcome, &mut report),
                Err(e) => {
                    let e = e.scoped_to(name);
                    tracing::warn!(provider = %name, error = %e, "provider failed");
                    failures.push(e.clone());
                    report.warnings.push(e);
                }
            }
        }

        if self.cfg.merge_policy == MergePolicy::FailFast && !failures.is_empty() {
            return Err(VerdantError::AllProvidersFailed(failures));
        }
        tracing::debug!(
            points = report.data_points.len(),
            providers = report.quality_reports.len(),
            warnings = report.warnings.len(),
            "aggregation finished"
        );
        Ok(report)
    }

    async fn fetch_provider(
        &self,
        adapter: &dyn ProviderAdapter,
        observer: &dyn CallObserver,
    ) -> Result<FetchOutcome, VerdantError> {
        let attempts = self.cfg.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let result = adapter
                .fetch_all(
                    self.cfg.batch_size,
                    self.cfg.max_records,
                    &self.cfg.filters,
                    observer,
                )
                .await;
            match result {
                Err(e) if attempt < attempts && e.is_retryable() => {
                    let delay = backoff::retry_delay(&self.cfg.retry.backoff, attempt);
                    tracing::debug!(
                        provider = %adapter.name(),
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "retrying provider"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn merge(
        &self,
        adapter: &dyn ProviderAdapter,
        outcome: FetchOutcome,
        report: &mut AggregateReport,
    ) {
        let name = adapter.name();
        let (points, foreign): (Vec<_>, Vec<_>) = outcome
            .points
            .into_iter()
            .partition(|p| p.provider == name);
        if !foreign.is_empty() {
            tracing::warn!(provider = %name, count = foreign.len(), "dropping mistagged records");
            report.warnings.push(VerdantError::transform(
                name,
                format!("{} records carried another provider tag", foreign.len()),
            ));
        }

        let quality = adapter.assess_quality(&points, &outcome.issues);
        if let Some(m) = &self.monitor {
            m.record_quality(quality.clone());
        }
        report
            .warnings
            .extend(self.threshold_warnings(adapter, &quality));
        report.data_points.extend(points);
        report.quality_reports.push(quality);
    }

    fn threshold_warnings(
        &self,
        adapter: &dyn ProviderAdapter,
        quality: &QualityReport,
    ) -> Vec<VerdantError> {
        let t = &self.cfg.quality_thresholds;
        let mut out = Vec::new();
        if quality.metrics.completeness < t.minimum_completeness {
            out.push(VerdantError::LowQuality {
                provider: quality.provider.clone(),
                reason: format!(
                    "completeness {:.1} below {:.1}",
                    quality.metrics.completeness, t.minimum_completeness
                ),
            });
        }
        let reliability = adapter.descriptor().reliability;
        if reliability < t.minimum_reliability {
            out.push(VerdantError::LowQuality {
                provider: quality.provider.clone(),
                reason: format!(
                    "reliability {reliability:?} below {:?}",
                    t.minimum_reliability
                ),
            });
        }
        for w in &out {
            tracing::warn!(provider = %quality.provider, warning = %w, "quality below threshold");
        }
        out
    }

    /// Entity filters applied to every provider call.
    #[must_use]
    pub const fn filters(&self) -> &BTreeMap<String, String> {
        &self.cfg.filters
    }
}
