use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use verdant_core::{FetchCause, ProviderAdapter, TaskHandle, VerdantError};

use super::{Monitor, lock, rules};

/// Clears the single-loop flag however the loop task ends.
struct LoopGuard(Arc<AtomicBool>);

impl Drop for LoopGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Monitor {
    /// Run one synthetic check against `adapter`, bounded by the configured
    /// health-check timeout. Returns whether it passed.
    ///
    /// A failure raises a critical `HealthCheckFailed` alert; the first pass
    /// after a failure raises an informational `HealthCheckPassed` alert.
    #[tracing::instrument(
        name = "verdant::monitor::health_check",
        skip(self, adapter),
        fields(provider = %adapter.name())
    )]
    pub async fn health_check(&self, adapter: &dyn ProviderAdapter) -> bool {
        let name = adapter.name();
        if !self.known(name) {
            tracing::warn!(provider = %name, "health check for unknown provider skipped");
            return false;
        }
        let timeout = self.cfg.health_check_timeout;
        let result = match tokio::time::timeout(timeout, adapter.health_check()).await {
            Ok(r) => r,
            Err(_) => Err(VerdantError::fetch(
                name,
                FetchCause::Timeout {
                    after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                },
            )),
        };

        let now = Utc::now();
        let ok = result.is_ok();
        let draft = {
            let state = self.state(name);
            let mut st = lock(&state);
            let was_failed = st.health_failed;
            st.mark_check(now, ok);
            st.health_failed = !ok;
            match &result {
                Err(e) => Some(rules::health_failed(name, &e.to_string())),
                Ok(()) if was_failed => Some(rules::health_recovered(name)),
                Ok(()) => None,
            }
        };
        if ok {
            tracing::debug!(provider = %name, "health check passed");
        }
        self.raise(name, now, draft.into_iter().collect());
        ok
    }

    /// Check every enabled provider in `adapters` sequentially, pausing
    /// between providers. Returns the verdict per provider.
    pub async fn run_health_checks(
        &self,
        adapters: &[Arc<dyn ProviderAdapter>],
    ) -> BTreeMap<String, bool> {
        let mut out = BTreeMap::new();
        let mut first = true;
        for a in adapters {
            if !self.registry.is_enabled(a.name()) {
                continue;
            }
            if !first {
                tokio::time::sleep(self.cfg.health_check_spacing).await;
            }
            first = false;
            let ok = self.health_check(a.as_ref()).await;
            out.insert(a.name().to_string(), ok);
        }
        out
    }

    /// Start the periodic health-check loop on a background task.
    ///
    /// The first round runs immediately; later rounds follow the configured
    /// interval and never overlap. Only one loop may run per monitor. The
    /// returned handle stops the loop on `stop()` or drop.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a zero interval and `Monitoring` when a
    /// loop is already running.
    pub fn spawn_health_checks(
        self: &Arc<Self>,
        adapters: Vec<Arc<dyn ProviderAdapter>>,
    ) -> Result<TaskHandle, VerdantError> {
        let interval = self.cfg.health_check_interval;
        if interval.is_zero() {
            return Err(VerdantError::invalid_config(
                "health check interval must be positive",
            ));
        }
        if self.health_loop.swap(true, Ordering::AcqRel) {
            return Err(VerdantError::Monitoring(
                "health check loop already running".into(),
            ));
        }

        let guard = LoopGuard(Arc::clone(&self.health_loop));
        let monitor = Arc::clone(self);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(async move {
            let _guard = guard;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let results = monitor.run_health_checks(&adapters).await;
                        let failed = results.values().filter(|ok| !**ok).count();
                        tracing::info!(checked = results.len(), failed, "health check round finished");
                    }
                }
            }
        });
        Ok(TaskHandle::new(join, stop_tx))
    }
}
