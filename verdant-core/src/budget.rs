//! Windowed request budget used to derive remaining-rate-limit hints when a
//! provider does not report one itself.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Counter of calls made inside a fixed, boundary-aligned window.
#[derive(Debug)]
pub struct RateBudget {
    limit: u64,
    window: Duration,
    runtime: Mutex<BudgetRuntime>,
}

#[derive(Debug)]
struct BudgetRuntime {
    used: u64,
    window_start: Instant,
}

impl RateBudget {
    /// Budget of `limit` calls per `window`. A zero limit tracks nothing.
    #[must_use]
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            limit,
            window,
            runtime: Mutex::new(BudgetRuntime {
                used: 0,
                window_start: Instant::now(),
            }),
        }
    }

    /// Daily budget of `limit` calls.
    #[must_use]
    pub fn daily(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(24 * 60 * 60))
    }

    /// Count one call and return the units left in the current window.
    ///
    /// Returns `None` for an unlimited budget.
    pub fn consume(&self) -> Option<u64> {
        if self.limit == 0 || self.window.is_zero() {
            return None;
        }
        let mut rt = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
        self.roll(&mut rt);
        rt.used = rt.used.saturating_add(1);
        Some(self.limit.saturating_sub(rt.used))
    }

    /// Units left in the current window without consuming any.
    pub fn remaining(&self) -> Option<u64> {
        if self.limit == 0 || self.window.is_zero() {
            return None;
        }
        let mut rt = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
        self.roll(&mut rt);
        Some(self.limit.saturating_sub(rt.used))
    }

    fn roll(&self, rt: &mut BudgetRuntime) {
        let elapsed = Instant::now().duration_since(rt.window_start);
        if elapsed >= self.window {
            rt.used = 0;
            // Keep windows aligned to regular boundaries across idle gaps.
            let windows_passed = elapsed.as_nanos() / self.window.as_nanos();
            let offset = Duration::from_nanos(
                (windows_passed * self.window.as_nanos())
                    .try_into()
                    .unwrap_or(u64::MAX),
            );
            rt.window_start += offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_resets_on_window_boundary() {
        let budget = RateBudget::new(3, Duration::from_secs(60));
        assert_eq!(budget.consume(), Some(2));
        assert_eq!(budget.consume(), Some(1));
        assert_eq!(budget.consume(), Some(0));
        assert_eq!(budget.consume(), Some(0));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(budget.remaining(), Some(3));
        assert_eq!(budget.consume(), Some(2));
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let budget = RateBudget::daily(0);
        assert_eq!(budget.consume(), None);
        assert_eq!(budget.remaining(), None);
    }
}
