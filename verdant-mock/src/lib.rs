//! verdant-mock
//!
//! Scripted in-memory provider adapter for tests and demos. Behaviour is set
//! up front through [`MockAdapter::builder`] and can be swapped at runtime with
//! [`MockAdapter::set_behavior`] to simulate outages and recoveries.
#![warn(missing_docs)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use verdant_core::{
    EntityKind, EsgDataPoint, MetricBag, Normalized, OffsetRule, Page, PageRequest, Pagination,
    Pillar, Provenance, ProviderAdapter, QualityProfile, RateLimit, RawPayload, Reliability,
    Scores, SourceDescriptor, Tier, VerdantError,
};

/// Fixture records.
pub mod fixtures;

/// One scripted page.
#[derive(Debug, Clone, PartialEq)]
pub struct MockPage {
    /// Records returned.
    pub records: Vec<Value>,
    /// Whether the page reports more data.
    pub has_more: bool,
}

impl MockPage {
    /// Page of `count` fixture records numbered from `start`.
    #[must_use]
    pub fn of(start: usize, count: usize, has_more: bool) -> Self {
        Self {
            records: fixtures::records(start, count),
            has_more,
        }
    }
}

/// How the mock answers `fetch_page`.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Serve a finite dataset sliced by offset and limit.
    Dataset(Vec<Value>),
    /// Every page is full and reports more data.
    Endless,
    /// Return these outcomes in order, then an empty final page.
    Script(Vec<Result<MockPage, VerdantError>>),
    /// Fail every call with the given error.
    Fail(VerdantError),
    /// Never answer (simulates a stalled connection).
    Hang,
}

struct State {
    behavior: MockBehavior,
    script: VecDeque<Result<MockPage, VerdantError>>,
    calls: Vec<PageRequest>,
}

/// Scripted provider adapter.
pub struct MockAdapter {
    descriptor: SourceDescriptor,
    pagination: Pagination,
    profile: QualityProfile,
    delay: Duration,
    remaining: Option<u64>,
    state: Mutex<State>,
}

impl MockAdapter {
    /// Start building a mock named `name`.
    #[must_use]
    pub fn builder(name: &str) -> MockAdapterBuilder {
        MockAdapterBuilder::new(name)
    }

    /// Replace the behaviour. Resets any pending script.
    pub fn set_behavior(&self, behavior: MockBehavior) {
        let mut st = self.lock();
        st.script = match &behavior {
            MockBehavior::Script(pages) => pages.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        st.behavior = behavior;
    }

    /// Page requests received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<PageRequest> {
        self.lock().calls.clone()
    }

    /// Number of page requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, req: &PageRequest, limit: usize) -> Option<Result<MockPage, VerdantError>> {
        let mut guard = self.lock();
        let st = &mut *guard;
        st.calls.push(req.clone());
        let out = match &st.behavior {
            MockBehavior::Dataset(rows) => {
                let start = req.offset.min(rows.len());
                let end = (req.offset + limit).min(rows.len());
                Ok(MockPage {
                    records: rows[start..end].to_vec(),
                    has_more: end < rows.len(),
                })
            }
            MockBehavior::Endless => Ok(MockPage::of(req.offset, limit, true)),
            MockBehavior::Script(_) => st.script.pop_front().unwrap_or(Ok(MockPage {
                records: Vec::new(),
                has_more: false,
            })),
            MockBehavior::Fail(e) => Err(e.clone()),
            MockBehavior::Hang => return None,
        };
        Some(out)
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }

    fn quality_profile(&self) -> QualityProfile {
        self.profile.clone()
    }

    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, VerdantError> {
        let limit = self.pagination.check(req.offset, req.limit)?;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let Some(outcome) = self.answer(req, limit) else {
            return std::future::pending().await;
        };
        let page = outcome?;
        Ok(Page {
            payload: RawPayload::new(page.records),
            has_more: page.has_more,
            endpoint: format!("mock://{}?offset={}&limit={}", self.descriptor.name, req.offset, limit),
            status: Some(200),
            rate_limit_remaining: self.remaining,
        })
    }

    fn normalize(&self, raw: &RawPayload) -> Normalized {
        let mut out = Normalized::default();
        for rec in &raw.records {
            let id = rec.get("id").and_then(Value::as_str).unwrap_or_default();
            let name = rec.get("name").and_then(Value::as_str).unwrap_or_default();
            if id.trim().is_empty() || name.trim().is_empty() {
                out.dropped += 1;
                continue;
            }
            let num = |k: &str| rec.get(k).and_then(Value::as_f64);
            let updated_at = match rec.get("updated_at").and_then(Value::as_str) {
                Some(s) => match DateTime::parse_from_rfc3339(s) {
                    Ok(t) => t.with_timezone(&Utc),
                    Err(_) => {
                        out.issues.push(format!("{id}: unparsable updated_at"));
                        Utc::now()
                    }
                },
                None => Utc::now(),
            };
            let mut metrics = MetricBag::default();
            for (key, pillar) in [
                ("co2_emissions", Pillar::Environmental),
                ("unemployment_rate", Pillar::Social),
                ("rule_of_law", Pillar::Governance),
            ] {
                if let Some(v) = num(key) {
                    metrics.insert(pillar, key, v);
                }
            }
            out.points.push(EsgDataPoint {
                entity_id: id.to_string(),
                entity_name: name.to_string(),
                entity_kind: match rec.get("kind").and_then(Value::as_str) {
                    Some("corporate") => EntityKind::Corporate,
                    _ => EntityKind::Sovereign,
                },
                provider: self.descriptor.name.clone(),
                metrics,
                scores: Scores {
                    overall: num("overall"),
                    environmental: num("environmental"),
                    social: num("social"),
                    governance: num("governance"),
                },
                updated_at,
                provenance: Provenance {
                    methodology: "mock fixtures".to_string(),
                    confidence: "high".to_string(),
                },
                sector: None,
                jurisdiction: None,
                reporting_year: None,
            });
        }
        out
    }
}

/// Builder for [`MockAdapter`].
pub struct MockAdapterBuilder {
    descriptor: SourceDescriptor,
    pagination: Pagination,
    profile: QualityProfile,
    delay: Duration,
    remaining: Option<u64>,
    behavior: MockBehavior,
}

impl MockAdapterBuilder {
    /// Free, high-reliability, unthrottled mock serving an empty dataset.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            descriptor: SourceDescriptor::new(name, Tier::Free, format!("mock://{name}"))
                .with_reliability(Reliability::High)
                .with_rate_limit(RateLimit::new(0, 0)),
            pagination: Pagination {
                offset_rule: OffsetRule::MultipleOf(1),
                max_page_size: 100,
                safety_ceiling: usize::MAX,
            },
            profile: QualityProfile::default().asserted(90.0, 90.0),
            delay: Duration::ZERO,
            remaining: None,
            behavior: MockBehavior::Dataset(Vec::new()),
        }
    }

    /// Use `descriptor` instead of the generated one.
    #[must_use]
    pub fn descriptor(mut self, descriptor: SourceDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Set the tier.
    #[must_use]
    pub const fn tier(mut self, tier: Tier) -> Self {
        self.descriptor.tier = tier;
        self
    }

    /// Set the reliability.
    #[must_use]
    pub const fn reliability(mut self, reliability: Reliability) -> Self {
        self.descriptor.reliability = reliability;
        self
    }

    /// Set the request budget, which drives the inter-page delay.
    #[must_use]
    pub const fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.descriptor.rate_limit = rate_limit;
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn call_timeout(mut self, timeout: Duration) -> Self {
        self.descriptor.call_timeout = timeout;
        self
    }

    /// Set the pagination contract.
    #[must_use]
    pub const fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the quality profile.
    #[must_use]
    pub fn profile(mut self, profile: QualityProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Delay every page by `delay`.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report `remaining` as the rate-limit hint on every page.
    #[must_use]
    pub const fn remaining(mut self, remaining: u64) -> Self {
        self.remaining = Some(remaining);
        self
    }

    /// Serve a finite dataset.
    #[must_use]
    pub fn dataset(mut self, records: Vec<Value>) -> Self {
        self.behavior = MockBehavior::Dataset(records);
        self
    }

    /// Serve `count` fixture records.
    #[must_use]
    pub fn records(self, count: usize) -> Self {
        self.dataset(fixtures::records(0, count))
    }

    /// Always report more data.
    #[must_use]
    pub fn endless(mut self) -> Self {
        self.behavior = MockBehavior::Endless;
        self
    }

    /// Return scripted outcomes in order.
    #[must_use]
    pub fn script(mut self, pages: Vec<Result<MockPage, VerdantError>>) -> Self {
        self.behavior = MockBehavior::Script(pages);
        self
    }

    /// Fail every call.
    #[must_use]
    pub fn fails_with(mut self, error: VerdantError) -> Self {
        self.behavior = MockBehavior::Fail(error);
        self
    }

    /// Never answer.
    #[must_use]
    pub fn hangs(mut self) -> Self {
        self.behavior = MockBehavior::Hang;
        self
    }

    /// Build the adapter.
    #[must_use]
    pub fn build(self) -> Arc<MockAdapter> {
        let adapter = MockAdapter {
            descriptor: self.descriptor,
            pagination: self.pagination,
            profile: self.profile,
            delay: self.delay,
            remaining: self.remaining,
            state: Mutex::new(State {
                behavior: MockBehavior::Dataset(Vec::new()),
                script: VecDeque::new(),
                calls: Vec::new(),
            }),
        };
        adapter.set_behavior(self.behavior);
        Arc::new(adapter)
    }
}
