use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use verdant_types::{
    CallMetric, EsgDataPoint, FetchCause, QualityReport, SourceDescriptor, VerdantError,
};

use crate::quality::{QualityProfile, assess};

/// Offsets a provider accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetRule {
    /// Offsets must be a multiple of a fixed page granularity.
    MultipleOf(usize),
    /// Offsets must be a multiple of the requested (capped) limit, as with
    /// page-number APIs.
    MultipleOfLimit,
}

/// Pagination contract of one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Accepted offsets.
    pub offset_rule: OffsetRule,
    /// Largest page the provider serves; larger limits are capped.
    pub max_page_size: usize,
    /// Hard cap on records fetched by one pagination loop.
    pub safety_ceiling: usize,
}

impl Pagination {
    /// Validate a page request and return the limit capped to `max_page_size`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a zero limit or an offset that violates the
    /// offset rule.
    pub fn check(&self, offset: usize, limit: usize) -> Result<usize, VerdantError> {
        if limit == 0 {
            return Err(VerdantError::invalid_config("page limit must be positive"));
        }
        let limit = limit.min(self.max_page_size.max(1));
        let step = match self.offset_rule {
            OffsetRule::MultipleOf(n) => n.max(1),
            OffsetRule::MultipleOfLimit => limit,
        };
        if offset % step != 0 {
            return Err(VerdantError::invalid_config(format!(
                "offset {offset} is not a multiple of page granularity {step}"
            )));
        }
        Ok(limit)
    }

    /// Validate the page size of a whole pagination loop and return it capped
    /// to `max_page_size`. Every offset the loop derives from it stays on the
    /// offset rule.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a zero size, or one that is not a multiple
    /// of a fixed page granularity.
    pub fn batch(&self, batch_size: usize) -> Result<usize, VerdantError> {
        let batch = self.check(0, batch_size)?;
        if let OffsetRule::MultipleOf(step) = self.offset_rule
            && batch % step.max(1) != 0
        {
            return Err(VerdantError::invalid_config(format!(
                "batch size {batch} is not a multiple of page granularity {step}"
            )));
        }
        Ok(batch)
    }
}

/// Parameters of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageRequest {
    /// Zero-based record offset.
    pub offset: usize,
    /// Requested page size.
    pub limit: usize,
    /// Entity filters forwarded verbatim to the provider.
    pub filters: BTreeMap<String, String>,
}

impl PageRequest {
    /// Request without filters.
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            filters: BTreeMap::new(),
        }
    }
}

/// Provider records not yet mapped into the canonical shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPayload {
    /// One JSON value per raw record.
    pub records: Vec<Value>,
}

impl RawPayload {
    /// Wrap raw records.
    #[must_use]
    pub const fn new(records: Vec<Value>) -> Self {
        Self { records }
    }

    /// Number of raw records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the payload holds no record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    /// Raw records of this page.
    pub payload: RawPayload,
    /// Whether the provider reports more records after this page.
    pub has_more: bool,
    /// Endpoint that served the page.
    pub endpoint: String,
    /// HTTP status, when the transport has one.
    pub status: Option<u16>,
    /// Remaining request budget, when known.
    pub rate_limit_remaining: Option<u64>,
}

/// Output of [`ProviderAdapter::normalize`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    /// Canonical records.
    pub points: Vec<EsgDataPoint>,
    /// Record-level transform issues.
    pub issues: Vec<String>,
    /// Records dropped because they could not be identified.
    pub dropped: usize,
}

/// Output of a full pagination loop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchOutcome {
    /// Canonical records in arrival order.
    pub points: Vec<EsgDataPoint>,
    /// Transform issues collected while normalizing.
    pub issues: Vec<String>,
    /// Pages (HTTP calls) issued.
    pub pages: usize,
    /// Raw records received, after the ceiling was applied.
    pub raw_records: usize,
}

/// Receiver for per-call metrics emitted by adapters.
pub trait CallObserver: Send + Sync {
    /// Record the outcome of one provider call.
    fn on_call(&self, metric: CallMetric);
}

/// Observer that discards every metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CallObserver for NoopObserver {
    fn on_call(&self, _metric: CallMetric) {}
}

/// Contract every provider integration implements.
///
/// Adapters issue one HTTP call per page, never retry, and report failures as
/// [`VerdantError::ProviderFetch`]. Invalid offsets or limits are
/// [`VerdantError::InvalidConfig`].
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Descriptor this adapter was built from.
    fn descriptor(&self) -> &SourceDescriptor;

    /// Provider name, the tag carried by every produced record.
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Pagination contract.
    fn pagination(&self) -> Pagination;

    /// Quality assumptions used by [`ProviderAdapter::assess_quality`].
    fn quality_profile(&self) -> QualityProfile {
        QualityProfile::default()
    }

    /// Fetch one page with exactly one provider call.
    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, VerdantError>;

    /// Map raw records into canonical data points.
    fn normalize(&self, raw: &RawPayload) -> Normalized;

    /// Fetch sequential pages until the provider is exhausted or `max_records`
    /// raw records were received, then normalize them.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for unusable batch/record sizes and the first
    /// `ProviderFetch` failure encountered.
    async fn fetch_all(
        &self,
        batch_size: usize,
        max_records: usize,
        filters: &BTreeMap<String, String>,
        observer: &dyn CallObserver,
    ) -> Result<FetchOutcome, VerdantError> {
        paginate(self, batch_size, max_records, filters, observer).await
    }

    /// Assess a batch produced by this adapter.
    fn assess_quality(&self, points: &[EsgDataPoint], issues: &[String]) -> QualityReport {
        let d = self.descriptor();
        assess(
            &d.name,
            d.reliability,
            &self.quality_profile(),
            points,
            issues,
            chrono::Utc::now(),
        )
    }

    /// Issue one lightweight synthetic call.
    ///
    /// # Errors
    /// Returns the provider failure when the call does not succeed.
    async fn health_check(&self) -> Result<(), VerdantError> {
        self.fetch_page(&PageRequest::new(0, 1)).await.map(|_| ())
    }
}

/// Sequential pagination loop shared by all adapters.
///
/// Calls are strictly sequential, bounded by the descriptor's per-call timeout
/// and separated by the rate-limit derived inter-page delay. Every issued call
/// yields exactly one [`CallMetric`].
///
/// # Errors
/// See [`ProviderAdapter::fetch_all`].
#[tracing::instrument(
    name = "verdant::adapter::fetch_all",
    skip(adapter, filters, observer),
    fields(provider = %adapter.name())
)]
pub async fn paginate<A: ProviderAdapter + ?Sized>(
    adapter: &A,
    batch_size: usize,
    max_records: usize,
    filters: &BTreeMap<String, String>,
    observer: &dyn CallObserver,
) -> Result<FetchOutcome, VerdantError> {
    if batch_size == 0 {
        return Err(VerdantError::invalid_config("batch size must be positive"));
    }
    if max_records == 0 {
        return Err(VerdantError::invalid_config("max records must be positive"));
    }

    let descriptor = adapter.descriptor();
    let pagination = adapter.pagination();
    let batch = pagination.batch(batch_size)?;
    let ceiling = max_records.min(pagination.safety_ceiling);
    let delay = descriptor.rate_limit.inter_page_delay();

    let mut records = Vec::new();
    let mut offset = 0usize;
    let mut pages = 0usize;
    loop {
        let req = PageRequest {
            offset,
            limit: batch,
            filters: filters.clone(),
        };
        let started = Instant::now();
        let result = tokio::time::timeout(descriptor.call_timeout, adapter.fetch_page(&req))
            .await
            .unwrap_or_else(|_| {
                Err(VerdantError::fetch(
                    &descriptor.name,
                    FetchCause::Timeout {
                        after_ms: u64::try_from(descriptor.call_timeout.as_millis())
                            .unwrap_or(u64::MAX),
                    },
                ))
            });
        let latency = started.elapsed();

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                if !e.is_configuration() {
                    let endpoint = format!(
                        "{}?offset={}&limit={}",
                        descriptor.base_url, req.offset, req.limit
                    );
                    let mut metric =
                        CallMetric::failure(&descriptor.name, endpoint, latency, e.to_string());
                    if let VerdantError::ProviderFetch {
                        cause: FetchCause::Http { status },
                        ..
                    } = &e
                    {
                        metric = metric.with_status(*status);
                    }
                    observer.on_call(metric);
                }
                tracing::warn!(offset, error = %e, "page fetch failed");
                return Err(e);
            }
        };
        pages += 1;

        let received = page.payload.len();
        let mut metric = CallMetric::success(&descriptor.name, &page.endpoint, latency)
            .with_remaining(page.rate_limit_remaining)
            .with_records(received);
        if let Some(status) = page.status {
            metric = metric.with_status(status);
        }
        observer.on_call(metric);

        let room = ceiling - records.len();
        records.extend(page.payload.records.into_iter().take(room));
        tracing::debug!(offset, received, total = records.len(), "page fetched");

        if !page.has_more || received == 0 || records.len() >= ceiling {
            break;
        }
        offset += batch;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    let raw_records = records.len();
    let normalized = adapter.normalize(&RawPayload::new(records));
    let mut issues = normalized.issues;
    if normalized.dropped > 0 {
        issues.push(format!(
            "{} records dropped: missing entity id or name",
            normalized.dropped
        ));
    }
    Ok(FetchOutcome {
        points: normalized.points,
        issues,
        pages,
        raw_records,
    })
}
