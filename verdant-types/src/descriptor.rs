//! Provider descriptors: identity, credential slot, budgets and coverage.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Commercial class of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Publicly reachable, possibly key-gated.
    Free,
    /// Requires a paid or sandbox credential.
    Premium,
}

/// Trust level assigned to a provider's data.
///
/// Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Reliability {
    /// Sparse or unverified data.
    Low,
    /// Usable with caveats.
    #[default]
    Medium,
    /// Authoritative source.
    High,
}

impl Reliability {
    /// Numeric weight used by the quality scorer.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::High => 100.0,
            Self::Medium => 75.0,
            Self::Low => 50.0,
        }
    }
}

/// Kind of indicators a provider can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum DataType {
    /// Environmental indicators.
    Environmental,
    /// Social indicators.
    Social,
    /// Governance indicators.
    Governance,
    /// Supervisory and regulatory disclosures.
    Regulatory,
    /// Market and financial data.
    Financial,
    /// Climate-specific datasets.
    Climate,
    /// Country level data.
    Sovereign,
}

/// Request budget published by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Requests allowed per minute. Zero means unthrottled.
    pub requests_per_minute: u32,
    /// Requests allowed per day. Zero means unbounded.
    pub requests_per_day: u32,
}

impl RateLimit {
    /// Construct a budget.
    #[must_use]
    pub const fn new(requests_per_minute: u32, requests_per_day: u32) -> Self {
        Self {
            requests_per_minute,
            requests_per_day,
        }
    }

    /// Fixed pause between consecutive pages: `ceil(60000 / rpm)` milliseconds.
    #[must_use]
    pub const fn inter_page_delay(&self) -> Duration {
        if self.requests_per_minute == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(60_000_u64.div_ceil(self.requests_per_minute as u64))
    }
}

/// Coverage metadata advertised by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// Number of entities (countries, companies) covered.
    pub entities: Option<u32>,
    /// Number of jurisdictions covered.
    pub jurisdictions: Option<u32>,
    /// Sector labels covered.
    pub sectors: Vec<String>,
}

/// Where a provider's credential comes from and how it is attached to requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSlot {
    /// Environment-style key the value is read from.
    pub env_var: String,
    /// Header carrying the credential, if sent as a header.
    pub header: Option<String>,
    /// Query parameter carrying the credential, if sent in the URL.
    pub query_param: Option<String>,
    /// Value shipped in configuration templates that does not count as a real key.
    pub placeholder: Option<String>,
    /// Whether the provider refuses to work without a real credential.
    pub required: bool,
    /// Loaded credential value. Never serialized.
    #[serde(skip)]
    pub value: Option<String>,
}

impl CredentialSlot {
    /// Slot read from `env_var`, with no transport and no placeholder.
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            header: None,
            query_param: None,
            placeholder: None,
            required: true,
            value: None,
        }
    }

    /// Send the credential in `name` header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.header = Some(name.into());
        self
    }

    /// Send the credential as the `name` query parameter.
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = Some(name.into());
        self
    }

    /// Treat `value` as a template placeholder.
    #[must_use]
    pub fn placeholder(mut self, value: impl Into<String>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    /// Mark the credential optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Load a credential value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// True when a non-empty value other than the placeholder is loaded.
    #[must_use]
    pub fn has_real_value(&self) -> bool {
        match self.value.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) => self.placeholder.as_deref() != Some(v),
        }
    }

    /// Value to put on the wire: the loaded value, else the placeholder.
    #[must_use]
    pub fn effective_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or(self.placeholder.as_deref())
    }
}

impl fmt::Debug for CredentialSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSlot")
            .field("env_var", &self.env_var)
            .field("header", &self.header)
            .field("query_param", &self.query_param)
            .field("placeholder", &self.placeholder)
            .field("required", &self.required)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Identity and configuration of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Unique provider name, also the tag carried by every data point.
    pub name: String,
    /// Commercial class.
    pub tier: Tier,
    /// Base endpoint all requests are built from.
    pub base_url: String,
    /// Credential slot, if the provider takes one.
    pub credential: Option<CredentialSlot>,
    /// Published request budget.
    pub rate_limit: RateLimit,
    /// Trust level.
    pub reliability: Reliability,
    /// Coverage metadata.
    pub coverage: Coverage,
    /// Indicator families served.
    pub data_types: Vec<DataType>,
    /// Whether the provider participates in fetches and health checks.
    pub enabled: bool,
    /// Short human description.
    pub description: String,
    /// Per-call timeout for data fetches.
    pub call_timeout: Duration,
    /// Response header carrying the remaining request budget.
    pub rate_limit_header: Option<String>,
}

impl SourceDescriptor {
    /// Default per-call timeout for data fetches.
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default header inspected for the remaining request budget.
    pub const DEFAULT_RATE_LIMIT_HEADER: &'static str = "x-ratelimit-remaining";

    /// Enabled descriptor with medium reliability, 60 rpm and no credential.
    pub fn new(name: impl Into<String>, tier: Tier, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tier,
            base_url: base_url.into(),
            credential: None,
            rate_limit: RateLimit::new(60, 0),
            reliability: Reliability::Medium,
            coverage: Coverage::default(),
            data_types: Vec::new(),
            enabled: true,
            description: String::new(),
            call_timeout: Self::DEFAULT_CALL_TIMEOUT,
            rate_limit_header: Some(Self::DEFAULT_RATE_LIMIT_HEADER.to_string()),
        }
    }

    /// Set the credential slot.
    #[must_use]
    pub fn with_credential(mut self, slot: CredentialSlot) -> Self {
        self.credential = Some(slot);
        self
    }

    /// Set the request budget.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Set the reliability tier.
    #[must_use]
    pub const fn with_reliability(mut self, reliability: Reliability) -> Self {
        self.reliability = reliability;
        self
    }

    /// Set coverage metadata.
    #[must_use]
    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    /// Set the served indicator families.
    #[must_use]
    pub fn with_data_types(mut self, data_types: &[DataType]) -> Self {
        self.data_types = data_types.to_vec();
        self
    }

    /// Set the enabled flag.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}
