use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the verdant workspace.
///
/// Configuration faults (`InvalidConfig`, `NotFound`) are caller mistakes and are
/// never retried. `ProviderFetch` is the expected, per-provider failure that the
/// aggregator isolates. `Transform` is record-level and normally lands in a
/// quality issue list instead of being returned. `Monitoring` never escapes the
/// monitor.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerdantError {
    /// Invalid configuration or call argument (bad offset/limit, empty batch size, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A named resource, usually a provider, does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "provider msci".
        what: String,
    },

    /// A single provider call failed at the transport, HTTP or decode level.
    #[error("{provider} fetch failed: {cause}")]
    ProviderFetch {
        /// Provider name that failed.
        provider: String,
        /// What went wrong.
        cause: FetchCause,
    },

    /// A record could not be mapped into the canonical shape.
    #[error("{provider} transform failed: {reason}")]
    Transform {
        /// Provider whose payload was malformed.
        provider: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A provider was skipped because its credential is missing or a placeholder.
    #[error("{provider} skipped: missing credential")]
    MissingCredential {
        /// Provider that was skipped.
        provider: String,
    },

    /// A provider was left out of a batch because its own settings are
    /// unusable, e.g. a malformed base URL override.
    #[error("{provider} misconfigured: {reason}")]
    Misconfigured {
        /// Provider that was excluded.
        provider: String,
        /// Configuration fault it raised.
        reason: String,
    },

    /// A provider batch came in under the configured quality floor.
    #[error("{provider} below quality threshold: {reason}")]
    LowQuality {
        /// Provider whose batch was assessed.
        provider: String,
        /// Which threshold was missed.
        reason: String,
    },

    /// Internal monitor bookkeeping problem.
    #[error("monitoring fault: {0}")]
    Monitoring(String),

    /// Every attempted provider failed; contains the individual failures.
    #[error("all providers failed: {0:?}")]
    AllProvidersFailed(Vec<VerdantError>),
}

/// Cause attached to [`VerdantError::ProviderFetch`].
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchCause {
    /// The provider answered with a non-2xx status.
    #[error("http status {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },
    /// Connection, TLS or body read failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The call did not complete within its per-call timeout.
    #[error("timed out after {after_ms}ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        after_ms: u64,
    },
    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// The provider signalled that its request budget is exhausted.
    #[error("rate limited")]
    RateLimited,
}

impl VerdantError {
    /// Helper: build an `InvalidConfig` error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderFetch` error.
    pub fn fetch(provider: impl Into<String>, cause: FetchCause) -> Self {
        Self::ProviderFetch {
            provider: provider.into(),
            cause,
        }
    }

    /// Helper: build a `Transform` error.
    pub fn transform(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transform {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Re-tag a configuration fault raised inside `provider`'s own fetch loop
    /// as [`Self::Misconfigured`]. Other errors are returned unchanged.
    #[must_use]
    pub fn scoped_to(self, provider: &str) -> Self {
        match self {
            Self::InvalidConfig(reason) => Self::Misconfigured {
                provider: provider.to_string(),
                reason,
            },
            Self::NotFound { what } => Self::Misconfigured {
                provider: provider.to_string(),
                reason: format!("not found: {what}"),
            },
            other => other,
        }
    }

    /// Returns true for caller/programmer faults that must surface as hard failures.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::InvalidConfig(_) | Self::NotFound { .. } => true,
            Self::AllProvidersFailed(inner) => inner.iter().any(Self::is_configuration),
            _ => false,
        }
    }

    /// Returns true if a later attempt against the same provider could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderFetch { cause, .. } => match cause {
                FetchCause::Http { status } => *status == 429 || *status >= 500,
                FetchCause::Transport(_) | FetchCause::Timeout { .. } | FetchCause::RateLimited => {
                    true
                }
                FetchCause::Decode(_) => false,
            },
            _ => false,
        }
    }

    /// Provider name carried by the error, if any.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::ProviderFetch { provider, .. }
            | Self::Transform { provider, .. }
            | Self::MissingCredential { provider }
            | Self::Misconfigured { provider, .. }
            | Self::LowQuality { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// Flatten nested `AllProvidersFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
