//! Quality metrics and per-batch quality reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::Reliability;

/// Component scores fed to the quality scorer. Components are on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Share of required fields populated.
    pub completeness: f64,
    /// Provider-asserted accuracy estimate.
    pub accuracy: f64,
    /// Share of records inside the staleness window.
    pub timeliness: f64,
    /// Provider-asserted consistency estimate.
    pub consistency: f64,
    /// Provider trust level.
    pub reliability: Reliability,
}

/// Quality assessment of one provider batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Provider the batch came from.
    pub provider: String,
    /// Number of normalized records assessed.
    pub record_count: usize,
    /// Component scores, each within [0, 100].
    pub metrics: QualityMetrics,
    /// Bounded list of human-readable issues.
    pub issues: Vec<String>,
    /// Weighted overall score within [0, 100].
    pub overall: f64,
    /// When the assessment was made.
    pub assessed_at: DateTime<Utc>,
}

impl QualityReport {
    /// Upper bound on retained issue notes.
    pub const MAX_ISSUES: usize = 5;

    /// True when every score is finite and inside [0, 100].
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        !self.provider.trim().is_empty()
            && in_range(self.overall)
            && in_range(self.metrics.completeness)
            && in_range(self.metrics.accuracy)
            && in_range(self.metrics.timeliness)
            && in_range(self.metrics.consistency)
    }
}
