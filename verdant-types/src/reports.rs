//! Report envelope produced by the aggregator.

use serde::{Deserialize, Serialize};

use crate::datapoint::EsgDataPoint;
use crate::error::VerdantError;
use crate::quality::QualityReport;

/// Result of one fan-out fetch.
///
/// Data points are grouped by provider in priority order. Providers that failed
/// or were skipped contribute no points and no quality report, only a warning,
/// so their absence stays diagnosable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Normalized records from every successful provider.
    pub data_points: Vec<EsgDataPoint>,
    /// One report per successful provider.
    pub quality_reports: Vec<QualityReport>,
    /// Non-fatal issues: failed, skipped or under-threshold providers.
    pub warnings: Vec<VerdantError>,
}

impl AggregateReport {
    /// Names of providers that contributed a quality report, in order.
    #[must_use]
    pub fn providers(&self) -> Vec<&str> {
        self.quality_reports
            .iter()
            .map(|r| r.provider.as_str())
            .collect()
    }
}
