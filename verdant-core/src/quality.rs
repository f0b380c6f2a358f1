//! Batch quality assessment.

use chrono::{DateTime, Duration, Utc};
use verdant_types::{EsgDataPoint, QualityMetrics, QualityReport, Reliability};

use crate::scoring::score;

/// Canonical field a provider promises to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RequiredField {
    /// Entity identifier.
    EntityId,
    /// Entity display name.
    EntityName,
    /// Overall score.
    OverallScore,
    /// Environmental pillar score.
    EnvironmentalScore,
    /// Social pillar score.
    SocialScore,
    /// Governance pillar score.
    GovernanceScore,
    /// At least one environmental indicator.
    EnvironmentalMetrics,
    /// At least one social indicator.
    SocialMetrics,
    /// At least one governance indicator.
    GovernanceMetrics,
    /// Methodology label.
    Methodology,
    /// Sector label.
    Sector,
    /// Jurisdiction code.
    Jurisdiction,
}

impl RequiredField {
    /// True when `point` carries a value for this field.
    #[must_use]
    pub fn is_populated(self, point: &EsgDataPoint) -> bool {
        let present = |v: Option<f64>| v.is_some_and(f64::is_finite);
        match self {
            Self::EntityId => !point.entity_id.trim().is_empty(),
            Self::EntityName => !point.entity_name.trim().is_empty(),
            Self::OverallScore => present(point.scores.overall),
            Self::EnvironmentalScore => present(point.scores.environmental),
            Self::SocialScore => present(point.scores.social),
            Self::GovernanceScore => present(point.scores.governance),
            Self::EnvironmentalMetrics => !point.metrics.environmental.is_empty(),
            Self::SocialMetrics => !point.metrics.social.is_empty(),
            Self::GovernanceMetrics => !point.metrics.governance.is_empty(),
            Self::Methodology => !point.provenance.methodology.trim().is_empty(),
            Self::Sector => point.sector.as_deref().is_some_and(|s| !s.trim().is_empty()),
            Self::Jurisdiction => point
                .jurisdiction
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty()),
        }
    }
}

/// Per-provider assumptions used when assessing a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityProfile {
    /// Fields counted by completeness.
    pub required_fields: Vec<RequiredField>,
    /// Records older than this many 30-day months are stale.
    pub staleness_months: u32,
    /// Provider-asserted accuracy, 0-100. An estimate, not a measurement.
    pub accuracy: f64,
    /// Provider-asserted consistency, 0-100. An estimate, not a measurement.
    pub consistency: f64,
}

impl Default for QualityProfile {
    fn default() -> Self {
        Self {
            required_fields: vec![
                RequiredField::EntityId,
                RequiredField::EntityName,
                RequiredField::OverallScore,
                RequiredField::EnvironmentalScore,
                RequiredField::SocialScore,
                RequiredField::GovernanceScore,
            ],
            staleness_months: 6,
            accuracy: 80.0,
            consistency: 80.0,
        }
    }
}

impl QualityProfile {
    /// Set the asserted accuracy and consistency.
    #[must_use]
    pub fn asserted(mut self, accuracy: f64, consistency: f64) -> Self {
        self.accuracy = accuracy;
        self.consistency = consistency;
        self
    }

    /// Set the required fields.
    #[must_use]
    pub fn requiring(mut self, fields: &[RequiredField]) -> Self {
        self.required_fields = fields.to_vec();
        self
    }
}

/// Assess `points` against `profile` as of `now`.
///
/// `issues` are upstream notes (dropped records, transform failures) and come
/// first in the report's bounded issue list.
#[must_use]
pub fn assess(
    provider: &str,
    reliability: Reliability,
    profile: &QualityProfile,
    points: &[EsgDataPoint],
    issues: &[String],
    now: DateTime<Utc>,
) -> QualityReport {
    let mut notes: Vec<String> = issues.to_vec();
    let count = points.len();

    let (completeness, timeliness) = if count == 0 {
        notes.push("no data returned".to_string());
        (0.0, 0.0)
    } else {
        let required = profile.required_fields.len();
        let completeness = if required == 0 {
            100.0
        } else {
            let populated: usize = points
                .iter()
                .map(|p| {
                    profile
                        .required_fields
                        .iter()
                        .filter(|f| f.is_populated(p))
                        .count()
                })
                .sum();
            percent(populated, count * required)
        };

        let cutoff = now - Duration::days(i64::from(profile.staleness_months) * 30);
        let fresh = points.iter().filter(|p| p.updated_at >= cutoff).count();
        let timeliness = percent(fresh, count);
        if fresh * 2 < count {
            notes.push(format!(
                "more than half of the records are older than {} months",
                profile.staleness_months
            ));
        }

        let missing_overall = points.iter().filter(|p| p.scores.overall.is_none()).count();
        if missing_overall * 10 > count * 3 {
            notes.push(format!(
                "{:.0}% of records missing overall ESG score",
                percent(missing_overall, count)
            ));
        }
        (completeness, timeliness)
    };
    notes.truncate(QualityReport::MAX_ISSUES);

    let metrics = QualityMetrics {
        completeness,
        accuracy: profile.accuracy.clamp(0.0, 100.0),
        timeliness,
        consistency: profile.consistency.clamp(0.0, 100.0),
        reliability,
    };
    QualityReport {
        provider: provider.to_string(),
        record_count: count,
        overall: score(&metrics),
        metrics,
        issues: notes,
        assessed_at: now,
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
}
