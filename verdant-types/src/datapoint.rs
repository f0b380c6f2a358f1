//! Canonical ESG record produced by every provider adapter.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an entity identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A country.
    Sovereign,
    /// A company.
    Corporate,
}

/// ESG pillar a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    /// Environmental.
    Environmental,
    /// Social.
    Social,
    /// Governance.
    Governance,
}

/// Raw numeric indicators split by pillar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBag {
    /// Environmental indicators keyed by canonical name.
    pub environmental: BTreeMap<String, f64>,
    /// Social indicators keyed by canonical name.
    pub social: BTreeMap<String, f64>,
    /// Governance indicators keyed by canonical name.
    pub governance: BTreeMap<String, f64>,
}

impl MetricBag {
    /// Insert `value` under `pillar`/`key`, replacing any earlier value.
    pub fn insert(&mut self, pillar: Pillar, key: impl Into<String>, value: f64) {
        self.pillar_mut(pillar).insert(key.into(), value);
    }

    /// Indicators for `pillar`.
    #[must_use]
    pub const fn pillar(&self, pillar: Pillar) -> &BTreeMap<String, f64> {
        match pillar {
            Pillar::Environmental => &self.environmental,
            Pillar::Social => &self.social,
            Pillar::Governance => &self.governance,
        }
    }

    const fn pillar_mut(&mut self, pillar: Pillar) -> &mut BTreeMap<String, f64> {
        match pillar {
            Pillar::Environmental => &mut self.environmental,
            Pillar::Social => &mut self.social,
            Pillar::Governance => &mut self.governance,
        }
    }

    /// True when no pillar holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.environmental.is_empty() && self.social.is_empty() && self.governance.is_empty()
    }
}

/// Headline scores, each optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Combined ESG score.
    pub overall: Option<f64>,
    /// Environmental pillar score.
    pub environmental: Option<f64>,
    /// Social pillar score.
    pub social: Option<f64>,
    /// Governance pillar score.
    pub governance: Option<f64>,
}

/// How a record was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Methodology label reported by or assumed for the provider.
    pub methodology: String,
    /// Provider-reported confidence label.
    pub confidence: String,
}

/// One canonical ESG record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsgDataPoint {
    /// Stable entity identifier within the provider (ISO code, ticker, ...).
    pub entity_id: String,
    /// Display name.
    pub entity_name: String,
    /// Country or company.
    pub entity_kind: EntityKind,
    /// Name of the provider that produced this record.
    pub provider: String,
    /// Raw indicators.
    pub metrics: MetricBag,
    /// Headline scores.
    pub scores: Scores,
    /// Last update reported by the provider.
    pub updated_at: DateTime<Utc>,
    /// Methodology and confidence.
    pub provenance: Provenance,
    /// Industry sector, for corporates.
    pub sector: Option<String>,
    /// Jurisdiction code, when known.
    pub jurisdiction: Option<String>,
    /// Reporting year of the underlying indicators.
    pub reporting_year: Option<i32>,
}
