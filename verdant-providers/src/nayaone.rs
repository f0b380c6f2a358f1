//! NayaOne sandbox view of the World Bank ESG dataset.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use verdant_core::{
    EntityKind, EsgDataPoint, FetchCause, MetricBag, Normalized, OffsetRule, Page, PageRequest,
    Pagination, Pillar, Provenance, ProviderAdapter, QualityProfile, RawPayload, Scores,
    SourceDescriptor, VerdantError,
};

use crate::fields::{checked_number, text, timestamp, year};
use crate::http::HttpClient;

const ENVIRONMENTAL: &[&str] = &[
    "co2_emissions",
    "renewable_energy_consumption",
    "forest_area",
    "water_productivity",
    "energy_intensity",
    "carbon_intensity",
    "environmental_performance_index",
];

const SOCIAL: &[&str] = &[
    "human_development_index",
    "gender_equality_index",
    "education_index",
    "health_index",
    "poverty_rate",
    "unemployment_rate",
    "social_protection_coverage",
];

const GOVERNANCE: &[&str] = &[
    "governance_effectiveness",
    "regulatory_quality",
    "rule_of_law",
    "control_of_corruption",
    "voice_and_accountability",
    "political_stability",
    "transparency_index",
];

/// Adapter for the NayaOne ESG World Bank table.
///
/// Offsets must be multiples of 10 and pages are capped at 100 rows.
#[derive(Debug)]
pub struct NayaOneAdapter {
    descriptor: SourceDescriptor,
    http: HttpClient,
}

impl NayaOneAdapter {
    /// Build the adapter from its registry descriptor.
    ///
    /// # Errors
    /// Returns `InvalidConfig` when the HTTP client cannot be built.
    pub fn new(descriptor: SourceDescriptor) -> Result<Self, VerdantError> {
        let http = HttpClient::new(&descriptor)?;
        Ok(Self { descriptor, http })
    }

    fn point(&self, rec: &Value, issues: &mut Vec<String>) -> Option<EsgDataPoint> {
        let id = text(rec, &["country_code", "entity_id"])?;
        let name = text(rec, &["country_name", "entity_name"])?;

        let mut metrics = MetricBag::default();
        for (keys, pillar) in [
            (ENVIRONMENTAL, Pillar::Environmental),
            (SOCIAL, Pillar::Social),
            (GOVERNANCE, Pillar::Governance),
        ] {
            for key in keys {
                if let Some(v) = checked_number(rec, key, id, issues) {
                    metrics.insert(pillar, *key, v);
                }
            }
        }

        Some(EsgDataPoint {
            entity_id: id.to_string(),
            entity_name: name.to_string(),
            entity_kind: EntityKind::Sovereign,
            provider: self.descriptor.name.clone(),
            metrics,
            scores: Scores {
                overall: checked_number(rec, "overall_esg_score", id, issues),
                environmental: checked_number(rec, "environmental_score", id, issues),
                social: checked_number(rec, "social_score", id, issues),
                governance: checked_number(rec, "governance_score", id, issues),
            },
            updated_at: text(rec, &["last_updated"])
                .and_then(timestamp)
                .unwrap_or_else(Utc::now),
            provenance: Provenance {
                methodology: text(rec, &["methodology"])
                    .unwrap_or("World Bank ESG Indicators")
                    .to_string(),
                confidence: text(rec, &["confidence_level"])
                    .unwrap_or("high")
                    .to_string(),
            },
            sector: None,
            jurisdiction: Some(id.to_string()),
            reporting_year: year(rec, "year"),
        })
    }
}

#[async_trait]
impl ProviderAdapter for NayaOneAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    fn pagination(&self) -> Pagination {
        Pagination {
            offset_rule: OffsetRule::MultipleOf(10),
            max_page_size: 100,
            safety_ceiling: 1000,
        }
    }

    fn quality_profile(&self) -> QualityProfile {
        QualityProfile::default().asserted(90.0, 85.0)
    }

    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, VerdantError> {
        let limit = self.pagination().check(req.offset, req.limit)?;
        let mut url = self.http.url("")?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("offset", &req.offset.to_string());
            q.append_pair("limit", &limit.to_string());
            for (k, v) in &req.filters {
                q.append_pair(k, v);
            }
        }

        let resp = self.http.get_json(url, &[("accept-profile", "api")]).await?;
        let rows = match resp.body {
            Value::Array(rows) => Some(rows),
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(rows)) => Some(rows),
                _ => None,
            },
            _ => None,
        }
        .ok_or_else(|| {
            VerdantError::fetch(
                &self.descriptor.name,
                FetchCause::Decode("expected an array of rows".into()),
            )
        })?;

        Ok(Page {
            has_more: rows.len() == limit,
            payload: RawPayload::new(rows),
            endpoint: resp.endpoint,
            status: Some(resp.status),
            rate_limit_remaining: resp.remaining,
        })
    }

    fn normalize(&self, raw: &RawPayload) -> Normalized {
        let mut out = Normalized::default();
        for rec in &raw.records {
            match self.point(rec, &mut out.issues) {
                Some(p) => out.points.push(p),
                None => out.dropped += 1,
            }
        }
        out
    }
}
