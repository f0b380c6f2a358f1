//! World Bank open data indicators API.
//!
//! Rows arrive one per (country, indicator, year). Normalization groups them
//! per country, keeps the latest value of each indicator and derives pillar
//! scores from those values.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use verdant_core::{
    EntityKind, EsgDataPoint, FetchCause, MetricBag, Normalized, OffsetRule, Page, PageRequest,
    Pagination, Pillar, Provenance, ProviderAdapter, QualityProfile, RawPayload, Scores,
    SourceDescriptor, VerdantError,
};

use crate::fields::{Numeric, number, numeric, round1, text, timestamp, year};
use crate::http::HttpClient;

const CO2: &str = "EN.ATM.CO2E.PC";
const ELECTRICITY: &str = "EG.USE.ELEC.KH.PC";
const HYGIENE: &str = "SH.STA.WASH.P5";
const UNEMPLOYMENT: &str = "SL.UEM.TOTL.ZS";
const GINI: &str = "SI.POV.GINI";
const WOMEN_IN_PARLIAMENT: &str = "SG.GEN.PARL.ZS";

/// Indicators requested, with the pillar and canonical name they map to.
const INDICATORS: &[(&str, Pillar, &str)] = &[
    (CO2, Pillar::Environmental, "co2_emissions"),
    (ELECTRICITY, Pillar::Environmental, "electricity_consumption_kwh"),
    (HYGIENE, Pillar::Social, "basic_hygiene_access"),
    (UNEMPLOYMENT, Pillar::Social, "unemployment_rate"),
    (GINI, Pillar::Social, "gini_index"),
    (WOMEN_IN_PARLIAMENT, Pillar::Governance, "women_in_parliament"),
];

const DATE_RANGE: &str = "2020:2023";
const META_UPDATED: &str = "_lastupdated";

/// Adapter for `api.worldbank.org/v2`.
#[derive(Debug)]
pub struct WorldBankAdapter {
    descriptor: SourceDescriptor,
    http: HttpClient,
}

#[derive(Debug, Default)]
struct Country {
    name: String,
    iso3: String,
    /// indicator id -> (year, value)
    latest: BTreeMap<String, (i32, f64)>,
    updated: Option<DateTime<Utc>>,
}

impl WorldBankAdapter {
    /// Build the adapter from its registry descriptor.
    ///
    /// # Errors
    /// Returns `InvalidConfig` when the HTTP client cannot be built.
    pub fn new(descriptor: SourceDescriptor) -> Result<Self, VerdantError> {
        let http = HttpClient::new(&descriptor)?;
        Ok(Self { descriptor, http })
    }

    fn decode_error(&self, msg: impl Into<String>) -> VerdantError {
        VerdantError::fetch(&self.descriptor.name, FetchCause::Decode(msg.into()))
    }

    fn point(&self, c: Country) -> EsgDataPoint {
        let value = |id: &str| c.latest.get(id).map(|(_, v)| *v);
        let mut metrics = MetricBag::default();
        for (id, pillar, key) in INDICATORS {
            if let Some(v) = value(id) {
                metrics.insert(*pillar, *key, v);
            }
        }

        let env = environmental_score(value(CO2), value(ELECTRICITY));
        let social = social_score(value(HYGIENE), value(UNEMPLOYMENT), value(GINI));
        let gov = governance_score(value(WOMEN_IN_PARLIAMENT));
        let overall = (env + social + gov) / 3.0;

        EsgDataPoint {
            entity_id: format!("WB_{}", c.iso3),
            entity_name: c.name,
            entity_kind: EntityKind::Sovereign,
            provider: self.descriptor.name.clone(),
            metrics,
            scores: Scores {
                overall: Some(round1(overall)),
                environmental: Some(round1(env)),
                social: Some(round1(social)),
                governance: Some(round1(gov)),
            },
            updated_at: c.updated.unwrap_or_else(Utc::now),
            provenance: Provenance {
                methodology: "World Bank open data indicators".to_string(),
                confidence: "high".to_string(),
            },
            sector: Some("Government".to_string()),
            reporting_year: c.latest.values().map(|(y, _)| *y).max(),
            jurisdiction: Some(c.iso3),
        }
    }
}

#[async_trait]
impl ProviderAdapter for WorldBankAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    fn pagination(&self) -> Pagination {
        Pagination {
            offset_rule: OffsetRule::MultipleOfLimit,
            max_page_size: 1000,
            safety_ceiling: 10_000,
        }
    }

    fn quality_profile(&self) -> QualityProfile {
        QualityProfile::default().asserted(95.0, 90.0)
    }

    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, VerdantError> {
        let limit = self.pagination().check(req.offset, req.limit)?;
        let page_no = req.offset / limit + 1;
        let country = req.filters.get("country").map_or("all", String::as_str);
        let ids: Vec<&str> = INDICATORS.iter().map(|(id, _, _)| *id).collect();

        let mut url = self
            .http
            .url(&format!("/country/{country}/indicator/{}", ids.join(";")))?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("source", "2");
            q.append_pair("format", "json");
            q.append_pair("date", DATE_RANGE);
            q.append_pair("per_page", &limit.to_string());
            q.append_pair("page", &page_no.to_string());
            for (k, v) in req.filters.iter().filter(|(k, _)| k.as_str() != "country") {
                q.append_pair(k, v);
            }
        }

        let resp = self.http.get_json(url, &[]).await?;
        let Value::Array(mut parts) = resp.body else {
            return Err(self.decode_error("expected [meta, rows]"));
        };
        if parts.len() < 2 {
            let msg = parts
                .first()
                .and_then(|m| m.pointer("/message/0/value"))
                .and_then(Value::as_str)
                .unwrap_or("missing rows element");
            return Err(self.decode_error(msg));
        }
        let rows = parts.swap_remove(1);
        let meta = parts.swap_remove(0);

        let pages = number(&meta, "pages").unwrap_or(0.0);
        let updated = text(&meta, &["lastupdated"]).map(str::to_string);
        let rows: Vec<Value> = match rows {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            _ => return Err(self.decode_error("rows element is not an array")),
        };
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if let (Some(u), Value::Object(map)) = (&updated, &mut row) {
                    map.insert(META_UPDATED.to_string(), Value::String(u.clone()));
                }
                row
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let has_more = (page_no as f64) < pages;
        Ok(Page {
            payload: RawPayload::new(rows),
            has_more,
            endpoint: resp.endpoint,
            status: Some(resp.status),
            rate_limit_remaining: resp.remaining,
        })
    }

    fn normalize(&self, raw: &RawPayload) -> Normalized {
        let mut out = Normalized::default();
        let mut countries: BTreeMap<String, Country> = BTreeMap::new();

        for row in &raw.records {
            let iso3 = text(row, &["countryiso3code"])
                .or_else(|| row.pointer("/country/id").and_then(Value::as_str))
                .map(str::trim)
                .filter(|s| !s.is_empty());
            let name = row
                .pointer("/country/value")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty());
            let (Some(iso3), Some(name)) = (iso3, name) else {
                out.dropped += 1;
                continue;
            };

            let country = countries.entry(iso3.to_string()).or_insert_with(|| Country {
                name: name.to_string(),
                iso3: iso3.to_string(),
                ..Country::default()
            });
            if let Some(t) = text(row, &[META_UPDATED]).and_then(timestamp) {
                country.updated = Some(country.updated.map_or(t, |u| u.max(t)));
            }

            let Some(indicator) = row.pointer("/indicator/id").and_then(Value::as_str) else {
                out.issues.push(format!("{iso3}: row without indicator id"));
                continue;
            };
            let value = match numeric(row, "value") {
                Numeric::Value(v) => v,
                Numeric::Absent => continue,
                Numeric::Malformed => {
                    out.issues.push(format!("{iso3}: {indicator} value is not numeric"));
                    continue;
                }
            };
            let Some(reported) = year(row, "date") else {
                out.issues.push(format!("{iso3}: {indicator} row without a usable date"));
                continue;
            };
            country
                .latest
                .entry(indicator.to_string())
                .and_modify(|cur| {
                    if reported > cur.0 {
                        *cur = (reported, value);
                    }
                })
                .or_insert((reported, value));
        }

        out.points = countries.into_values().map(|c| self.point(c)).collect();
        out
    }

    async fn health_check(&self) -> Result<(), VerdantError> {
        let mut url = self.http.url("/country")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("per_page", "1");
        self.http.get_json(url, &[]).await.map(|_| ())
    }
}

/// Lower per-capita emissions and electricity use score higher.
fn environmental_score(co2: Option<f64>, kwh: Option<f64>) -> f64 {
    if co2.is_none() && kwh.is_none() {
        return 50.0;
    }
    let mut score = 50.0;
    if let Some(co2) = co2 {
        score += ((20.0 - co2) * 2.0).max(0.0);
    }
    if let Some(kwh) = kwh {
        score += ((10_000.0 - kwh) / 200.0).max(0.0);
    }
    score.clamp(0.0, 100.0)
}

fn social_score(hygiene: Option<f64>, unemployment: Option<f64>, gini: Option<f64>) -> f64 {
    let mut score = 50.0;
    let mut factors = 0u8;
    if let Some(h) = hygiene {
        score += h * 0.5;
        factors += 1;
    }
    if let Some(u) = unemployment {
        score += ((25.0 - u) * 2.0).max(0.0);
        factors += 1;
    }
    if let Some(g) = gini {
        score += ((70.0 - g) * 0.7).max(0.0);
        factors += 1;
    }
    if factors == 0 {
        return 50.0;
    }
    (score / f64::from(factors + 1)).clamp(0.0, 100.0)
}

fn governance_score(women_in_parliament: Option<f64>) -> f64 {
    women_in_parliament.map_or(50.0, |w| (30.0 + w * 1.4).clamp(0.0, 100.0))
}
