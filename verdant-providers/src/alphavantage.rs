//! Alpha Vantage corporate ESG scores, one symbol per call.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use verdant_core::{
    EntityKind, EsgDataPoint, FetchCause, MetricBag, Normalized, OffsetRule, Page, PageRequest,
    Pagination, Provenance, ProviderAdapter, QualityProfile, RawPayload, Scores, SourceDescriptor,
    VerdantError,
};

use crate::fields::{checked_number, round1, text};
use crate::http::HttpClient;

/// Symbols fetched when none are configured.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "JPM", "JNJ", "V",
];

const SYMBOL_KEY: &str = "symbol";
const ERROR_KEY: &str = "Error Message";

/// Adapter for the Alpha Vantage `ESG` function.
///
/// The record offset indexes into the symbol universe. A `Note` or
/// `Information` body is the provider's throttle signal and ends the loop.
#[derive(Debug)]
pub struct AlphaVantageAdapter {
    descriptor: SourceDescriptor,
    http: HttpClient,
    symbols: Vec<String>,
}

impl AlphaVantageAdapter {
    /// Build the adapter from its registry descriptor with [`DEFAULT_SYMBOLS`].
    ///
    /// # Errors
    /// Returns `InvalidConfig` when the HTTP client cannot be built.
    pub fn new(descriptor: SourceDescriptor) -> Result<Self, VerdantError> {
        let http = HttpClient::new(&descriptor)?;
        Ok(Self {
            descriptor,
            http,
            symbols: DEFAULT_SYMBOLS.iter().map(ToString::to_string).collect(),
        })
    }

    /// Replace the symbol universe.
    #[must_use]
    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Configured symbol universe.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn throttled(body: &Value) -> bool {
        body.get("Note").is_some() || body.get("Information").is_some()
    }

    fn point(&self, rec: &Value, symbol: &str, issues: &mut Vec<String>) -> EsgDataPoint {
        let scores = rec.get("esgScore").unwrap_or(rec);
        let env = checked_number(scores, "environmentalScore", symbol, issues);
        let social = checked_number(scores, "socialScore", symbol, issues);
        let gov = checked_number(scores, "governanceScore", symbol, issues);
        let overall = checked_number(scores, "totalEsgScore", symbol, issues).or_else(|| {
            let present: Vec<f64> = [env, social, gov].into_iter().flatten().collect();
            #[allow(clippy::cast_precision_loss)]
            let n = present.len() as f64;
            (!present.is_empty()).then(|| present.iter().sum::<f64>() / n)
        });

        EsgDataPoint {
            entity_id: format!("AV_{symbol}"),
            entity_name: text(rec, &["companyName", "Name"])
                .unwrap_or(symbol)
                .to_string(),
            entity_kind: EntityKind::Corporate,
            provider: self.descriptor.name.clone(),
            metrics: MetricBag::default(),
            scores: Scores {
                overall: overall.map(round1),
                environmental: env.map(round1),
                social: social.map(round1),
                governance: gov.map(round1),
            },
            updated_at: Utc::now(),
            provenance: Provenance {
                methodology: "Alpha Vantage ESG".to_string(),
                confidence: "medium".to_string(),
            },
            sector: text(rec, &["sector", "Sector"]).map(str::to_string),
            jurisdiction: Some(text(rec, &["country", "Country"]).unwrap_or("US").to_string()),
            reporting_year: None,
        }
    }
}

#[async_trait]
impl ProviderAdapter for AlphaVantageAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    fn pagination(&self) -> Pagination {
        Pagination {
            offset_rule: OffsetRule::MultipleOf(1),
            max_page_size: 1,
            safety_ceiling: self.symbols.len(),
        }
    }

    fn quality_profile(&self) -> QualityProfile {
        QualityProfile::default().asserted(80.0, 75.0)
    }

    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, VerdantError> {
        self.pagination().check(req.offset, req.limit)?;
        let Some(symbol) = self.symbols.get(req.offset) else {
            return Ok(Page::default());
        };

        let mut url = self.http.url("")?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("function", "ESG");
            q.append_pair(SYMBOL_KEY, symbol);
            for (k, v) in &req.filters {
                q.append_pair(k, v);
            }
        }
        let resp = self.http.get_json(url, &[]).await?;
        let has_more = req.offset + 1 < self.symbols.len();

        if Self::throttled(&resp.body) {
            tracing::warn!(provider = %self.descriptor.name, %symbol, "provider throttle notice");
            return Ok(Page {
                payload: RawPayload::default(),
                has_more: false,
                endpoint: resp.endpoint,
                status: Some(resp.status),
                rate_limit_remaining: Some(0),
            });
        }

        let mut body = resp.body;
        match &mut body {
            Value::Object(map) => {
                map.entry(SYMBOL_KEY)
                    .or_insert_with(|| Value::String(symbol.clone()));
            }
            _ => {
                return Err(VerdantError::fetch(
                    &self.descriptor.name,
                    FetchCause::Decode("expected a JSON object".into()),
                ));
            }
        }
        Ok(Page {
            payload: RawPayload::new(vec![body]),
            has_more,
            endpoint: resp.endpoint,
            status: Some(resp.status),
            rate_limit_remaining: resp.remaining,
        })
    }

    fn normalize(&self, raw: &RawPayload) -> Normalized {
        let mut out = Normalized::default();
        for rec in &raw.records {
            let Some(symbol) = text(rec, &[SYMBOL_KEY]) else {
                out.dropped += 1;
                continue;
            };
            if let Some(msg) = rec.get(ERROR_KEY).and_then(Value::as_str) {
                out.issues.push(format!("{symbol}: {msg}"));
                continue;
            }
            let point = self.point(rec, symbol, &mut out.issues);
            out.points.push(point);
        }
        out
    }

    async fn health_check(&self) -> Result<(), VerdantError> {
        let mut url = self.http.url("")?;
        url.query_pairs_mut()
            .append_pair("function", "OVERVIEW")
            .append_pair(SYMBOL_KEY, "IBM");
        let resp = self.http.get_json(url, &[]).await?;
        if Self::throttled(&resp.body) {
            return Err(VerdantError::fetch(
                &self.descriptor.name,
                FetchCause::RateLimited,
            ));
        }
        match resp.body.get(ERROR_KEY).and_then(Value::as_str) {
            Some(msg) => Err(VerdantError::fetch(
                &self.descriptor.name,
                FetchCause::Decode(msg.to_string()),
            )),
            None => Ok(()),
        }
    }
}
