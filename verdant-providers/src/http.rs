use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;
use verdant_core::{FetchCause, RateBudget, SourceDescriptor, VerdantError};

const AGENT: &str = concat!("verdant/", env!("CARGO_PKG_VERSION"));

/// Decoded JSON answer plus the transport facts the monitor wants.
#[derive(Debug, Clone)]
pub(crate) struct JsonResponse {
    pub body: Value,
    pub status: u16,
    pub endpoint: String,
    pub remaining: Option<u64>,
}

/// Thin GET-only JSON client bound to one provider descriptor.
///
/// Attaches the configured credential, applies the per-call timeout and maps
/// every failure onto `ProviderFetch`.
#[derive(Debug)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    descriptor: SourceDescriptor,
    budget: RateBudget,
}

impl HttpClient {
    pub(crate) fn new(descriptor: &SourceDescriptor) -> Result<Self, VerdantError> {
        Url::parse(&descriptor.base_url).map_err(|e| {
            VerdantError::invalid_config(format!(
                "{}: bad base url {}: {e}",
                descriptor.name, descriptor.base_url
            ))
        })?;
        let client = reqwest::Client::builder()
            .timeout(descriptor.call_timeout)
            .build()
            .map_err(|e| VerdantError::invalid_config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            descriptor: descriptor.clone(),
            budget: RateBudget::daily(u64::from(descriptor.rate_limit.requests_per_day)),
        })
    }

    /// Parse `base_url` joined with `path`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, VerdantError> {
        let raw = format!("{}{}", self.descriptor.base_url.trim_end_matches('/'), path);
        Url::parse(&raw)
            .map_err(|e| VerdantError::invalid_config(format!("bad url {raw}: {e}")))
    }

    /// Issue one GET and decode the body as JSON.
    pub(crate) async fn get_json(
        &self,
        mut url: Url,
        headers: &[(&'static str, &str)],
    ) -> Result<JsonResponse, VerdantError> {
        let name = &self.descriptor.name;
        let mut map = HeaderMap::new();
        map.insert(ACCEPT, HeaderValue::from_static("application/json"));
        map.insert(USER_AGENT, HeaderValue::from_static(AGENT));
        for &(k, v) in headers {
            map.insert(HeaderName::from_static(k), header_value(name, v)?);
        }

        if let Some(slot) = &self.descriptor.credential
            && let Some(value) = slot.effective_value()
        {
            if let Some(header) = &slot.header {
                let key = HeaderName::from_bytes(header.as_bytes()).map_err(|e| {
                    VerdantError::invalid_config(format!("bad credential header {header}: {e}"))
                })?;
                map.insert(key, header_value(name, value)?);
            }
            if let Some(param) = &slot.query_param {
                url.query_pairs_mut().append_pair(param, value);
            }
        }

        let secret_param = self
            .descriptor
            .credential
            .as_ref()
            .and_then(|s| s.query_param.as_deref());
        let endpoint = redacted(&url, secret_param);
        let resp = self
            .client
            .get(url)
            .headers(map)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = resp.status().as_u16();
        let remaining = self
            .descriptor
            .rate_limit_header
            .as_deref()
            .and_then(|h| resp.headers().get(h))
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let local = self.budget.consume();

        if !resp.status().is_success() {
            return Err(VerdantError::fetch(name, FetchCause::Http { status }));
        }
        let bytes = resp.bytes().await.map_err(|e| self.transport_error(&e))?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| VerdantError::fetch(name, FetchCause::Decode(e.to_string())))?;

        Ok(JsonResponse {
            body,
            status,
            endpoint,
            remaining: remaining.or(local),
        })
    }

    fn transport_error(&self, e: &reqwest::Error) -> VerdantError {
        let cause = if e.is_timeout() {
            FetchCause::Timeout {
                after_ms: u64::try_from(self.descriptor.call_timeout.as_millis())
                    .unwrap_or(u64::MAX),
            }
        } else {
            FetchCause::Transport(e.to_string())
        };
        VerdantError::fetch(&self.descriptor.name, cause)
    }
}

fn header_value(provider: &str, v: &str) -> Result<HeaderValue, VerdantError> {
    HeaderValue::from_str(v)
        .map_err(|e| VerdantError::invalid_config(format!("{provider}: bad header value: {e}")))
}

/// URL as text with the credential query parameter masked.
fn redacted(url: &Url, secret_param: Option<&str>) -> String {
    let Some(secret) = secret_param else {
        return url.to_string();
    };
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == secret { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    clean.query_pairs_mut().clear().extend_pairs(pairs);
    clean.to_string()
}
