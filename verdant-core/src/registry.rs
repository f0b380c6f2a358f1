//! Declarative provider catalogue and lookup.

use std::collections::{HashMap, HashSet};

use verdant_types::{
    Coverage, CredentialSlot, DataType, RateLimit, Reliability, SourceDescriptor, Tier,
    VerdantError,
};

/// Name of the NayaOne ESG World Bank dataset provider.
pub const NAYAONE: &str = "nayaone_esg_world_bank";
/// Name of the World Bank indicators provider.
pub const WORLDBANK: &str = "worldbank";
/// Name of the Alpha Vantage provider.
pub const ALPHAVANTAGE: &str = "alphavantage";

/// Immutable catalogue of provider descriptors in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    sources: Vec<SourceDescriptor>,
}

impl Registry {
    /// Build a registry from descriptors, keeping their order.
    ///
    /// # Errors
    /// Returns `InvalidConfig` when a name is empty or declared twice.
    pub fn new(sources: Vec<SourceDescriptor>) -> Result<Self, VerdantError> {
        let mut seen = HashSet::new();
        for s in &sources {
            if s.name.trim().is_empty() {
                return Err(VerdantError::invalid_config("provider name must not be empty"));
            }
            if !seen.insert(s.name.as_str()) {
                return Err(VerdantError::invalid_config(format!(
                    "provider {} declared twice",
                    s.name
                )));
            }
        }
        Ok(Self { sources })
    }

    /// Built-in catalogue with no configuration applied.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            sources: builtin_sources(),
        }
    }

    /// Built-in catalogue configured from environment-style key/values.
    ///
    /// See [`Registry::configure`].
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::builtin().configure(vars)
    }

    /// Built-in catalogue configured from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Apply environment-style key/values.
    ///
    /// - the descriptor's `credential.env_var` loads the credential value;
    /// - `VERDANT_<NAME>_BASE_URL` overrides the base endpoint;
    /// - `VERDANT_<NAME>_ENABLED` forces the enabled flag.
    ///
    /// A premium provider left without a real required credential is disabled
    /// instead of failing.
    #[must_use]
    pub fn configure<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        for source in &mut self.sources {
            let prefix = format!("VERDANT_{}", source.name.to_ascii_uppercase());
            if let Some(slot) = source.credential.as_mut()
                && let Some(value) = vars.get(&slot.env_var)
            {
                slot.value = Some(value.clone());
            }
            if let Some(url) = vars.get(&format!("{prefix}_BASE_URL")) {
                tracing::debug!(provider = %source.name, base_url = %url, "base url override");
                source.base_url = url.trim_end_matches('/').to_string();
            }
            if let Some(flag) = vars.get(&format!("{prefix}_ENABLED")) {
                match parse_flag(flag) {
                    Some(enabled) => source.enabled = enabled,
                    None => tracing::warn!(
                        provider = %source.name,
                        value = %flag,
                        "ignoring unparsable enabled flag"
                    ),
                }
            }
            if source.enabled && source.tier == Tier::Premium && !credential_ok(source) {
                tracing::info!(
                    provider = %source.name,
                    "premium provider disabled: credential missing"
                );
                source.enabled = false;
            }
        }
        self
    }

    /// Enabled descriptors in declaration order.
    #[must_use]
    pub fn list_enabled(&self) -> Vec<&SourceDescriptor> {
        self.sources.iter().filter(|s| s.enabled).collect()
    }

    /// Descriptors of `tier` in declaration order, enabled or not.
    #[must_use]
    pub fn list_by_tier(&self, tier: Tier) -> Vec<&SourceDescriptor> {
        self.sources.iter().filter(|s| s.tier == tier).collect()
    }

    /// Every descriptor in declaration order.
    #[must_use]
    pub fn all(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    /// Look up a descriptor by name.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown name.
    pub fn get(&self, name: &str) -> Result<&SourceDescriptor, VerdantError> {
        self.sources
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| VerdantError::not_found(format!("provider {name}")))
    }

    /// True when `name` is declared and enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_ok_and(|s| s.enabled)
    }

    /// Enabled provider names: free before premium, then descending
    /// reliability, ties kept in declaration order.
    #[must_use]
    pub fn priority_order(&self) -> Vec<&str> {
        let mut enabled = self.list_enabled();
        enabled.sort_by_key(|s| {
            (
                match s.tier {
                    Tier::Free => 0u8,
                    Tier::Premium => 1,
                },
                std::cmp::Reverse(s.reliability),
            )
        });
        enabled.into_iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether `name` can be called with its configured credential.
    #[must_use]
    pub fn has_valid_credential(&self, name: &str) -> bool {
        self.get(name).is_ok_and(credential_ok)
    }
}

fn credential_ok(source: &SourceDescriptor) -> bool {
    match (source.tier, &source.credential) {
        (Tier::Free, None) => true,
        (Tier::Free, Some(slot)) => !slot.required || slot.has_real_value(),
        // Premium access always needs a real key.
        (Tier::Premium, None) => false,
        (Tier::Premium, Some(slot)) => slot.has_real_value(),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn coverage(entities: u32, jurisdictions: u32, sectors: &[&str]) -> Coverage {
    Coverage {
        entities: (entities > 0).then_some(entities),
        jurisdictions: Some(jurisdictions),
        sectors: sectors.iter().map(|s| (*s).to_string()).collect(),
    }
}

fn builtin_sources() -> Vec<SourceDescriptor> {
    use DataType::{Climate, Environmental, Financial, Governance, Regulatory, Social, Sovereign};

    vec![
        SourceDescriptor::new(WORLDBANK, Tier::Free, "https://api.worldbank.org/v2")
            .with_description("World Bank open indicators for sovereign ESG analysis")
            .with_rate_limit(RateLimit::new(60, 10_000))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(0, 217, &["government"]))
            .with_data_types(&[Environmental, Social, Governance, Sovereign]),
        SourceDescriptor::new(ALPHAVANTAGE, Tier::Free, "https://www.alphavantage.co/query")
            .with_description("Company ESG ratings from Alpha Vantage")
            .with_credential(
                CredentialSlot::new("ALPHA_VANTAGE_API_KEY")
                    .query_param("apikey")
                    .placeholder("demo"),
            )
            .with_rate_limit(RateLimit::new(5, 500))
            .with_reliability(Reliability::Medium)
            .with_coverage(coverage(8000, 50, &["technology", "financials", "energy"]))
            .with_data_types(&[Environmental, Social, Governance, Financial]),
        SourceDescriptor::new("cssf_api", Tier::Free, "https://www.cssf.lu/api")
            .with_description("Luxembourg supervisory disclosures")
            .with_rate_limit(RateLimit::new(30, 1000))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(5000, 1, &["funds", "banking"]))
            .with_data_types(&[Regulatory, Governance]),
        SourceDescriptor::new("esma_open_data", Tier::Free, "https://registers.esma.europa.eu/api")
            .with_description("ESMA registers and sustainable finance disclosures")
            .with_rate_limit(RateLimit::new(60, 2000))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(50_000, 27, &["securities", "funds"]))
            .with_data_types(&[Regulatory, Financial]),
        SourceDescriptor::new("ecb_data_portal", Tier::Free, "https://data-api.ecb.europa.eu/service")
            .with_description("ECB statistical data including climate indicators")
            .with_rate_limit(RateLimit::new(100, 5000))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(0, 27, &["macroeconomic"]))
            .with_data_types(&[Financial, Climate]),
        SourceDescriptor::new("eba_open_data", Tier::Free, "https://www.eba.europa.eu/api")
            .with_description("EBA banking ESG risk disclosures")
            .with_rate_limit(RateLimit::new(50, 1500))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(3000, 27, &["banking"]))
            .with_data_types(&[Regulatory, Financial, Climate]),
        SourceDescriptor::new("eiopa_data", Tier::Free, "https://www.eiopa.europa.eu/api")
            .with_description("EIOPA insurance and pensions climate data")
            .with_rate_limit(RateLimit::new(40, 1200))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(2500, 27, &["insurance", "pensions"]))
            .with_data_types(&[Regulatory, Climate]),
        SourceDescriptor::new(NAYAONE, Tier::Premium, "https://data.nayaone.com/esg_world_bank")
            .with_description("NayaOne global ESG sustainability indicators dataset")
            .with_credential(CredentialSlot::new("NAYAONE_SANDPIT_KEY").header("sandpit-key"))
            .with_rate_limit(RateLimit::new(60, 5000))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(0, 213, &["government"]))
            .with_data_types(&[Environmental, Social, Governance, Sovereign]),
        SourceDescriptor::new("sustainalytics", Tier::Premium, "https://api.sustainalytics.com")
            .with_description("Sustainalytics ESG risk ratings")
            .with_credential(CredentialSlot::new("SUSTAINALYTICS_API_KEY").header("authorization"))
            .with_rate_limit(RateLimit::new(100, 10_000))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(20_000, 100, &[]))
            .with_data_types(&[Environmental, Social, Governance])
            .enabled(false),
        SourceDescriptor::new("msci", Tier::Premium, "https://api.msci.com")
            .with_description("MSCI ESG ratings")
            .with_credential(CredentialSlot::new("MSCI_API_KEY").header("authorization"))
            .with_rate_limit(RateLimit::new(200, 20_000))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(25_000, 120, &[]))
            .with_data_types(&[Environmental, Social, Governance])
            .enabled(false),
        SourceDescriptor::new("bloomberg", Tier::Premium, "https://api.bloomberg.com")
            .with_description("Bloomberg ESG data")
            .with_credential(CredentialSlot::new("BLOOMBERG_API_KEY").header("authorization"))
            .with_rate_limit(RateLimit::new(500, 50_000))
            .with_reliability(Reliability::High)
            .with_coverage(coverage(30_000, 150, &[]))
            .with_data_types(&[Environmental, Social, Governance])
            .enabled(false),
    ]
}
