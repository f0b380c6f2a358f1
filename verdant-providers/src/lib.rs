//! verdant-providers
//!
//! HTTP adapters implementing [`ProviderAdapter`] for the providers with a
//! concrete integration: the NayaOne sandbox of the World Bank ESG dataset,
//! the World Bank open data indicators API and Alpha Vantage ESG scores.
//!
//! Every adapter issues exactly one GET per page, attaches the descriptor's
//! credential and reports failures as `ProviderFetch`. Pagination, pacing,
//! timeouts and call metrics are handled by [`verdant_core::paginate`].
#![warn(missing_docs)]

/// Alpha Vantage corporate ESG adapter.
pub mod alphavantage;
mod fields;
mod http;
/// NayaOne ESG World Bank adapter.
pub mod nayaone;
/// World Bank indicators adapter.
pub mod worldbank;

use std::sync::Arc;

pub use alphavantage::AlphaVantageAdapter;
pub use nayaone::NayaOneAdapter;
pub use worldbank::WorldBankAdapter;

use verdant_core::registry::{ALPHAVANTAGE, NAYAONE, WORLDBANK};
use verdant_core::{ProviderAdapter, Registry, SourceDescriptor, VerdantError};

/// Build the adapter matching `descriptor.name`, if one exists.
///
/// # Errors
/// Returns `InvalidConfig` when the HTTP client cannot be built.
pub fn adapter_for(
    descriptor: &SourceDescriptor,
) -> Result<Option<Arc<dyn ProviderAdapter>>, VerdantError> {
    let adapter: Arc<dyn ProviderAdapter> = match descriptor.name.as_str() {
        NAYAONE => Arc::new(NayaOneAdapter::new(descriptor.clone())?),
        WORLDBANK => Arc::new(WorldBankAdapter::new(descriptor.clone())?),
        ALPHAVANTAGE => Arc::new(AlphaVantageAdapter::new(descriptor.clone())?),
        _ => return Ok(None),
    };
    Ok(Some(adapter))
}

/// Adapters for every enabled provider in `registry` that has an integration.
///
/// Providers without one are skipped; the aggregator logs them when it runs.
/// A provider whose adapter cannot be built, e.g. because of a malformed base
/// URL override, is left out with a warning.
pub fn default_adapters(registry: &Registry) -> Vec<Arc<dyn ProviderAdapter>> {
    let mut out = Vec::new();
    for descriptor in registry.list_enabled() {
        match adapter_for(descriptor) {
            Ok(Some(adapter)) => out.push(adapter),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(provider = %descriptor.name, error = %e, "adapter unavailable; provider disabled");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_yields_free_adapters() {
        let registry = Registry::from_vars(std::iter::empty::<(String, String)>());
        let adapters = default_adapters(&registry);
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert!(names.contains(&WORLDBANK));
        assert!(names.contains(&ALPHAVANTAGE));
        assert!(!names.contains(&NAYAONE));
    }

    #[test]
    fn malformed_base_url_disables_only_that_provider() {
        let registry = Registry::from_vars([("VERDANT_WORLDBANK_BASE_URL", "not a url")]);
        let Err(err) = adapter_for(registry.get(WORLDBANK).unwrap()) else {
            panic!("malformed base url must be rejected");
        };
        assert!(err.is_configuration());

        let names: Vec<String> = default_adapters(&registry)
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        assert!(!names.iter().any(|n| n == WORLDBANK));
        assert!(names.iter().any(|n| n == ALPHAVANTAGE));
    }

    #[test]
    fn unknown_provider_has_no_adapter() {
        let d = SourceDescriptor::new("msci", verdant_core::Tier::Premium, "https://msci.test");
        assert!(adapter_for(&d).unwrap().is_none());
    }
}
