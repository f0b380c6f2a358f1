#![allow(dead_code)]

use std::sync::Arc;

use verdant::{ProviderAdapter, Registry, Reliability};
use verdant_mock::MockAdapter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,verdant=debug")),
        )
        .try_init();
}

/// Registry and adapters: live providers by default, mocks when
/// `VERDANT_EXAMPLES_USE_MOCK` is set.
pub fn setup() -> Result<(Arc<Registry>, Vec<Arc<dyn ProviderAdapter>>), verdant::VerdantError> {
    if std::env::var("VERDANT_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using mock adapters for CI) ---");
        let mocks = [
            MockAdapter::builder("mock_sovereign").records(25).build(),
            MockAdapter::builder("mock_corporate")
                .reliability(Reliability::Medium)
                .records(5)
                .remaining(3)
                .build(),
        ];
        let registry = Registry::new(mocks.iter().map(|m| m.descriptor().clone()).collect())?;
        let adapters = mocks
            .into_iter()
            .map(|m| m as Arc<dyn ProviderAdapter>)
            .collect();
        Ok((Arc::new(registry), adapters))
    } else {
        let registry = Arc::new(Registry::from_env());
        let adapters = verdant_providers::default_adapters(&registry);
        Ok((registry, adapters))
    }
}
