//! verdant-core
//!
//! Provider contract and the pure building blocks shared across verdant:
//!
//! - `adapter`: the `ProviderAdapter` trait, page types and the sequential
//!   pagination driver every provider shares.
//! - `registry`: the declarative provider catalogue.
//! - `scoring` and `quality`: the weighted quality score and batch assessment.
//!
//! The pagination driver and `TaskHandle` are built on Tokio timers and tasks,
//! so callers must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Provider adapter contract and pagination driver.
pub mod adapter;
/// Windowed request budget.
pub mod budget;
/// Batch quality assessment.
pub mod quality;
/// Provider catalogue.
pub mod registry;
/// Weighted quality score.
pub mod scoring;
/// Background task handle.
pub mod task;

pub use adapter::{
    CallObserver, FetchOutcome, NoopObserver, OffsetRule, Page, PageRequest, Pagination,
    ProviderAdapter, RawPayload, Normalized, paginate,
};
pub use budget::RateBudget;
pub use quality::{QualityProfile, RequiredField, assess};
pub use registry::Registry;
pub use scoring::score;
pub use task::TaskHandle;
pub use verdant_types::*;
