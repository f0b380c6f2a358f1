use std::sync::Arc;

use verdant::{Aggregator, VerdantError};

use crate::helpers::*;

#[test]
fn registry_is_required() {
    let a = mock(ALPHA).build();
    let err = Aggregator::builder()
        .with_adapter(a)
        .build()
        .err()
        .expect("missing registry");
    assert!(matches!(err, VerdantError::InvalidConfig(_)));
}

#[test]
fn at_least_one_adapter_is_required() {
    let a = mock(ALPHA).build();
    let err = Aggregator::builder()
        .registry(registry_for(&[a]))
        .build()
        .err()
        .expect("no adapters");
    assert!(matches!(err, VerdantError::InvalidConfig(_)));
}

#[test]
fn zero_sizes_are_rejected() {
    let a = mock(ALPHA).build();
    let reg = registry_for(std::slice::from_ref(&a));
    let err = Aggregator::builder()
        .registry(Arc::clone(&reg))
        .with_adapter(a.clone())
        .batch_size(0)
        .build()
        .err()
        .expect("zero batch");
    assert!(err.is_configuration());

    let err = Aggregator::builder()
        .registry(reg)
        .with_adapter(a)
        .max_records(0)
        .build()
        .err()
        .expect("zero max records");
    assert!(err.is_configuration());
}

#[test]
fn adapter_must_be_declared_once() {
    let a = mock(ALPHA).build();
    let stray = mock(BETA).build();
    let reg = registry_for(std::slice::from_ref(&a));

    let err = Aggregator::builder()
        .registry(Arc::clone(&reg))
        .with_adapter(stray)
        .build()
        .err()
        .expect("unknown adapter");
    assert!(matches!(err, VerdantError::NotFound { .. }));

    let err = Aggregator::builder()
        .registry(reg)
        .with_adapter(a.clone())
        .with_adapter(a)
        .build()
        .err()
        .expect("duplicate adapter");
    assert!(matches!(err, VerdantError::InvalidConfig(_)));
}

#[test]
fn builder_settings_are_kept() {
    let a = mock(ALPHA).build();
    let agg = Aggregator::builder()
        .registry(registry_for(std::slice::from_ref(&a)))
        .with_adapter(a)
        .batch_size(25)
        .max_records(200)
        .filter("country", "FRA")
        .build()
        .expect("valid");
    assert_eq!(agg.config().batch_size, 25);
    assert_eq!(agg.config().max_records, 200);
    assert_eq!(agg.filters().get("country").map(String::as_str), Some("FRA"));
    assert!(agg.registry().is_enabled(ALPHA));
}
