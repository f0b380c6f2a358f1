use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// Fully populated mock record with id `E{index}` updated at `at`.
#[must_use]
pub fn record_at(index: usize, at: DateTime<Utc>) -> Value {
    json!({
        "id": format!("E{index}"),
        "name": format!("Entity {index}"),
        "kind": "sovereign",
        "overall": 72.5,
        "environmental": 70.0,
        "social": 75.0,
        "governance": 72.5,
        "co2_emissions": 4.2,
        "unemployment_rate": 5.1,
        "rule_of_law": 1.3,
        "updated_at": at.to_rfc3339(),
    })
}

/// Fully populated mock record updated now.
#[must_use]
pub fn record(index: usize) -> Value {
    record_at(index, Utc::now())
}

/// `count` fully populated records starting at `start`.
#[must_use]
pub fn records(start: usize, count: usize) -> Vec<Value> {
    (start..start + count).map(record).collect()
}

/// Record lacking an entity name, which normalization drops.
#[must_use]
pub fn unidentifiable_record() -> Value {
    json!({ "id": "", "overall": 10.0 })
}
