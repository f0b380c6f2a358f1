//! Weighted quality score shared by adapters and the monitor.

use verdant_types::QualityMetrics;

/// Weight of completeness in the overall score, in percent.
pub const COMPLETENESS_WEIGHT: f64 = 30.0;
/// Weight of accuracy in the overall score, in percent.
pub const ACCURACY_WEIGHT: f64 = 25.0;
/// Weight of timeliness in the overall score, in percent.
pub const TIMELINESS_WEIGHT: f64 = 20.0;
/// Weight of consistency in the overall score, in percent.
pub const CONSISTENCY_WEIGHT: f64 = 15.0;
/// Weight of the provider reliability tier in the overall score, in percent.
pub const RELIABILITY_WEIGHT: f64 = 10.0;

/// Map quality components to a single 0-100 score.
///
/// Any component that is not finite or lies outside [0, 100] makes the input
/// malformed, which scores 0.
#[must_use]
pub fn score(metrics: &QualityMetrics) -> f64 {
    let components = [
        metrics.completeness,
        metrics.accuracy,
        metrics.timeliness,
        metrics.consistency,
    ];
    if components
        .iter()
        .any(|v| !v.is_finite() || !(0.0..=100.0).contains(v))
    {
        return 0.0;
    }

    let weighted = metrics.completeness * COMPLETENESS_WEIGHT
        + metrics.accuracy * ACCURACY_WEIGHT
        + metrics.timeliness * TIMELINESS_WEIGHT
        + metrics.consistency * CONSISTENCY_WEIGHT
        + metrics.reliability.score() * RELIABILITY_WEIGHT;
    // Integral percent weights keep the all-100 case exact.
    (weighted / 100.0).clamp(0.0, 100.0)
}
