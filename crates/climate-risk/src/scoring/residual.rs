use super::domain::WeightingTriple;

pub const MIN_COMPOSITE: f64 = 1.0;
pub const MAX_COMPOSITE: f64 = 5.0;

/// Residual risk = w1*likelihood + w2*impact + w3*vulnerability, clamped to
/// [1, 5] and rounded to two decimals.
pub fn residual_risk(
    likelihood: u8,
    impact: u8,
    vulnerability: u8,
    weights: &WeightingTriple,
) -> f64 {
    let raw = weights.likelihood * f64::from(likelihood)
        + weights.impact * f64::from(impact)
        + weights.vulnerability * f64::from(vulnerability);

    if !raw.is_finite() {
        return MIN_COMPOSITE;
    }

    let clamped = raw.clamp(MIN_COMPOSITE, MAX_COMPOSITE);
    (clamped * 100.0).round() / 100.0
}
