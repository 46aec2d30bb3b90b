use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight set for the residual risk formula. Components sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightingTriple {
    pub likelihood: f64,
    pub impact: f64,
    pub vulnerability: f64,
}

impl WeightingTriple {
    /// Tolerance applied when checking that a triple sums to one.
    pub const SUM_TOLERANCE: f64 = 1e-6;

    /// Used whenever no sector or category specific triple applies.
    pub const GLOBAL_DEFAULT: WeightingTriple = WeightingTriple::new(0.33, 0.34, 0.33);

    pub const fn new(likelihood: f64, impact: f64, vulnerability: f64) -> Self {
        Self {
            likelihood,
            impact,
            vulnerability,
        }
    }

    pub fn sum(&self) -> f64 {
        self.likelihood + self.impact + self.vulnerability
    }

    pub fn is_non_negative(&self) -> bool {
        [self.likelihood, self.impact, self.vulnerability]
            .iter()
            .all(|weight| weight.is_finite() && *weight >= 0.0)
    }

    pub fn is_normalized(&self) -> bool {
        self.is_non_negative() && (self.sum() - 1.0).abs() <= Self::SUM_TOLERANCE
    }
}

impl Default for WeightingTriple {
    fn default() -> Self {
        Self::GLOBAL_DEFAULT
    }
}

/// Canonical risk and opportunity taxonomy used to index the weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryGroup {
    #[serde(rename = "Policy / Legal")]
    PolicyLegal,
    Technology,
    Market,
    Reputation,
    Physical,
    Opportunity,
}

impl CategoryGroup {
    pub const ALL: [CategoryGroup; 6] = [
        CategoryGroup::PolicyLegal,
        CategoryGroup::Technology,
        CategoryGroup::Market,
        CategoryGroup::Reputation,
        CategoryGroup::Physical,
        CategoryGroup::Opportunity,
    ];

    /// Groups reported when summarising an unknown sector.
    pub const RISK_GROUPS: [CategoryGroup; 5] = [
        CategoryGroup::PolicyLegal,
        CategoryGroup::Technology,
        CategoryGroup::Market,
        CategoryGroup::Reputation,
        CategoryGroup::Physical,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CategoryGroup::PolicyLegal => "Policy / Legal",
            CategoryGroup::Technology => "Technology",
            CategoryGroup::Market => "Market",
            CategoryGroup::Reputation => "Reputation",
            CategoryGroup::Physical => "Physical",
            CategoryGroup::Opportunity => "Opportunity",
        }
    }

    /// Exact match against the canonical labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.label() == label)
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_default_is_normalized() {
        assert!(WeightingTriple::GLOBAL_DEFAULT.is_normalized());
        assert_eq!(WeightingTriple::default(), WeightingTriple::GLOBAL_DEFAULT);
    }

    #[test]
    fn negative_weights_are_not_normalized() {
        let triple = WeightingTriple::new(-0.2, 0.6, 0.6);
        assert!((triple.sum() - 1.0).abs() < 1e-9);
        assert!(!triple.is_normalized());
    }

    #[test]
    fn labels_round_trip_through_from_label() {
        for group in CategoryGroup::ALL {
            assert_eq!(CategoryGroup::from_label(group.label()), Some(group));
        }
        assert_eq!(CategoryGroup::from_label("policy / legal"), None);
    }

    #[test]
    fn serializes_with_canonical_label() {
        let json = serde_json::to_string(&CategoryGroup::PolicyLegal).expect("serializes");
        assert_eq!(json, "\"Policy / Legal\"");
    }
}
