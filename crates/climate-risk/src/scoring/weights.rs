use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::domain::CategoryGroup::{
    Market, Opportunity, Physical, PolicyLegal, Reputation, Technology,
};
use super::domain::{CategoryGroup, WeightingTriple};
use super::sector::SectorCode;
use super::sector::SectorCode::{Agriculture, Energy, FoodBeverage, Manufacturing};

/// Composite key over the enumerated sector and category plus an optional
/// subcategory. `subcategory: None` addresses the category's `_default` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeightKey {
    pub sector: SectorCode,
    pub group: CategoryGroup,
    pub subcategory: Option<String>,
}

impl WeightKey {
    pub fn subcategory(sector: SectorCode, group: CategoryGroup, subcategory: &str) -> Self {
        Self {
            sector,
            group,
            subcategory: Some(subcategory.to_string()),
        }
    }

    pub fn category_default(sector: SectorCode, group: CategoryGroup) -> Self {
        Self {
            sector,
            group,
            subcategory: None,
        }
    }
}

/// All triples known for one (sector, category) cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryWeights {
    pub subcategories: BTreeMap<String, WeightingTriple>,
    #[serde(rename = "_default", skip_serializing_if = "Option::is_none")]
    pub default: Option<WeightingTriple>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WeightTableError {
    #[error("weights for {sector}/{group}/{subcategory} sum to {sum:.6}, expected 1.0")]
    NotNormalized {
        sector: SectorCode,
        group: CategoryGroup,
        subcategory: String,
        sum: f64,
    },
    #[error("weights for {sector}/{group}/{subcategory} contain a negative or non-finite value")]
    InvalidWeight {
        sector: SectorCode,
        group: CategoryGroup,
        subcategory: String,
    },
    #[error("duplicate weight entry for {sector}/{group}/{subcategory}")]
    Duplicate {
        sector: SectorCode,
        group: CategoryGroup,
        subcategory: String,
    },
}

/// Read-only, versioned lookup of weighting triples. Validated once at load.
#[derive(Debug, Clone)]
pub struct WeightTable {
    version: String,
    entries: HashMap<WeightKey, WeightingTriple>,
}

impl WeightTable {
    pub const STANDARD_VERSION: &'static str = "sector-weights-2025.1";

    /// Build a table, rejecting triples that are negative or do not sum to 1.0.
    pub fn from_entries<I>(version: impl Into<String>, entries: I) -> Result<Self, WeightTableError>
    where
        I: IntoIterator<Item = (WeightKey, WeightingTriple)>,
    {
        let mut table = HashMap::new();
        for (key, weights) in entries {
            let label = key.subcategory.clone().unwrap_or_else(|| "_default".to_string());
            if !weights.is_non_negative() {
                return Err(WeightTableError::InvalidWeight {
                    sector: key.sector,
                    group: key.group,
                    subcategory: label,
                });
            }
            if !weights.is_normalized() {
                return Err(WeightTableError::NotNormalized {
                    sector: key.sector,
                    group: key.group,
                    subcategory: label,
                    sum: weights.sum(),
                });
            }
            let (sector, group) = (key.sector, key.group);
            if table.insert(key, weights).is_some() {
                return Err(WeightTableError::Duplicate {
                    sector,
                    group,
                    subcategory: label,
                });
            }
        }

        Ok(Self {
            version: version.into(),
            entries: table,
        })
    }

    /// The built-in sector weighting profiles.
    pub fn standard() -> Result<Self, WeightTableError> {
        let entries = STANDARD_WEIGHTS.iter().map(|row| {
            let key = WeightKey {
                sector: row.0,
                group: row.1,
                subcategory: row.2.map(str::to_string),
            };
            (key, WeightingTriple::new(row.3, row.4, row.5))
        });
        Self::from_entries(Self::STANDARD_VERSION, entries)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &WeightKey) -> Option<WeightingTriple> {
        self.entries.get(key).copied()
    }

    pub fn has_category(&self, sector: SectorCode, group: CategoryGroup) -> bool {
        self.entries
            .keys()
            .any(|key| key.sector == sector && key.group == group)
    }

    pub fn category_default(
        &self,
        sector: SectorCode,
        group: CategoryGroup,
    ) -> Option<WeightingTriple> {
        self.get(&WeightKey::category_default(sector, group))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WeightKey, &WeightingTriple)> {
        self.entries.iter()
    }

    /// Every triple for one (sector, category) cell.
    pub fn category(&self, sector: SectorCode, group: CategoryGroup) -> CategoryWeights {
        let mut cell = CategoryWeights::default();
        for (key, weights) in self
            .entries
            .iter()
            .filter(|(key, _)| key.sector == sector && key.group == group)
        {
            match &key.subcategory {
                Some(name) => {
                    cell.subcategories.insert(name.clone(), *weights);
                }
                None => cell.default = Some(*weights),
            }
        }
        cell
    }

    /// Category-level defaults for a sector; unknown sectors report the global
    /// default for the five risk groups.
    pub fn summary(&self, sector: Option<SectorCode>) -> BTreeMap<CategoryGroup, WeightingTriple> {
        match sector {
            Some(sector) => CategoryGroup::ALL
                .into_iter()
                .filter(|group| self.has_category(sector, *group))
                .map(|group| {
                    let weights = self
                        .category_default(sector, group)
                        .unwrap_or(WeightingTriple::GLOBAL_DEFAULT);
                    (group, weights)
                })
                .collect(),
            None => CategoryGroup::RISK_GROUPS
                .into_iter()
                .map(|group| (group, WeightingTriple::GLOBAL_DEFAULT))
                .collect(),
        }
    }
}

type WeightRow = (
    SectorCode,
    CategoryGroup,
    Option<&'static str>,
    f64,
    f64,
    f64,
);

const CARBON_PRICING: Option<&str> = Some("Carbon pricing and reporting obligations");
const MANDATES: Option<&str> = Some("Mandates on and regulation of existing products and services");
const LITIGATION: Option<&str> = Some("Exposure to litigation");
const SUBSTITUTION: Option<&str> = Some("Substitution of existing products and services");
const UNSUCCESSFUL_INVESTMENT: Option<&str> = Some("Unsuccessful investment in new technologies");
const CUSTOMER_BEHAVIOR: Option<&str> = Some("Changing customer behavior");
const RAW_MATERIALS: Option<&str> = Some("Increased cost of raw materials");
const MARKET_SIGNALS: Option<&str> = Some("Uncertainty in market signals");
const CONSUMER_PREFERENCES: Option<&str> = Some("Shift in consumer preferences");
const STIGMATIZATION: Option<&str> = Some("Stigmatization of sector");
const SHAREHOLDER_CONCERN: Option<&str> = Some("Increased shareholder concern/negative feedback");
const ACUTE: Option<&str> = Some("Acute");
const CHRONIC: Option<&str> = Some("Chronic");
const DEFAULT: Option<&str> = None;

/// (sector, category, subcategory, likelihood, impact, vulnerability)
#[rustfmt::skip]
const STANDARD_WEIGHTS: &[WeightRow] = &[
    // Energy: regulatory exposure and stranded assets weigh on impact.
    (Energy, PolicyLegal, CARBON_PRICING, 0.25, 0.45, 0.30),
    (Energy, PolicyLegal, MANDATES, 0.30, 0.40, 0.30),
    (Energy, PolicyLegal, LITIGATION, 0.35, 0.40, 0.25),
    (Energy, PolicyLegal, DEFAULT, 0.30, 0.40, 0.30),
    (Energy, Technology, SUBSTITUTION, 0.35, 0.40, 0.25),
    (Energy, Technology, UNSUCCESSFUL_INVESTMENT, 0.30, 0.45, 0.25),
    (Energy, Technology, DEFAULT, 0.30, 0.40, 0.30),
    (Energy, Market, CUSTOMER_BEHAVIOR, 0.35, 0.35, 0.30),
    (Energy, Market, RAW_MATERIALS, 0.30, 0.40, 0.30),
    (Energy, Market, MARKET_SIGNALS, 0.35, 0.35, 0.30),
    (Energy, Market, DEFAULT, 0.33, 0.37, 0.30),
    (Energy, Reputation, CONSUMER_PREFERENCES, 0.35, 0.35, 0.30),
    (Energy, Reputation, STIGMATIZATION, 0.25, 0.45, 0.30),
    (Energy, Reputation, SHAREHOLDER_CONCERN, 0.30, 0.40, 0.30),
    (Energy, Reputation, DEFAULT, 0.30, 0.40, 0.30),
    (Energy, Physical, ACUTE, 0.35, 0.35, 0.30),
    (Energy, Physical, CHRONIC, 0.30, 0.35, 0.35),
    (Energy, Physical, DEFAULT, 0.32, 0.35, 0.33),
    (Energy, Opportunity, DEFAULT, 0.30, 0.40, 0.30),

    // Manufacturing: balanced, with supply-chain vulnerability.
    (Manufacturing, PolicyLegal, CARBON_PRICING, 0.30, 0.35, 0.35),
    (Manufacturing, PolicyLegal, MANDATES, 0.30, 0.35, 0.35),
    (Manufacturing, PolicyLegal, LITIGATION, 0.35, 0.35, 0.30),
    (Manufacturing, PolicyLegal, DEFAULT, 0.32, 0.35, 0.33),
    (Manufacturing, Technology, SUBSTITUTION, 0.35, 0.35, 0.30),
    (Manufacturing, Technology, UNSUCCESSFUL_INVESTMENT, 0.30, 0.40, 0.30),
    (Manufacturing, Technology, DEFAULT, 0.32, 0.38, 0.30),
    (Manufacturing, Market, CUSTOMER_BEHAVIOR, 0.35, 0.30, 0.35),
    (Manufacturing, Market, RAW_MATERIALS, 0.25, 0.35, 0.40),
    (Manufacturing, Market, MARKET_SIGNALS, 0.35, 0.30, 0.35),
    (Manufacturing, Market, DEFAULT, 0.32, 0.32, 0.36),
    (Manufacturing, Reputation, CONSUMER_PREFERENCES, 0.35, 0.35, 0.30),
    (Manufacturing, Reputation, STIGMATIZATION, 0.30, 0.40, 0.30),
    (Manufacturing, Reputation, SHAREHOLDER_CONCERN, 0.35, 0.35, 0.30),
    (Manufacturing, Reputation, DEFAULT, 0.33, 0.37, 0.30),
    (Manufacturing, Physical, ACUTE, 0.30, 0.30, 0.40),
    (Manufacturing, Physical, CHRONIC, 0.25, 0.35, 0.40),
    (Manufacturing, Physical, DEFAULT, 0.28, 0.32, 0.40),
    (Manufacturing, Opportunity, DEFAULT, 0.35, 0.35, 0.30),

    // Agriculture: physical exposure drives vulnerability.
    (Agriculture, PolicyLegal, CARBON_PRICING, 0.35, 0.30, 0.35),
    (Agriculture, PolicyLegal, MANDATES, 0.35, 0.30, 0.35),
    (Agriculture, PolicyLegal, LITIGATION, 0.40, 0.30, 0.30),
    (Agriculture, PolicyLegal, DEFAULT, 0.37, 0.30, 0.33),
    (Agriculture, Technology, SUBSTITUTION, 0.35, 0.30, 0.35),
    (Agriculture, Technology, UNSUCCESSFUL_INVESTMENT, 0.35, 0.35, 0.30),
    (Agriculture, Technology, DEFAULT, 0.35, 0.32, 0.33),
    (Agriculture, Market, CUSTOMER_BEHAVIOR, 0.30, 0.30, 0.40),
    (Agriculture, Market, RAW_MATERIALS, 0.25, 0.30, 0.45),
    (Agriculture, Market, MARKET_SIGNALS, 0.30, 0.30, 0.40),
    (Agriculture, Market, DEFAULT, 0.28, 0.30, 0.42),
    (Agriculture, Reputation, CONSUMER_PREFERENCES, 0.35, 0.35, 0.30),
    (Agriculture, Reputation, STIGMATIZATION, 0.30, 0.35, 0.35),
    (Agriculture, Reputation, SHAREHOLDER_CONCERN, 0.35, 0.30, 0.35),
    (Agriculture, Reputation, DEFAULT, 0.33, 0.33, 0.34),
    (Agriculture, Physical, ACUTE, 0.25, 0.30, 0.45),
    (Agriculture, Physical, CHRONIC, 0.20, 0.30, 0.50),
    (Agriculture, Physical, DEFAULT, 0.22, 0.30, 0.48),
    (Agriculture, Opportunity, DEFAULT, 0.35, 0.30, 0.35),

    // Technology: rapid change pushes likelihood up.
    (SectorCode::Technology, PolicyLegal, CARBON_PRICING, 0.40, 0.30, 0.30),
    (SectorCode::Technology, PolicyLegal, MANDATES, 0.40, 0.30, 0.30),
    (SectorCode::Technology, PolicyLegal, LITIGATION, 0.40, 0.35, 0.25),
    (SectorCode::Technology, PolicyLegal, DEFAULT, 0.40, 0.32, 0.28),
    (SectorCode::Technology, Technology, SUBSTITUTION, 0.40, 0.35, 0.25),
    (SectorCode::Technology, Technology, UNSUCCESSFUL_INVESTMENT, 0.35, 0.40, 0.25),
    (SectorCode::Technology, Technology, DEFAULT, 0.38, 0.37, 0.25),
    (SectorCode::Technology, Market, CUSTOMER_BEHAVIOR, 0.40, 0.35, 0.25),
    (SectorCode::Technology, Market, RAW_MATERIALS, 0.35, 0.35, 0.30),
    (SectorCode::Technology, Market, MARKET_SIGNALS, 0.40, 0.35, 0.25),
    (SectorCode::Technology, Market, DEFAULT, 0.38, 0.35, 0.27),
    (SectorCode::Technology, Reputation, CONSUMER_PREFERENCES, 0.40, 0.35, 0.25),
    (SectorCode::Technology, Reputation, STIGMATIZATION, 0.35, 0.40, 0.25),
    (SectorCode::Technology, Reputation, SHAREHOLDER_CONCERN, 0.40, 0.35, 0.25),
    (SectorCode::Technology, Reputation, DEFAULT, 0.38, 0.37, 0.25),
    (SectorCode::Technology, Physical, ACUTE, 0.40, 0.35, 0.25),
    (SectorCode::Technology, Physical, CHRONIC, 0.35, 0.35, 0.30),
    (SectorCode::Technology, Physical, DEFAULT, 0.38, 0.35, 0.27),
    (SectorCode::Technology, Opportunity, DEFAULT, 0.35, 0.40, 0.25),

    // Food & beverage: market and reputation sensitivity.
    (FoodBeverage, PolicyLegal, CARBON_PRICING, 0.35, 0.35, 0.30),
    (FoodBeverage, PolicyLegal, MANDATES, 0.35, 0.35, 0.30),
    (FoodBeverage, PolicyLegal, LITIGATION, 0.35, 0.40, 0.25),
    (FoodBeverage, PolicyLegal, DEFAULT, 0.35, 0.37, 0.28),
    (FoodBeverage, Technology, SUBSTITUTION, 0.35, 0.35, 0.30),
    (FoodBeverage, Technology, UNSUCCESSFUL_INVESTMENT, 0.35, 0.35, 0.30),
    (FoodBeverage, Technology, DEFAULT, 0.35, 0.35, 0.30),
    (FoodBeverage, Market, CUSTOMER_BEHAVIOR, 0.30, 0.40, 0.30),
    (FoodBeverage, Market, RAW_MATERIALS, 0.25, 0.35, 0.40),
    (FoodBeverage, Market, MARKET_SIGNALS, 0.35, 0.35, 0.30),
    (FoodBeverage, Market, DEFAULT, 0.30, 0.37, 0.33),
    (FoodBeverage, Reputation, CONSUMER_PREFERENCES, 0.30, 0.45, 0.25),
    (FoodBeverage, Reputation, STIGMATIZATION, 0.30, 0.45, 0.25),
    (FoodBeverage, Reputation, SHAREHOLDER_CONCERN, 0.30, 0.40, 0.30),
    (FoodBeverage, Reputation, DEFAULT, 0.30, 0.43, 0.27),
    (FoodBeverage, Physical, ACUTE, 0.30, 0.30, 0.40),
    (FoodBeverage, Physical, CHRONIC, 0.25, 0.30, 0.45),
    (FoodBeverage, Physical, DEFAULT, 0.28, 0.30, 0.42),
    (FoodBeverage, Opportunity, DEFAULT, 0.35, 0.40, 0.25),
];
