use std::sync::Arc;

use serde::Serialize;

use super::classifier::{CategoryClassifier, ClassificationRoute};
use super::domain::{CategoryGroup, WeightingTriple};
use super::sector::SectorCode;
use super::weights::{WeightKey, WeightTable};

/// The stage of the fallback chain that supplied a triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    Subcategory,
    CategoryDefault,
    GlobalDefault,
}

/// A resolved triple together with how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightResolution {
    pub sector: Option<SectorCode>,
    pub group: CategoryGroup,
    pub classification: ClassificationRoute,
    pub source: WeightSource,
    pub weights: WeightingTriple,
}

/// Resolves the weighting triple for a (sector, category, subcategory) combination.
/// Never fails: unresolved lookups degrade to broader defaults.
#[derive(Debug, Clone)]
pub struct WeightResolver {
    table: Arc<WeightTable>,
    classifier: CategoryClassifier,
}

impl WeightResolver {
    pub fn new(table: Arc<WeightTable>) -> Self {
        Self {
            table,
            classifier: CategoryClassifier::new(),
        }
    }

    pub fn table(&self) -> &WeightTable {
        &self.table
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Resolve from a raw sector identifier such as `"Food & Beverage"`.
    pub fn resolve(
        &self,
        sector: &str,
        category_label: &str,
        subcategory_label: &str,
    ) -> WeightingTriple {
        self.explain(sector, category_label, subcategory_label).weights
    }

    pub fn explain(
        &self,
        sector: &str,
        category_label: &str,
        subcategory_label: &str,
    ) -> WeightResolution {
        self.walk(SectorCode::from_code(sector), category_label, subcategory_label)
    }

    /// Resolve for an already-mapped sector.
    pub fn explain_sector(
        &self,
        sector: SectorCode,
        category_label: &str,
        subcategory_label: &str,
    ) -> WeightResolution {
        self.walk(Some(sector), category_label, subcategory_label)
    }

    fn walk(
        &self,
        sector: Option<SectorCode>,
        category_label: &str,
        subcategory_label: &str,
    ) -> WeightResolution {
        let classification = self.classifier.explain(category_label, subcategory_label);
        let global = |source_sector| WeightResolution {
            sector: source_sector,
            group: classification.group,
            classification: classification.route,
            source: WeightSource::GlobalDefault,
            weights: WeightingTriple::GLOBAL_DEFAULT,
        };

        let Some(sector) = sector else {
            return global(None);
        };
        if !self.table.has_category(sector, classification.group) {
            return global(Some(sector));
        }

        let key = WeightKey::subcategory(sector, classification.group, subcategory_label);
        if let Some(weights) = self.table.get(&key) {
            return WeightResolution {
                sector: Some(sector),
                group: classification.group,
                classification: classification.route,
                source: WeightSource::Subcategory,
                weights,
            };
        }

        match self.table.category_default(sector, classification.group) {
            Some(weights) => WeightResolution {
                sector: Some(sector),
                group: classification.group,
                classification: classification.route,
                source: WeightSource::CategoryDefault,
                weights,
            },
            None => global(Some(sector)),
        }
    }
}
