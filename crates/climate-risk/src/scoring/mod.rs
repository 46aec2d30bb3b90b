//! Sector-dependent weighting and residual risk scoring.
//!
//! Every function here is total: unknown sectors, categories, and subcategories
//! degrade to broader defaults instead of failing.

mod classifier;
mod domain;
mod residual;
mod resolver;
mod sector;
mod weights;

pub use classifier::{CategoryClassifier, Classification, ClassificationRoute};
pub use domain::{CategoryGroup, WeightingTriple};
pub use residual::{residual_risk, MAX_COMPOSITE, MIN_COMPOSITE};
pub use resolver::{WeightResolution, WeightResolver, WeightSource};
pub use sector::{normalize_sector_code, SectorCode};
pub use weights::{CategoryWeights, WeightKey, WeightTable, WeightTableError};
