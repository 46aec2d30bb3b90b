use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::taxonomy::Taxonomy;
use crate::scoring::{SectorCode, WeightResolution};

/// Company or municipality being assessed, as passed to the generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: String,
    pub industry: String,
    #[serde(default = "default_carbon_intensity")]
    pub carbon_intensity: String,
    #[serde(default = "default_geography")]
    pub geography: Vec<String>,
    #[serde(default = "default_revenue")]
    pub revenue: String,
}

fn default_carbon_intensity() -> String {
    "medium".to_string()
}

fn default_geography() -> Vec<String> {
    vec!["north_america".to_string()]
}

fn default_revenue() -> String {
    "10m_100m".to_string()
}

impl Subject {
    pub fn new(name: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            industry: industry.into(),
            carbon_intensity: default_carbon_intensity(),
            geography: default_geography(),
            revenue: default_revenue(),
        }
    }

    pub fn sector(&self) -> SectorCode {
        SectorCode::from_industry(&self.industry)
    }
}

/// `standard` recomputes the composite from three weighted sub-scores;
/// `advanced` uses four metrics and keeps the generator's own composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkKind {
    #[default]
    Standard,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Risk,
    Opportunity,
}

/// A scored dimension, used both for sub-scores and peer rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Likelihood,
    Impact,
    Vulnerability,
    Exposure,
    StrategicMisalignment,
    MitigationReadiness,
    MarketReadiness,
    ValueCreation,
    Feasibility,
}

impl Metric {
    /// Field carrying the 1-5 sub-score in a generator response.
    pub const fn score_field(self) -> &'static str {
        match self {
            Metric::Likelihood => "likelihoodScore",
            Metric::Impact => "impactScore",
            Metric::Vulnerability => "vulnerabilityScore",
            Metric::Exposure => "exposureScore",
            Metric::StrategicMisalignment => "strategicMisalignmentScore",
            Metric::MitigationReadiness => "mitigationReadinessScore",
            Metric::MarketReadiness => "marketReadinessScore",
            Metric::ValueCreation => "valueCreationScore",
            Metric::Feasibility => "feasibilityScore",
        }
    }

    /// Key under `peerComparison.rankings`.
    pub const fn ranking_field(self) -> &'static str {
        match self {
            Metric::Likelihood => "likelihood",
            Metric::Impact => "impact",
            Metric::Vulnerability => "vulnerability",
            Metric::Exposure => "exposure",
            Metric::StrategicMisalignment => "strategicMisalignment",
            Metric::MitigationReadiness => "mitigationReadiness",
            Metric::MarketReadiness => "marketReadiness",
            Metric::ValueCreation => "valueCreation",
            Metric::Feasibility => "feasibility",
        }
    }
}

const STANDARD_METRICS: [Metric; 3] = [Metric::Likelihood, Metric::Impact, Metric::Vulnerability];
const ADVANCED_RISK_METRICS: [Metric; 4] = [
    Metric::Exposure,
    Metric::Vulnerability,
    Metric::StrategicMisalignment,
    Metric::MitigationReadiness,
];
const ADVANCED_OPPORTUNITY_METRICS: [Metric; 4] = [
    Metric::StrategicMisalignment,
    Metric::MarketReadiness,
    Metric::ValueCreation,
    Metric::Feasibility,
];

impl FrameworkKind {
    pub fn metrics(self, orientation: Orientation) -> &'static [Metric] {
        match (self, orientation) {
            (FrameworkKind::Standard, _) => &STANDARD_METRICS,
            (FrameworkKind::Advanced, Orientation::Risk) => &ADVANCED_RISK_METRICS,
            (FrameworkKind::Advanced, Orientation::Opportunity) => &ADVANCED_OPPORTUNITY_METRICS,
        }
    }
}

/// Sanitized 1-5 sub-scores for one framework variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubScores {
    Standard {
        likelihood: u8,
        impact: u8,
        vulnerability: u8,
    },
    AdvancedRisk {
        exposure: u8,
        vulnerability: u8,
        strategic_misalignment: u8,
        mitigation_readiness: u8,
    },
    AdvancedOpportunity {
        strategic_misalignment: u8,
        market_readiness: u8,
        value_creation: u8,
        feasibility: u8,
    },
}

impl SubScores {
    /// Assemble from a per-metric lookup; metrics absent from `score` are never requested.
    pub fn collect(
        framework: FrameworkKind,
        orientation: Orientation,
        mut score: impl FnMut(Metric) -> u8,
    ) -> Self {
        match (framework, orientation) {
            (FrameworkKind::Standard, _) => SubScores::Standard {
                likelihood: score(Metric::Likelihood),
                impact: score(Metric::Impact),
                vulnerability: score(Metric::Vulnerability),
            },
            (FrameworkKind::Advanced, Orientation::Risk) => SubScores::AdvancedRisk {
                exposure: score(Metric::Exposure),
                vulnerability: score(Metric::Vulnerability),
                strategic_misalignment: score(Metric::StrategicMisalignment),
                mitigation_readiness: score(Metric::MitigationReadiness),
            },
            (FrameworkKind::Advanced, Orientation::Opportunity) => SubScores::AdvancedOpportunity {
                strategic_misalignment: score(Metric::StrategicMisalignment),
                market_readiness: score(Metric::MarketReadiness),
                value_creation: score(Metric::ValueCreation),
                feasibility: score(Metric::Feasibility),
            },
        }
    }

    pub fn get(&self, metric: Metric) -> Option<u8> {
        match (*self, metric) {
            (SubScores::Standard { likelihood, .. }, Metric::Likelihood) => Some(likelihood),
            (SubScores::Standard { impact, .. }, Metric::Impact) => Some(impact),
            (SubScores::Standard { vulnerability, .. }, Metric::Vulnerability)
            | (SubScores::AdvancedRisk { vulnerability, .. }, Metric::Vulnerability) => {
                Some(vulnerability)
            }
            (SubScores::AdvancedRisk { exposure, .. }, Metric::Exposure) => Some(exposure),
            (
                SubScores::AdvancedRisk {
                    strategic_misalignment,
                    ..
                },
                Metric::StrategicMisalignment,
            )
            | (
                SubScores::AdvancedOpportunity {
                    strategic_misalignment,
                    ..
                },
                Metric::StrategicMisalignment,
            ) => Some(strategic_misalignment),
            (
                SubScores::AdvancedRisk {
                    mitigation_readiness,
                    ..
                },
                Metric::MitigationReadiness,
            ) => Some(mitigation_readiness),
            (
                SubScores::AdvancedOpportunity {
                    market_readiness, ..
                },
                Metric::MarketReadiness,
            ) => Some(market_readiness),
            (SubScores::AdvancedOpportunity { value_creation, .. }, Metric::ValueCreation) => {
                Some(value_creation)
            }
            (SubScores::AdvancedOpportunity { feasibility, .. }, Metric::Feasibility) => {
                Some(feasibility)
            }
            _ => None,
        }
    }
}

/// One (category, subcategory) unit of work within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentPair {
    pub category: String,
    pub subcategory: String,
    pub orientation: Orientation,
}

impl AssessmentPair {
    pub fn new(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        orientation: Orientation,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            orientation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerComparison {
    pub peers: Vec<String>,
    /// 1-6 position among peers per metric.
    pub rankings: BTreeMap<Metric, u8>,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub url: String,
    pub organization: String,
    pub relevance: String,
}

/// Sanitizer output: every field typed and bounded, before composite scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanitizedResponse {
    pub sub_scores: SubScores,
    /// Generator-reported composite clamped to [0, 5].
    pub reported_composite: f64,
    pub narrative: String,
    pub reasoning: String,
    pub peer_comparison: PeerComparison,
    pub sources: Vec<SourceCitation>,
}

/// Where a record's composite score came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CompositeBasis {
    /// Recomputed from sub-scores with sector weights.
    Weighted(WeightResolution),
    /// Taken from the generator after clamping.
    Reported,
}

/// Immutable output unit for one (subject, category, subcategory) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessmentRecord {
    pub category: String,
    pub subcategory: String,
    pub orientation: Orientation,
    pub sub_scores: SubScores,
    pub composite_score: f64,
    pub composite_basis: CompositeBasis,
    pub narrative: String,
    pub reasoning: String,
    pub peer_comparison: PeerComparison,
    pub sources: Vec<SourceCitation>,
}

/// A pair whose generation request failed after all retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairFailure {
    pub pair: AssessmentPair,
    pub error: String,
    pub attempts: u32,
    pub retryable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairOutcome {
    Assessed { record: RiskAssessmentRecord },
    Failed { failure: PairFailure },
}

impl PairOutcome {
    pub fn record(&self) -> Option<&RiskAssessmentRecord> {
        match self {
            PairOutcome::Assessed { record } => Some(record),
            PairOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&PairFailure> {
        match self {
            PairOutcome::Assessed { .. } => None,
            PairOutcome::Failed { failure } => Some(failure),
        }
    }
}

/// Result of one orchestration run, in enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRun {
    pub subject: String,
    pub sector: SectorCode,
    pub taxonomy: Taxonomy,
    pub framework: FrameworkKind,
    pub weight_table_version: String,
    pub sector_context_available: bool,
    pub generated_at: DateTime<Utc>,
    pub outcomes: Vec<PairOutcome>,
}

impl AssessmentRun {
    pub fn records(&self) -> impl Iterator<Item = &RiskAssessmentRecord> {
        self.outcomes.iter().filter_map(PairOutcome::record)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PairFailure> {
        self.outcomes.iter().filter_map(PairOutcome::failure)
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    /// All-or-nothing view: every record, or the failures if any pair failed.
    pub fn into_complete(self) -> Result<Vec<RiskAssessmentRecord>, AssessmentError> {
        let total = self.outcomes.len();
        let mut records = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome {
                PairOutcome::Assessed { record } => records.push(record),
                PairOutcome::Failed { failure } => failures.push(failure),
            }
        }

        if failures.is_empty() {
            Ok(records)
        } else {
            Err(AssessmentError::Incomplete { total, failures })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("{} of {total} assessment pairs failed", failures.len())]
    Incomplete {
        total: usize,
        failures: Vec<PairFailure>,
    },
}
