use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use serde_json::{json, Value};

use crate::assessment::{
    AssessmentOrchestrator, GenerationClient, GenerationError, GenerationRequest,
    InMemorySectorStatistics, RetryPolicy, ScenarioImpact, SectorProfile,
    SectorStatisticsProvider, StatisticsError, Subject,
};
use crate::scoring::{SectorCode, WeightResolver, WeightTable};

pub(super) const CARBON_PRICING: &str = "Carbon pricing and reporting obligations";

pub(super) fn energy_subject() -> Subject {
    Subject::new("Prairie Power Cooperative", "Electric utilities")
}

pub(super) fn resolver() -> Arc<WeightResolver> {
    let table = WeightTable::standard().expect("standard weight table is valid");
    Arc::new(WeightResolver::new(Arc::new(table)))
}

pub(super) fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::ZERO)
}

pub(super) fn orchestrator(
    generator: ScriptedGenerator,
) -> AssessmentOrchestrator<ScriptedGenerator, InMemorySectorStatistics> {
    orchestrator_with_statistics(generator, InMemorySectorStatistics::new())
}

pub(super) fn orchestrator_with_statistics<S: SectorStatisticsProvider>(
    generator: ScriptedGenerator,
    statistics: S,
) -> AssessmentOrchestrator<ScriptedGenerator, S> {
    AssessmentOrchestrator::new(Arc::new(generator), Arc::new(statistics), resolver())
        .with_retry_policy(fast_retry())
}

pub(super) fn standard_response(likelihood: u8, impact: u8, vulnerability: u8) -> Value {
    json!({
        "likelihoodScore": likelihood,
        "impactScore": impact,
        "vulnerabilityScore": vulnerability,
        "narrative": "Carbon costs rise sharply under announced policies.",
        "reasoning": "Coal-heavy generation mix with limited hedging.",
        "peerComparison": {
            "peers": ["Midwest Energy", "Great Plains Electric"],
            "rankings": {"likelihood": 2, "impact": 1, "vulnerability": 3},
            "rationale": "Higher coal share than peers."
        },
        "sources": [
            {
                "title": "World Energy Outlook",
                "url": "https://www.iea.org/reports/world-energy-outlook-2024",
                "organization": "IEA",
                "relevance": "Carbon price trajectories"
            }
        ]
    })
}

/// Scores derived from the subcategory text so responses are stable across runs.
pub(super) fn deterministic_response(request: &GenerationRequest) -> Value {
    let seed: usize = request.subcategory.bytes().map(usize::from).sum();
    json!({
        "likelihoodScore": seed % 5 + 1,
        "impactScore": (seed / 5) % 5 + 1,
        "vulnerabilityScore": (seed / 25) % 5 + 1,
        "exposureScore": (seed / 3) % 5 + 1,
        "strategicMisalignmentScore": (seed / 7) % 5 + 1,
        "mitigationReadinessScore": (seed / 11) % 5 + 1,
        "marketReadinessScore": (seed / 13) % 5 + 1,
        "valueCreationScore": (seed / 17) % 5 + 1,
        "feasibilityScore": (seed / 19) % 5 + 1,
        "overallRisk": (seed % 50) as f64 / 10.0,
        "narrative": format!("Narrative for {}", request.subcategory),
    })
}

/// Generation collaborator double with per-subcategory scripts and failures.
#[derive(Default)]
pub(super) struct ScriptedGenerator {
    responses: HashMap<String, Value>,
    failures: HashMap<String, (u32, GenerationError)>,
    opportunity: Option<Result<Value, GenerationError>>,
    calls: Mutex<HashMap<String, u32>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn respond(mut self, subcategory: &str, response: Value) -> Self {
        self.responses.insert(subcategory.to_string(), response);
        self
    }

    /// Fail the first `times` requests for `subcategory` with `error`.
    pub(super) fn fail(mut self, subcategory: &str, times: u32, error: GenerationError) -> Self {
        self.failures
            .insert(subcategory.to_string(), (times, error));
        self
    }

    pub(super) fn opportunities(mut self, outcome: Result<Value, GenerationError>) -> Self {
        self.opportunity = Some(outcome);
        self
    }

    pub(super) fn calls_for(&self, subcategory: &str) -> u32 {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .get(subcategory)
            .copied()
            .unwrap_or(0)
    }

    pub(super) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerator {
    async fn assess(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let call = {
            let mut calls = self.calls.lock().expect("calls mutex poisoned");
            let count = calls.entry(request.subcategory.clone()).or_insert(0);
            *count += 1;
            *count
        };
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request.clone());

        if let Some((times, error)) = self.failures.get(&request.subcategory) {
            if call <= *times {
                return Err(error.clone());
            }
        }

        Ok(self
            .responses
            .get(&request.subcategory)
            .cloned()
            .unwrap_or_else(|| deterministic_response(request)))
    }

    async fn opportunity_subcategories(
        &self,
        _subject: &Subject,
    ) -> Result<Value, GenerationError> {
        self.opportunity
            .clone()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

pub(super) struct UnavailableStatistics;

#[async_trait]
impl SectorStatisticsProvider for UnavailableStatistics {
    async fn profile(&self, _sector: SectorCode) -> Result<Option<SectorProfile>, StatisticsError> {
        Err(StatisticsError::Unavailable("warehouse offline".to_string()))
    }

    async fn scenario_impacts(
        &self,
        _sector: SectorCode,
    ) -> Result<Vec<ScenarioImpact>, StatisticsError> {
        Err(StatisticsError::Unavailable("warehouse offline".to_string()))
    }
}

pub(super) fn energy_statistics() -> InMemorySectorStatistics {
    InMemorySectorStatistics::new()
        .with_profile(SectorProfile {
            sector: SectorCode::Energy,
            sector_name: "Energy".to_string(),
            annual_emissions_mt_co2: Some(15_000.0),
            emissions_intensity: Some(0.45),
            emissions_trend: Some("declining".to_string()),
            gdp_contribution_percent: Some(3.2),
            transition_risk_level: Some("very_high".to_string()),
            key_risks: vec!["Stranded coal assets".to_string()],
            key_opportunities: vec!["Grid-scale storage".to_string()],
        })
        .with_scenario_impact(impact("Current Policies", 2030, 40.0))
        .with_scenario_impact(impact("Net Zero 2050", 2030, 140.0))
        .with_scenario_impact(impact("Net Zero 2050", 2050, 250.0))
}

fn impact(scenario: &str, year: i32, carbon_price: f64) -> ScenarioImpact {
    ScenarioImpact {
        sector: SectorCode::Energy,
        scenario_name: scenario.to_string(),
        year,
        gdp_impact_percent: Some(-0.8),
        carbon_price_usd: Some(carbon_price),
        investment_required_billions: None,
        stranded_asset_risk_percent: Some(18.0),
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json body")
}
