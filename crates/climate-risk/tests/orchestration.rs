use std::sync::Arc;

use async_trait::async_trait;
use climate_risk::assessment::{
    AssessmentOrchestrator, FrameworkKind, GenerationClient, GenerationError, GenerationRequest,
    InMemorySectorStatistics, RetryPolicy, Subject, Taxonomy,
};
use climate_risk::scoring::{WeightResolver, WeightTable};
use serde_json::{json, Value};

/// Returns a fixed response per subcategory length, like a cached generator.
struct FixedGenerator;

#[async_trait]
impl GenerationClient for FixedGenerator {
    async fn assess(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let n = request.subcategory.len();
        Ok(json!({
            "likelihoodScore": n % 5 + 1,
            "impactScore": (n + 2) % 5 + 1,
            "vulnerabilityScore": (n + 4) % 5 + 1,
        }))
    }

    async fn opportunity_subcategories(
        &self,
        _subject: &Subject,
    ) -> Result<Value, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

fn orchestrator() -> AssessmentOrchestrator<FixedGenerator, InMemorySectorStatistics> {
    let table = WeightTable::standard().expect("standard weight table is valid");
    AssessmentOrchestrator::new(
        Arc::new(FixedGenerator),
        Arc::new(InMemorySectorStatistics::new()),
        Arc::new(WeightResolver::new(Arc::new(table))),
    )
    .with_retry_policy(RetryPolicy::no_retry())
}

#[tokio::test]
async fn every_composite_is_bounded() {
    let subject = Subject::new("Harvest Valley Foods", "Packaged food and beverage");
    let run = orchestrator()
        .run(&subject, Taxonomy::Tcfd, FrameworkKind::Standard)
        .await;

    let records = run.into_complete().expect("all pairs assessed");
    assert_eq!(records.len(), 30);
    assert!(records
        .iter()
        .all(|record| (1.0..=5.0).contains(&record.composite_score)));
}

