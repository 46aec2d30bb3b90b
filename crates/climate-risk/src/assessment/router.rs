use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{FrameworkKind, Subject};
use super::generation::GenerationClient;
use super::orchestrator::AssessmentOrchestrator;
use super::sanitizer::SCORE_RANGE;
use super::statistics::SectorStatisticsProvider;
use super::taxonomy::Taxonomy;
use crate::scoring::{
    residual_risk, CategoryGroup, CategoryWeights, SectorCode, WeightResolution,
};

/// Router builder exposing assessment runs and weight lookups.
pub fn assessment_router<G, S>(orchestrator: Arc<AssessmentOrchestrator<G, S>>) -> Router
where
    G: GenerationClient + 'static,
    S: SectorStatisticsProvider + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(assessment_handler::<G, S>))
        .route("/api/v1/weights/resolve", post(resolve_weights_handler::<G, S>))
        .route("/api/v1/weights/:sector", get(weights_summary_handler::<G, S>))
        .route("/api/v1/sectors/map/:industry", get(map_industry_handler))
        .with_state(orchestrator)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub subject: Subject,
    #[serde(default)]
    pub taxonomy: Taxonomy,
    #[serde(default)]
    pub framework: FrameworkKind,
    #[serde(default)]
    pub require_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightQuery {
    pub sector: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub likelihood: Option<i64>,
    pub impact: Option<i64>,
    pub vulnerability: Option<i64>,
}

#[derive(Debug, Serialize)]
struct WeightAnswer {
    resolution: WeightResolution,
    composite_score: Option<f64>,
}

pub(crate) async fn assessment_handler<G, S>(
    State(orchestrator): State<Arc<AssessmentOrchestrator<G, S>>>,
    axum::Json(request): axum::Json<AssessmentRequest>,
) -> Response
where
    G: GenerationClient + 'static,
    S: SectorStatisticsProvider + 'static,
{
    if request.subject.name.trim().is_empty() {
        let payload = json!({
            "error": "subject name is required",
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    let run = orchestrator
        .run(&request.subject, request.taxonomy, request.framework)
        .await;

    if request.require_complete && !run.is_complete() {
        let failures: Vec<_> = run.failures().cloned().collect();
        let payload = json!({
            "error": format!(
                "{} of {} assessment pairs failed",
                failures.len(),
                run.outcomes.len()
            ),
            "failures": failures,
        });
        return (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response();
    }

    (StatusCode::OK, axum::Json(run)).into_response()
}

pub(crate) async fn resolve_weights_handler<G, S>(
    State(orchestrator): State<Arc<AssessmentOrchestrator<G, S>>>,
    axum::Json(query): axum::Json<WeightQuery>,
) -> Response
where
    G: GenerationClient + 'static,
    S: SectorStatisticsProvider + 'static,
{
    let resolution = orchestrator
        .resolver()
        .explain(&query.sector, &query.category, &query.subcategory);

    let composite_score = match (query.likelihood, query.impact, query.vulnerability) {
        (Some(likelihood), Some(impact), Some(vulnerability)) => Some(residual_risk(
            clamp_score(likelihood),
            clamp_score(impact),
            clamp_score(vulnerability),
            &resolution.weights,
        )),
        _ => None,
    };

    let answer = WeightAnswer {
        resolution,
        composite_score,
    };
    (StatusCode::OK, axum::Json(answer)).into_response()
}

pub(crate) async fn weights_summary_handler<G, S>(
    State(orchestrator): State<Arc<AssessmentOrchestrator<G, S>>>,
    Path(sector): Path<String>,
) -> Response
where
    G: GenerationClient + 'static,
    S: SectorStatisticsProvider + 'static,
{
    let code = SectorCode::from_code(&sector);
    let table = orchestrator.resolver().table();
    let detail: BTreeMap<CategoryGroup, CategoryWeights> = code
        .map(|sector| {
            CategoryGroup::ALL
                .into_iter()
                .filter(|group| table.has_category(sector, *group))
                .map(|group| (group, table.category(sector, group)))
                .collect()
        })
        .unwrap_or_default();
    let payload = json!({
        "sector": code.map(SectorCode::code),
        "version": table.version(),
        "categories": table.summary(code),
        "detail": detail,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn map_industry_handler(Path(industry): Path<String>) -> Response {
    let payload = json!({
        "industry": industry,
        "sector": SectorCode::from_industry(&industry).code(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn clamp_score(raw: i64) -> u8 {
    let (min, max) = SCORE_RANGE;
    raw.clamp(i64::from(min), i64::from(max)) as u8
}
