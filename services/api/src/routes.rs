use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use climate_risk::assessment::{
    assessment_router, AssessmentOrchestrator, GenerationClient, SectorStatisticsProvider,
};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) weight_table_version: String,
}

pub(crate) fn with_service_routes<G, S>(
    orchestrator: Arc<AssessmentOrchestrator<G, S>>,
) -> axum::Router
where
    G: GenerationClient + 'static,
    S: SectorStatisticsProvider + 'static,
{
    assessment_router(orchestrator)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        weight_table_version: state.weight_table_version,
    })
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Acquire) {
        (StatusCode::OK, Json(serde_json::json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::OfflineGenerator;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use climate_risk::assessment::{InMemorySectorStatistics, RetryPolicy};
    use climate_risk::scoring::{WeightResolver, WeightTable};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let table = WeightTable::standard().expect("standard weight table is valid");
        let version = table.version().to_string();
        let orchestrator = AssessmentOrchestrator::new(
            Arc::new(OfflineGenerator),
            Arc::new(InMemorySectorStatistics::new()),
            Arc::new(WeightResolver::new(Arc::new(table))),
        )
        .with_retry_policy(RetryPolicy::no_retry());
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            weight_table_version: version,
        };

        with_service_routes(Arc::new(orchestrator)).layer(Extension(state))
    }

    async fn call(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[tokio::test]
    async fn health_reports_weight_table_version() {
        let (status, payload) = call(
            app(true),
            Request::get("/health").body(Body::empty()).expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["weight_table_version"], WeightTable::STANDARD_VERSION);
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let (status, payload) = call(
            app(false),
            Request::get("/ready").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload["status"], "initializing");

        let (status, _) = call(
            app(true),
            Request::get("/ready").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn offline_assessment_runs_through_the_service_router() {
        let request = Request::post("/api/v1/assessments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&serde_json::json!({
                    "subject": {"name": "Harvest Valley Foods", "industry": "Packaged food"},
                    "taxonomy": "ecological",
                    "framework": "advanced",
                    "require_complete": true
                }))
                .expect("serialize"),
            ))
            .expect("request");

        let (status, payload) = call(app(true), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["sector"], "food_beverage");
        let outcomes = payload["outcomes"].as_array().expect("outcomes");
        assert_eq!(outcomes.len(), 18);
        assert!(outcomes
            .iter()
            .all(|outcome| outcome["record"]["composite_basis"]["method"] == "reported"));
    }
}
