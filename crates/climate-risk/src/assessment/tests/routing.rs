use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::assessment::{assessment_router, GenerationError};

fn router(generator: ScriptedGenerator) -> axum::Router {
    assessment_router(Arc::new(orchestrator(generator)))
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&payload).expect("serialize payload"),
        ))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn assessment_route_returns_the_run() {
    let generator = ScriptedGenerator::new().respond(CARBON_PRICING, standard_response(4, 5, 3));

    let response = router(generator)
        .oneshot(post_json(
            "/api/v1/assessments",
            json!({
                "subject": {"name": "Prairie Power Cooperative", "industry": "Electric utilities"}
            }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["sector"], "energy");
    assert_eq!(payload["taxonomy"], "transition");
    assert_eq!(payload["framework"], "standard");
    let outcomes = payload["outcomes"].as_array().expect("outcomes array");
    assert_eq!(outcomes.len(), 11);
    assert_eq!(outcomes[0]["status"], "assessed");
    assert_eq!(outcomes[0]["record"]["composite_score"], 4.15);
    assert_eq!(outcomes[0]["record"]["composite_basis"]["method"], "weighted");
}

#[tokio::test]
async fn require_complete_rejects_partial_runs() {
    let generator =
        ScriptedGenerator::new().fail(CARBON_PRICING, u32::MAX, GenerationError::Authentication);

    let response = router(generator)
        .oneshot(post_json(
            "/api/v1/assessments",
            json!({
                "subject": {"name": "Prairie Power Cooperative", "industry": "Electric utilities"},
                "taxonomy": "transition",
                "require_complete": true
            }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let payload = json_body(response).await;
    assert_eq!(payload["error"], "1 of 11 assessment pairs failed");
    assert_eq!(payload["failures"][0]["pair"]["subcategory"], CARBON_PRICING);
    assert_eq!(payload["failures"][0]["retryable"], false);
}

#[tokio::test]
async fn partial_runs_are_returned_by_default() {
    let generator =
        ScriptedGenerator::new().fail(CARBON_PRICING, u32::MAX, GenerationError::Timeout);

    let response = router(generator)
        .oneshot(post_json(
            "/api/v1/assessments",
            json!({
                "subject": {"name": "Prairie Power Cooperative", "industry": "Electric utilities"}
            }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["outcomes"][0]["status"], "failed");
    assert_eq!(payload["outcomes"][0]["failure"]["attempts"], 3);
}

#[tokio::test]
async fn blank_subject_name_is_unprocessable() {
    let response = router(ScriptedGenerator::new())
        .oneshot(post_json(
            "/api/v1/assessments",
            json!({"subject": {"name": "  ", "industry": "Software"}}),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn resolve_route_reports_weights_and_composite() {
    let response = router(ScriptedGenerator::new())
        .oneshot(post_json(
            "/api/v1/weights/resolve",
            json!({
                "sector": "energy",
                "category": "Policy / Legal",
                "subcategory": CARBON_PRICING,
                "likelihood": 4,
                "impact": 5,
                "vulnerability": 3
            }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["resolution"]["source"], "subcategory");
    assert_eq!(payload["resolution"]["weights"]["impact"], 0.45);
    assert_eq!(payload["composite_score"], 4.15);
}

#[tokio::test]
async fn resolve_route_falls_through_to_global_default() {
    let response = router(ScriptedGenerator::new())
        .oneshot(post_json(
            "/api/v1/weights/resolve",
            json!({"sector": "unknown_sector", "category": "NotACategory", "subcategory": ""}),
        ))
        .await
        .expect("router response");

    let payload = json_body(response).await;
    assert_eq!(payload["resolution"]["source"], "global_default");
    assert_eq!(
        payload["resolution"]["weights"],
        json!({"likelihood": 0.33, "impact": 0.34, "vulnerability": 0.33})
    );
    assert_eq!(payload["composite_score"], Value::Null);
}

#[tokio::test]
async fn weights_summary_route_lists_category_defaults() {
    let response = router(ScriptedGenerator::new())
        .oneshot(get("/api/v1/weights/technology"))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["sector"], "technology");
    assert_eq!(
        payload["categories"]["Market"],
        json!({"likelihood": 0.38, "impact": 0.35, "vulnerability": 0.27})
    );
}

#[tokio::test]
async fn weights_summary_route_lists_subcategory_triples() {
    let response = router(ScriptedGenerator::new())
        .oneshot(get("/api/v1/weights/energy"))
        .await
        .expect("router response");

    let payload = json_body(response).await;
    let policy = &payload["detail"]["Policy / Legal"];
    assert_eq!(
        policy["_default"],
        json!({"likelihood": 0.30, "impact": 0.40, "vulnerability": 0.30})
    );
    assert_eq!(
        policy["subcategories"][CARBON_PRICING],
        json!({"likelihood": 0.25, "impact": 0.45, "vulnerability": 0.30})
    );
}

#[tokio::test]
async fn weights_summary_for_unknown_sector_uses_global_defaults() {
    let response = router(ScriptedGenerator::new())
        .oneshot(get("/api/v1/weights/shipping"))
        .await
        .expect("router response");

    let payload = json_body(response).await;
    assert_eq!(payload["sector"], Value::Null);
    let categories = payload["categories"].as_object().expect("categories");
    assert_eq!(categories.len(), 5);
    assert!(!categories.contains_key("Opportunity"));
    assert_eq!(payload["detail"], json!({}));
}

#[tokio::test]
async fn industry_mapping_route_returns_sector_code() {
    let response = router(ScriptedGenerator::new())
        .oneshot(get("/api/v1/sectors/map/Packaged%20food%20producer"))
        .await
        .expect("router response");

    let payload = json_body(response).await;
    assert_eq!(payload["industry"], "Packaged food producer");
    assert_eq!(payload["sector"], "food_beverage");
}
