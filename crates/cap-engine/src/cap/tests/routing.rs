use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::cap::router::{cap_router, session_handler};
use crate::cap::service::CapComplianceService;

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("payload serializes")))
        .expect("request builds")
}

fn roster_payload() -> Value {
    serde_json::to_value(sample_roster()).expect("roster serializes")
}

#[tokio::test]
async fn charges_route_lists_true_charges() {
    let (service, _) = build_service();
    let router = cap_router(Arc::new(service));

    let response = router
        .oneshot(post_json(
            "/api/v1/cap/charges",
            &json!({ "roster": roster_payload() }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let charges = payload["charges"].as_array().expect("charges array");
    assert_eq!(charges.len(), 6);
    assert_eq!(charges[0]["player_id"], "dp-1");
    assert_eq!(charges[0]["true_charge"], 683_750);
    assert_eq!(charges[2]["discount_need"], 400_000);
}

#[tokio::test]
async fn open_session_route_returns_report() {
    let (service, _) = build_service();
    let router = cap_router(Arc::new(service));

    let response = router
        .oneshot(post_json(
            "/api/v1/cap/sessions",
            &json!({
                "roster": roster_payload(),
                "pools": { "pool_a_total": 500_000, "pool_b_total": 100_000 },
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload["session_id"].as_str().is_some());
    let report = &payload["report"];
    assert_eq!(report["compliant"], false);
    assert_eq!(report["unmet"], 150_000);
    assert_eq!(report["headline"], "$150000 short of cap compliance");
    assert_eq!(report["players"][0]["player_id"], "std-1");
}

#[tokio::test]
async fn override_route_applies_and_rejects() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    let session = service
        .open_session(sample_roster(), pools(2_800_000, 1_725_000))
        .expect("session opens");
    let router = cap_router(service.clone());
    let uri = format!("/api/v1/cap/sessions/{}/overrides", session.id.0);

    let applied = router
        .clone()
        .oneshot(post_json(
            &uri,
            &json!({ "player_id": "std-2", "pool": "pool_b", "amount": 900_000 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(applied.status(), StatusCode::OK);
    let payload = read_json_body(applied).await;
    assert_eq!(payload["status"]["status"], "applied");
    assert_eq!(payload["status"]["granted"], 250_000);
    assert_eq!(payload["status"]["clamped_by"], "discount_need");
    assert_eq!(payload["status"]["refunded"], 250_000);

    let rejected = router
        .oneshot(post_json(
            &uri,
            &json!({ "player_id": "ghost", "pool": "pool_a", "amount": 1 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(rejected).await;
    assert_eq!(payload["status"]["status"], "rejected");
    assert_eq!(payload["status"]["reason"], "unknown_player");
}

#[tokio::test]
async fn reset_and_signing_routes_use_session() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    let session = service
        .open_session(sample_roster(), pools(500_000, 300_000))
        .expect("session opens");
    let router = cap_router(service);

    let reset = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/cap/sessions/{}/reset", session.id.0),
            &json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(reset.status(), StatusCode::OK);

    let signing = router
        .oneshot(post_json(
            &format!("/api/v1/cap/sessions/{}/signings", session.id.0),
            &json!({
                "candidate": {
                    "salary": 1_000_000,
                    "designation": "standard",
                    "age": 26,
                },
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(signing.status(), StatusCode::OK);
    let payload = read_json_body(signing).await;
    assert_eq!(payload["feasible"], false);
    assert_eq!(
        payload["blocking_reasons"][0]["kind"],
        "insufficient_pool_balance"
    );
}

#[tokio::test]
async fn session_handler_returns_not_found() {
    let (service, _) = build_service();

    let response = session_handler::<MemorySessions>(
        State(Arc::new(service)),
        Path("cap-unknown".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "session not found");
}

#[tokio::test]
async fn session_route_reports_store_failures() {
    let service = CapComplianceService::new(Arc::new(UnavailableSessions), rules())
        .expect("rules are coherent");
    let router = cap_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/api/v1/cap/sessions/cap-000001")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn open_session_falls_back_to_configured_pools() {
    let (service, _) = build_service();
    let router = cap_router(Arc::new(service.with_default_pools(pools(0, 0))));

    let response = router
        .oneshot(post_json(
            "/api/v1/cap/sessions",
            &json!({ "roster": roster_payload() }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["report"]["unmet"], 650_000);
    assert_eq!(payload["report"]["pools"][0]["total"], 0);
}

#[tokio::test]
async fn oversized_salaries_still_produce_a_report() {
    let (service, _) = build_service();
    let router = cap_router(Arc::new(service));
    let roster = json!([
        { "id": "huge-a", "name": "Huge A", "salary": u64::MAX, "designation": "standard", "age": 27 },
        { "id": "huge-b", "name": "Huge B", "salary": u64::MAX, "designation": "standard", "age": 27 },
    ]);

    let response = router
        .oneshot(post_json("/api/v1/cap/sessions", &json!({ "roster": roster })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["report"]["compliant"], false);
    assert_eq!(payload["report"]["budget"]["true_total"], u64::MAX);
}
