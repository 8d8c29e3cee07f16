use super::common::*;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use std::sync::Arc;

use axum::extract::State;

use crate::evaluations::domain::TrackStatus;
use crate::evaluations::router::dashboard_handler;
use crate::evaluations::EvaluationService;

fn json_request(method: Method, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

fn seeded() -> Vec<crate::evaluations::Evaluation> {
    vec![
        evaluation("done", "A-1", "Northwind", TrackStatus::Pass, TrackStatus::Fail, 20),
        evaluation("open", "A-1", "Globex", TrackStatus::InProgress, TrackStatus::Pending, 10),
    ]
}

#[tokio::test]
async fn reopen_route_returns_snapshot() {
    let router = router_with(seeded());

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations/done/reopen",
            json!({ "reason": "client reopened the req", "reopenedBy": "lead" }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["evaluation"]["internalStatus"], "pending");
    assert_eq!(body["evaluation"]["clientStatus"], "pending");
    assert_eq!(body["historical"]["internalStatus"], "pass");
    assert_eq!(body["historical"]["clientStatus"], "fail");
    assert_eq!(body["historical"]["originalEvaluationId"], "done");
}

#[tokio::test]
async fn reopen_route_maps_business_errors() {
    let active = router_with(seeded())
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations/open/reopen",
            json!({ "reason": "oops", "reopenedBy": "lead" }),
        ))
        .await
        .expect("route responds");
    assert_eq!(active.status(), StatusCode::CONFLICT);

    let missing = router_with(seeded())
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations/ghost/reopen",
            json!({ "reason": "oops", "reopenedBy": "lead" }),
        ))
        .await
        .expect("route responds");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(missing).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("ghost"));

    let no_reason = router_with(seeded())
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations/done/reopen",
            json!({ "reopenedBy": "lead" }),
        ))
        .await
        .expect("route responds");
    assert_eq!(no_reason.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_route_applies_query_filters() {
    let response = router_with(seeded())
        .oneshot(get_request("/api/v1/evaluations?view=completed&q=north"))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let items = body.as_array().expect("array payload");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "done");
    assert_eq!(items[0]["lifecycle"], "completed");
    assert_eq!(items[0]["ageDays"], 20);

    let active = router_with(seeded())
        .oneshot(get_request("/api/v1/evaluations"))
        .await
        .expect("route responds");
    let body = read_json_body(active).await;
    let items = body.as_array().expect("array payload");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["agingBucket"], "between7And14Days");
}

#[tokio::test]
async fn client_route_rejects_locked_track() {
    let response = router_with(seeded())
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/evaluations/open/client",
            json!({ "status": "pass" }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_route_creates_evaluations() {
    let response = router_with(Vec::new())
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations",
            json!({
                "associateId": "A-9",
                "associateName": "Noor Haddad",
                "clientName": "Contoso",
                "resumeReference": "resumes/a-9.pdf"
            }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["internalStatus"], "pending");
    assert_eq!(body["resumeReference"], "resumes/a-9.pdf");
}

#[tokio::test]
async fn history_and_dashboard_routes_respond() {
    let history = router_with(seeded())
        .oneshot(get_request("/api/v1/associates/A-1/history"))
        .await
        .expect("route responds");
    assert_eq!(history.status(), StatusCode::OK);
    let body = read_json_body(history).await;
    assert_eq!(body["associateId"], "A-1");
    assert_eq!(body["timeline"].as_array().expect("timeline").len(), 2);

    let empty = router_with(seeded())
        .oneshot(get_request("/api/v1/associates/nobody/history"))
        .await
        .expect("route responds");
    assert_eq!(empty.status(), StatusCode::OK);
    let body = read_json_body(empty).await;
    assert!(body["timeline"].as_array().expect("timeline").is_empty());

    let dashboard = router_with(seeded())
        .oneshot(get_request("/api/v1/dashboard"))
        .await
        .expect("route responds");
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body = read_json_body(dashboard).await;
    assert_eq!(body["totalEvaluations"], 2);
    assert_eq!(body["activeEvaluations"], 1);
    assert_eq!(body["completedEvaluations"], 1);
    assert_eq!(body["agingAnalytics"]["between7And14Days"], 1);
    assert_eq!(body["passFailAnalytics"]["overall"]["internalPassClientFail"], 1);
}

#[tokio::test]
async fn store_outage_maps_to_server_error() {
    let service = Arc::new(EvaluationService::new(Arc::new(UnavailableStore), clock()));

    let response = dashboard_handler(State(service)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("database offline"));
}

#[tokio::test]
async fn unknown_status_labels_are_rejected() {
    let router = router_with(vec![evaluation(
        "held",
        "A-2",
        "Initech",
        TrackStatus::Pass,
        TrackStatus::Pending,
        5,
    )]);

    let typo = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/evaluations/held/internal",
            json!({ "status": "passs" }),
        ))
        .await
        .expect("route responds");
    assert_eq!(typo.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let current = router
        .clone()
        .oneshot(get_request("/api/v1/evaluations/held"))
        .await
        .expect("route responds");
    let body = read_json_body(current).await;
    assert_eq!(body["internalStatus"], "pass");

    let filter = router
        .oneshot(get_request("/api/v1/evaluations?status=bogus"))
        .await
        .expect("route responds");
    assert_eq!(filter.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(filter).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("bogus"));
}

#[tokio::test]
async fn completed_evaluations_reject_track_edits() {
    let response = router_with(seeded())
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/evaluations/done/internal",
            json!({ "status": "in-progress" }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("reopen"));
}
