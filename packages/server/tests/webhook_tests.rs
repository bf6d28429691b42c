//! DocuSign Connect webhook route.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crate::common::init_tracing;
use server_core::domains::fee_agreements::models::SignatureProvider;
use server_core::domains::fee_agreements::webhook::{compute_hmac, router, WebhookState};
use server_core::kernel::test_dependencies::MockSignatureEventSink;

const CURRENT_SECRET: &str = "current-connect-key";
const PREVIOUS_SECRET: &str = "previous-connect-key";

const COMPLETED_BODY: &str = r#"{
    "event": "envelope-completed",
    "apiVersion": "v2.1",
    "generatedDateTime": "2026-03-02T17:04:11.000Z",
    "data": {"accountId": "acct-1", "envelopeId": "env-123"}
}"#;

fn app(sink: Arc<MockSignatureEventSink>) -> axum::Router {
    init_tracing();
    router(WebhookState {
        secrets: Arc::new(vec![CURRENT_SECRET.to_string(), PREVIOUS_SECRET.to_string()]),
        sink,
    })
}

fn connect_request(body: &str, signatures: &[String]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/docusign/connect")
        .header("content-type", "application/json");
    for (i, signature) in signatures.iter().enumerate() {
        builder = builder.header(format!("X-DocuSign-Signature-{}", i + 1), signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn verified_callback_is_forwarded() {
    let sink = Arc::new(MockSignatureEventSink::new());
    let signature = compute_hmac(CURRENT_SECRET, COMPLETED_BODY.as_bytes()).unwrap();

    let response = app(sink.clone())
        .oneshot(connect_request(COMPLETED_BODY, &[signature]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].provider, SignatureProvider::DocuSign);
    assert_eq!(events[0].event, "envelope-completed");
    assert_eq!(events[0].contract_id, "env-123");
    assert!(events[0].generated_at.is_some());
}

#[tokio::test]
async fn rotated_secret_matches_any_header() {
    let sink = Arc::new(MockSignatureEventSink::new());
    let stale = compute_hmac("retired-key", COMPLETED_BODY.as_bytes()).unwrap();
    let previous = compute_hmac(PREVIOUS_SECRET, COMPLETED_BODY.as_bytes()).unwrap();

    let response = app(sink.clone())
        .oneshot(connect_request(COMPLETED_BODY, &[stale, previous]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn bad_signature_is_rejected() {
    let sink = Arc::new(MockSignatureEventSink::new());
    let forged = compute_hmac("attacker-key", COMPLETED_BODY.as_bytes()).unwrap();

    let response = app(sink.clone())
        .oneshot(connect_request(COMPLETED_BODY, &[forged]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let sink = Arc::new(MockSignatureEventSink::new());

    let response = app(sink.clone())
        .oneshot(connect_request(COMPLETED_BODY, &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let sink = Arc::new(MockSignatureEventSink::new());
    let signature = compute_hmac(CURRENT_SECRET, COMPLETED_BODY.as_bytes()).unwrap();
    let tampered = COMPLETED_BODY.replace("env-123", "env-999");

    let response = app(sink.clone())
        .oneshot(connect_request(&tampered, &[signature]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn signed_but_malformed_body_is_a_bad_request() {
    let sink = Arc::new(MockSignatureEventSink::new());
    let body = r#"{"event":"envelope-sent"}"#;
    let signature = compute_hmac(CURRENT_SECRET, body.as_bytes()).unwrap();

    let response = app(sink.clone())
        .oneshot(connect_request(body, &[signature]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn relay_failure_still_acknowledges_callback() {
    let sink = Arc::new(MockSignatureEventSink::new().failing());
    let signature = compute_hmac(CURRENT_SECRET, COMPLETED_BODY.as_bytes()).unwrap();

    let response = app(sink.clone())
        .oneshot(connect_request(COMPLETED_BODY, &[signature]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sink.events().len(), 1);
}
