//! Provider adapters against local fake provider APIs.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::prelude::*;

use crate::common::init_tracing;
use docusign_client::{DocusignClient, TokenSource};
use hellosign_client::HelloSignClient;
use server_core::domains::fee_agreements::models::{FeeAgreement, SignatureProvider, SignerRole};
use server_core::domains::fee_agreements::providers::{
    BaseSigningProvider, DocusignProvider, DocusignSettings, ExternalDocumentProvider,
    HelloSignProvider, HelloSignSettings,
};
use server_core::domains::fee_agreements::templates::TemplateTable;
use server_core::domains::fee_agreements::SigningError;
use server_core::kernel::test_dependencies::sample_fee_agreement;

// ============================================================================
// Test Helpers
// ============================================================================

async fn serve(app: Router) -> String {
    init_tracing();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn templates() -> TemplateTable {
    TemplateTable {
        standard: "tpl-standard".into(),
        flat_with_guarantee: "tpl-flat-guarantee".into(),
        flat_without_guarantee: "tpl-flat".into(),
        conversion: "tpl-conversion".into(),
        base_salary: "tpl-base-salary".into(),
    }
}

fn agreement_on(provider: SignatureProvider, contract_id: &str) -> FeeAgreement {
    let mut agreement = sample_fee_agreement();
    agreement.signature_provider = Some(provider);
    agreement.contract_id = Some(contract_id.to_string());
    agreement
}

/// Hands out `t0` until refreshed, then `t1`, `t2`, ...
struct ScriptedTokens {
    refreshes: AtomicUsize,
}

#[async_trait]
impl TokenSource for ScriptedTokens {
    async fn access_token(&self) -> docusign_client::Result<String> {
        Ok(format!("t{}", self.refreshes.load(Ordering::SeqCst)))
    }

    async fn refresh(&self) -> docusign_client::Result<String> {
        Ok(format!("t{}", self.refreshes.fetch_add(1, Ordering::SeqCst) + 1))
    }
}

// ============================================================================
// DocuSign
// ============================================================================

#[derive(Clone, Default)]
struct FakeDocusign {
    /// Bearer tokens seen on envelope reads, in order.
    tokens_seen: Arc<Mutex<Vec<String>>>,
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

async fn docusign_get_envelope(
    State(fake): State<FakeDocusign>,
    Path((_account, envelope_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let token = bearer(&headers);
    fake.tokens_seen.lock().unwrap().push(token.clone());

    if envelope_id == "env-missing" {
        return (StatusCode::NOT_FOUND, "ENVELOPE_DOES_NOT_EXIST").into_response();
    }
    if token == "t0" {
        return (StatusCode::UNAUTHORIZED, "USER_AUTHENTICATION_FAILED").into_response();
    }

    Json(serde_json::json!({
        "envelopeId": envelope_id,
        "status": "sent",
        "recipients": {
            "signers": [
                {"recipientId": "1", "roleName": "hiring_authority", "name": "Dana Whitfield", "email": "dana.signing@acme.test"},
                {"recipientId": "2", "roleName": "production_director", "name": "Jordan Lee", "email": "jordan@recruit.test"}
            ]
        }
    }))
    .into_response()
}

async fn docusign_update_envelope(
    Path((_account, envelope_id)): Path<(String, String)>,
) -> StatusCode {
    if envelope_id == "env-missing" {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

async fn docusign_provider() -> (DocusignProvider, FakeDocusign, Arc<ScriptedTokens>) {
    let fake = FakeDocusign::default();
    let app = Router::new()
        .route(
            "/v2.1/accounts/:account/envelopes/:envelope_id",
            get(docusign_get_envelope).put(docusign_update_envelope),
        )
        .with_state(fake.clone());
    let base = serve(app).await;

    let tokens = Arc::new(ScriptedTokens {
        refreshes: AtomicUsize::new(0),
    });
    let client =
        DocusignClient::with_token_source(reqwest::Client::new(), base, "acct-1", tokens.clone());
    let provider = DocusignProvider::new(
        client,
        DocusignSettings {
            templates: templates(),
            webhook_url: None,
        },
    );

    (provider, fake, tokens)
}

#[tokio::test]
async fn docusign_missing_envelope_does_not_exist() {
    let (provider, _, _) = docusign_provider().await;

    let exists = provider
        .check_if_contract_exists(&agreement_on(SignatureProvider::DocuSign, "env-missing"))
        .await
        .unwrap();

    assert!(!exists);
}

#[tokio::test]
async fn docusign_void_of_missing_envelope_is_not_found() {
    let (provider, _, _) = docusign_provider().await;

    let err = provider
        .void_contract(
            &agreement_on(SignatureProvider::DocuSign, "env-missing"),
            "duplicate",
        )
        .await
        .unwrap_err();

    match err {
        SigningError::NotFound {
            provider,
            contract_id,
        } => {
            assert_eq!(provider, SignatureProvider::DocuSign);
            assert_eq!(contract_id, "env-missing");
        }
        other => panic!("expected NotFound, got {other}"),
    }
}

#[tokio::test]
async fn docusign_expired_token_is_refreshed_and_retried_once() {
    let (provider, fake, tokens) = docusign_provider().await;

    let email = provider
        .get_signature_email_by_signer_role(
            &agreement_on(SignatureProvider::DocuSign, "env-123"),
            SignerRole::HiringAuthority,
        )
        .await
        .unwrap();

    assert_eq!(email.as_deref(), Some("dana.signing@acme.test"));
    assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(*fake.tokens_seen.lock().unwrap(), vec!["t0", "t1"]);
}

#[tokio::test]
async fn docusign_rejects_agreement_recorded_on_another_provider() {
    let (provider, fake, _) = docusign_provider().await;

    let err = provider
        .check_if_contract_exists(&agreement_on(SignatureProvider::HelloSign, "sr-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, SigningError::ProviderMismatch { .. }));
    assert!(fake.tokens_seen.lock().unwrap().is_empty());
}

// ============================================================================
// HelloSign
// ============================================================================

async fn hellosign_get_request(Path(request_id): Path<String>) -> Response {
    if request_id == "sr-missing" {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    Json(serde_json::json!({
        "signature_request": {
            "signature_request_id": request_id,
            "is_complete": false,
            "signatures": []
        }
    }))
    .into_response()
}

async fn hellosign_cancel(Path(request_id): Path<String>) -> StatusCode {
    if request_id == "sr-missing" {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

async fn hellosign_provider() -> HelloSignProvider {
    let app = Router::new()
        .route("/signature_request/:id", get(hellosign_get_request))
        .route("/signature_request/cancel/:id", post(hellosign_cancel));
    let base = serve(app).await;

    HelloSignProvider::new(
        HelloSignClient::new("test-key".into()).with_base_url(base),
        HelloSignSettings {
            templates: templates(),
            test_mode: true,
            client_id: None,
        },
    )
}

#[tokio::test]
async fn hellosign_missing_request_does_not_exist() {
    let provider = hellosign_provider().await;

    let missing = provider
        .check_if_contract_exists(&agreement_on(SignatureProvider::HelloSign, "sr-missing"))
        .await
        .unwrap();
    let present = provider
        .check_if_contract_exists(&agreement_on(SignatureProvider::HelloSign, "sr-1"))
        .await
        .unwrap();

    assert!(!missing);
    assert!(present);
}

#[tokio::test]
async fn hellosign_cancel_of_missing_request_is_not_found() {
    let provider = hellosign_provider().await;

    let err = provider
        .void_contract(
            &agreement_on(SignatureProvider::HelloSign, "sr-missing"),
            "duplicate",
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SigningError::NotFound {
            provider: SignatureProvider::HelloSign,
            ..
        }
    ));
}

// ============================================================================
// External
// ============================================================================

const PDF_BYTES: &[u8] = b"%PDF-1.4 signed elsewhere";

fn external_agreement(pdf_url: Option<String>) -> FeeAgreement {
    let mut agreement = sample_fee_agreement();
    agreement.signature_provider = Some(SignatureProvider::External);
    agreement.contract_id = None;
    agreement.pdf_url = pdf_url;
    agreement
}

#[tokio::test]
async fn external_document_is_downloaded_from_pdf_url() {
    let base = serve(Router::new().route("/files/agreement.pdf", get(|| async { PDF_BYTES }))).await;
    let provider = ExternalDocumentProvider::new(reqwest::Client::new());
    let agreement = external_agreement(Some(format!("{}/files/agreement.pdf", base)));

    let content = provider.get_files_in_base64(&agreement).await.unwrap();

    assert_eq!(content, BASE64_STANDARD.encode(PDF_BYTES));
    assert!(provider.check_if_contract_exists(&agreement).await.unwrap());
}

#[tokio::test]
async fn external_agreement_without_pdf_does_not_exist() {
    let provider = ExternalDocumentProvider::new(reqwest::Client::new());
    let agreement = external_agreement(None);

    assert!(!provider.check_if_contract_exists(&agreement).await.unwrap());
    assert!(matches!(
        provider.get_files_in_base64(&agreement).await,
        Err(SigningError::MissingContract(_))
    ));
}

#[tokio::test]
async fn external_provider_operations_are_unsupported() {
    let provider = ExternalDocumentProvider::new(reqwest::Client::new());
    let agreement = external_agreement(Some("https://files.example.com/a.pdf".into()));

    let reminder = provider.send_reminder(&agreement).await.unwrap_err();
    let void = provider.void_contract(&agreement, "n/a").await.unwrap_err();

    assert!(reminder.is_configuration());
    assert!(matches!(
        void,
        SigningError::Unsupported {
            operation: "void_contract",
            ..
        }
    ));
}
