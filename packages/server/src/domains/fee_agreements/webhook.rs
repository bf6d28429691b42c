//! DocuSign Connect webhook: HMAC verification and relay.
//!
//! Connect signs the raw body with every active HMAC key and sends one
//! `X-DocuSign-Signature-N` header per key. During key rotation old and new
//! secrets are both valid, so every configured secret is tried against every
//! candidate signature.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use base64::prelude::*;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};

use super::models::SignatureProvider;
use crate::kernel::BaseSignatureEventSink;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER_PREFIX: &str = "x-docusign-signature-";

/// The candidate signature that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMatch {
    /// Position in the candidate list.
    pub index: usize,
    pub signature: String,
}

fn keyed_mac(secret: &str, body: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}

/// Base64 HMAC-SHA256 of `body` under `secret`.
pub fn compute_hmac(secret: &str, body: &[u8]) -> Option<String> {
    let mac = keyed_mac(secret, body)?;
    Some(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// First candidate that is a valid signature of `body` under `secret`.
///
/// Comparison is constant time. Candidates that are not valid base64 are
/// skipped.
pub fn verify_signature<S: AsRef<str>>(
    body: &[u8],
    secret: &str,
    candidates: &[S],
) -> Option<SignatureMatch> {
    let mac = keyed_mac(secret, body)?;

    candidates.iter().enumerate().find_map(|(index, candidate)| {
        let candidate = candidate.as_ref();
        let decoded = BASE64_STANDARD.decode(candidate.trim()).ok()?;
        mac.clone()
            .verify_slice(&decoded)
            .ok()
            .map(|_| SignatureMatch {
                index,
                signature: candidate.to_string(),
            })
    })
}

/// Try each secret in order; the first secret with a matching candidate wins.
pub fn verify_with_any_secret<S: AsRef<str>>(
    body: &[u8],
    secrets: &[String],
    candidates: &[S],
) -> Option<SignatureMatch> {
    secrets
        .iter()
        .find_map(|secret| verify_signature(body, secret, candidates))
}

/// `X-DocuSign-Signature-N` header values ordered by N.
pub fn signature_candidates(headers: &HeaderMap) -> Vec<String> {
    let mut numbered: Vec<(u32, String)> = headers
        .iter()
        .filter_map(|(name, value)| {
            let n = name
                .as_str()
                .strip_prefix(SIGNATURE_HEADER_PREFIX)?
                .parse()
                .ok()?;
            Some((n, value.to_str().ok()?.to_string()))
        })
        .collect();
    numbered.sort_by_key(|(n, _)| *n);
    numbered.into_iter().map(|(_, value)| value).collect()
}

/// Connect JSON payload (SIM format), reduced to what is relayed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectPayload {
    event: String,
    generated_date_time: Option<DateTime<Utc>>,
    data: ConnectData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectData {
    envelope_id: String,
}

/// A verified provider status callback, handed to upstream business rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureWebhookEvent {
    pub provider: SignatureProvider,
    /// Provider event name, e.g. `envelope-completed`.
    pub event: String,
    pub contract_id: String,
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct WebhookState {
    pub secrets: Arc<Vec<String>>,
    pub sink: Arc<dyn BaseSignatureEventSink>,
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhooks/docusign/connect", post(handle_docusign_connect))
        .with_state(state)
}

/// Verify and relay one Connect callback.
///
/// Relay failures still answer 200 so DocuSign does not keep retrying a
/// callback that was already authenticated.
async fn handle_docusign_connect(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let candidates = signature_candidates(&headers);
    let Some(matched) = verify_with_any_secret(&body, &state.secrets, &candidates) else {
        warn!(
            candidates = candidates.len(),
            "Rejected DocuSign callback with no valid HMAC signature"
        );
        return StatusCode::UNAUTHORIZED;
    };

    let payload: ConnectPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Malformed DocuSign callback body");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event = SignatureWebhookEvent {
        provider: SignatureProvider::DocuSign,
        event: payload.event,
        contract_id: payload.data.envelope_id,
        generated_at: payload.generated_date_time,
    };

    info!(
        envelope_id = %event.contract_id,
        event = %event.event,
        signature_index = matched.index,
        "Verified DocuSign callback"
    );

    if let Err(e) = state.sink.publish(&event).await {
        tracing::error!(
            envelope_id = %event.contract_id,
            event = %event.event,
            error = %e,
            "Failed to relay signature event"
        );
    }

    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "connect-secret";

    #[test]
    fn matches_correct_candidate_only() {
        let body = br#"{"event":"envelope-completed"}"#;
        let correct = compute_hmac(SECRET, body).unwrap();
        let wrong = compute_hmac("other-secret", body).unwrap();

        let matched = verify_signature(body, SECRET, &[wrong.clone(), correct.clone()]).unwrap();

        assert_eq!(matched.index, 1);
        assert_eq!(matched.signature, correct);
        assert!(verify_signature(body, SECRET, &[wrong]).is_none());
    }

    #[test]
    fn computes_base64_hmac_for_any_key_length() {
        assert_eq!(
            compute_hmac("key", b"The quick brown fox jumps over the lazy dog").as_deref(),
            Some("97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg=")
        );
        assert!(compute_hmac("", b"payload").is_some());
        assert!(compute_hmac(&"k".repeat(200), b"payload").is_some());
    }

    #[test]
    fn tampered_body_does_not_verify() {
        let signature = compute_hmac(SECRET, b"original").unwrap();
        assert!(verify_signature(b"tampered", SECRET, &[signature]).is_none());
    }

    #[test]
    fn garbage_candidates_are_skipped() {
        let body = b"payload";
        let correct = compute_hmac(SECRET, body).unwrap();

        let matched = verify_signature(body, SECRET, &["%%not-base64%%", correct.as_str()]).unwrap();

        assert_eq!(matched.index, 1);
    }

    #[test]
    fn rotated_secrets_are_all_tried() {
        let body = b"payload";
        let signature = compute_hmac("new-secret", body).unwrap();
        let secrets = vec!["old-secret".to_string(), "new-secret".to_string()];

        assert!(verify_with_any_secret(body, &secrets, &[signature]).is_some());
    }

    #[test]
    fn candidates_are_ordered_by_header_number() {
        let mut headers = HeaderMap::new();
        headers.insert("x-docusign-signature-2", "second".parse().unwrap());
        headers.insert("x-docusign-signature-1", "first".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        assert_eq!(signature_candidates(&headers), vec!["first", "second"]);
    }
}
