//! Pure DocuSign eSignature REST API client.
//!
//! Covers the envelope operations needed to send templated contracts and
//! manage their signers. Every call goes through [`auth::authenticated_call`],
//! so an expired token is refreshed once transparently.
//!
//! # Example
//!
//! ```rust,ignore
//! use docusign_client::{DocusignClient, DocusignOptions, JwtGrantConfig};
//!
//! let client = DocusignClient::new(options)?;
//! let envelope = client.get_envelope("envelope-id").await?;
//! println!("{}", envelope.status);
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{
    authenticated_call, AssertionClaims, CachedToken, JwtGrantConfig, JwtTokenManager,
    TokenSource,
};
pub use error::{DocusignError, Result};
pub use types::*;

use std::sync::Arc;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Connection settings for one DocuSign account.
#[derive(Debug, Clone)]
pub struct DocusignOptions {
    /// REST base, e.g. `https://demo.docusign.net/restapi`.
    pub base_path: String,
    pub account_id: String,
    pub jwt: JwtGrantConfig,
}

#[derive(Clone)]
pub struct DocusignClient {
    http_client: Client,
    base_path: String,
    account_id: String,
    tokens: Arc<dyn TokenSource>,
}

impl DocusignClient {
    pub fn new(options: DocusignOptions) -> Result<Self> {
        let http_client = Client::new();
        let tokens = JwtTokenManager::new(http_client.clone(), options.jwt)?;
        Ok(Self::with_token_source(
            http_client,
            options.base_path,
            options.account_id,
            Arc::new(tokens),
        ))
    }

    /// Build a client around an existing token source.
    pub fn with_token_source(
        http_client: Client,
        base_path: impl Into<String>,
        account_id: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http_client,
            base_path: base_path.into(),
            account_id: account_id.into(),
            tokens,
        }
    }

    fn envelopes_url(&self) -> String {
        format!(
            "{}/v2.1/accounts/{}/envelopes",
            self.base_path.trim_end_matches('/'),
            self.account_id
        )
    }

    /// Create (and by default send) an envelope from a template.
    pub async fn create_envelope(&self, definition: &EnvelopeDefinition) -> Result<EnvelopeSummary> {
        let url = self.envelopes_url();
        let summary: EnvelopeSummary = authenticated_call(self.tokens.as_ref(), |token| {
            let request = self.http_client.post(&url).bearer_auth(token).json(definition);
            async move { parse_json(request.send().await?).await }
        })
        .await?;

        debug!(envelope_id = %summary.envelope_id, "DocuSign envelope created");
        Ok(summary)
    }

    /// Fetch an envelope including its recipients.
    pub async fn get_envelope(&self, envelope_id: &str) -> Result<Envelope> {
        let url = format!("{}/{}?include=recipients", self.envelopes_url(), envelope_id);
        authenticated_call(self.tokens.as_ref(), |token| {
            let request = self.http_client.get(&url).bearer_auth(token);
            async move { parse_json(request.send().await?).await }
        })
        .await
    }

    /// Update envelope status, optionally re-sending it to pending recipients.
    pub async fn update_envelope(
        &self,
        envelope_id: &str,
        update: &EnvelopeUpdate,
        resend_envelope: bool,
    ) -> Result<()> {
        let url = format!(
            "{}/{}?resend_envelope={}",
            self.envelopes_url(),
            envelope_id,
            resend_envelope
        );
        authenticated_call(self.tokens.as_ref(), |token| {
            let request = self.http_client.put(&url).bearer_auth(token).json(update);
            async move { ensure_success(request.send().await?).await }
        })
        .await
    }

    /// Void an envelope that has not been completed.
    pub async fn void_envelope(&self, envelope_id: &str, reason: &str) -> Result<()> {
        let update = EnvelopeUpdate {
            status: "voided".to_string(),
            voided_reason: Some(reason.to_string()),
        };
        self.update_envelope(envelope_id, &update, false).await
    }

    /// Update recipients in place. With `resend_envelope` the signing email
    /// goes out again, which is how reminders are issued.
    pub async fn update_recipients(
        &self,
        envelope_id: &str,
        recipients: &Recipients,
        resend_envelope: bool,
    ) -> Result<()> {
        let url = format!(
            "{}/{}/recipients?resend_envelope={}",
            self.envelopes_url(),
            envelope_id,
            resend_envelope
        );
        authenticated_call(self.tokens.as_ref(), |token| {
            let request = self.http_client.put(&url).bearer_auth(token).json(recipients);
            async move { ensure_success(request.send().await?).await }
        })
        .await
    }

    /// Download all envelope documents merged into one PDF.
    pub async fn get_combined_document(&self, envelope_id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}/documents/combined", self.envelopes_url(), envelope_id);
        authenticated_call(self.tokens.as_ref(), |token| {
            let request = self.http_client.get(&url).bearer_auth(token);
            async move {
                let response = check_status(request.send().await?).await?;
                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, error = %body, "DocuSign API error");
    Err(DocusignError::from_status(status, body))
}

async fn ensure_success(response: Response) -> Result<()> {
    check_status(response).await.map(|_| ())
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| DocusignError::Parse(e.to_string()))
}
