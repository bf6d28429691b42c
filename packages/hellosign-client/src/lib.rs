//! Pure HelloSign (Dropbox Sign) REST API client.
//!
//! Authenticates with the account API key over HTTP basic auth and wraps the
//! signature-request endpoints used for templated contracts.
//!
//! # Example
//!
//! ```rust,ignore
//! use hellosign_client::HelloSignClient;
//!
//! let client = HelloSignClient::new("api-key".into());
//! let request = client.get_signature_request("request-id").await?;
//! println!("complete: {}", request.is_complete);
//! ```

pub mod error;
pub mod types;

pub use error::{HelloSignError, Result};
pub use types::*;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const BASE_URL: &str = "https://api.hellosign.com/v3";

#[derive(Clone)]
pub struct HelloSignClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HelloSignClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (sandbox proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .basic_auth(&self.api_key, Some(""))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .basic_auth(&self.api_key, Some(""))
    }

    /// Inspect a template's roles and custom fields.
    pub async fn get_template(&self, template_id: &str) -> Result<Template> {
        let resp = self.get(&format!("/template/{}", template_id)).send().await?;
        let body: TemplateResponse = parse_json(resp).await?;
        Ok(body.template)
    }

    pub async fn send_with_template(
        &self,
        request: &SendWithTemplateRequest,
    ) -> Result<SignatureRequest> {
        let resp = self
            .post("/signature_request/send_with_template")
            .json(request)
            .send()
            .await?;
        let body: SignatureRequestResponse = parse_json(resp).await?;

        debug!(
            signature_request_id = %body.signature_request.signature_request_id,
            "HelloSign signature request sent"
        );
        Ok(body.signature_request)
    }

    pub async fn get_signature_request(&self, signature_request_id: &str) -> Result<SignatureRequest> {
        let resp = self
            .get(&format!("/signature_request/{}", signature_request_id))
            .send()
            .await?;
        let body: SignatureRequestResponse = parse_json(resp).await?;
        Ok(body.signature_request)
    }

    /// Cancel an incomplete signature request.
    pub async fn cancel_signature_request(&self, signature_request_id: &str) -> Result<()> {
        let resp = self
            .post(&format!("/signature_request/cancel/{}", signature_request_id))
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }

    /// Email a reminder to one signer.
    pub async fn remind(&self, signature_request_id: &str, email_address: &str) -> Result<()> {
        let resp = self
            .post(&format!("/signature_request/remind/{}", signature_request_id))
            .json(&RemindRequest {
                email_address: email_address.to_string(),
            })
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }

    /// Move a signature slot to a new email address.
    pub async fn update_signer_email(
        &self,
        signature_request_id: &str,
        signature_id: &str,
        email_address: &str,
    ) -> Result<()> {
        let resp = self
            .post(&format!("/signature_request/update/{}", signature_request_id))
            .json(&UpdateSignerRequest {
                signature_id: signature_id.to_string(),
                email_address: email_address.to_string(),
            })
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }

    /// Combined signed PDF as a base64 data URI.
    pub async fn files_as_data_uri(&self, signature_request_id: &str) -> Result<FilesDataUri> {
        let resp = self
            .get(&format!(
                "/signature_request/files_as_data_uri/{}?file_type=pdf",
                signature_request_id
            ))
            .send()
            .await?;
        parse_json(resp).await
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    warn!(status = %status, error = %body, "HelloSign API error");
    Err(HelloSignError::from_status(status, body))
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    check_status(resp)
        .await?
        .json()
        .await
        .map_err(|e| HelloSignError::Parse(e.to_string()))
}
