//! Forwards verified signature events to the CRM over HTTP.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::BaseSignatureEventSink;
use crate::domains::fee_agreements::webhook::SignatureWebhookEvent;

pub struct HttpSignatureEventSink {
    client: reqwest::Client,
    url: String,
}

impl HttpSignatureEventSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl BaseSignatureEventSink for HttpSignatureEventSink {
    async fn publish(&self, event: &SignatureWebhookEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .context("Failed to reach signature event endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Signature event endpoint returned {}: {}", status, body);
        }

        debug!(contract_id = %event.contract_id, event = %event.event, "Signature event forwarded");
        Ok(())
    }
}
