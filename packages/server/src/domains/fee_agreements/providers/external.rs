//! Agreements signed outside the integrated providers.
//!
//! Only a stored PDF exists, so the document is downloaded directly and
//! every provider-side operation is unsupported.

use async_trait::async_trait;
use base64::prelude::*;
use tracing::debug;

use super::{BaseSigningProvider, ContractSentDetails, SigningError, SigningResult};
use crate::domains::fee_agreements::models::{FeeAgreement, SignatureProvider, SignerRole};

const PROVIDER: SignatureProvider = SignatureProvider::External;

pub struct ExternalDocumentProvider {
    http_client: reqwest::Client,
}

impl ExternalDocumentProvider {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    fn unsupported<T>(operation: &'static str) -> SigningResult<T> {
        Err(SigningError::Unsupported {
            provider: PROVIDER,
            operation,
        })
    }
}

#[async_trait]
impl BaseSigningProvider for ExternalDocumentProvider {
    fn provider(&self) -> SignatureProvider {
        PROVIDER
    }

    async fn send_contract(&self, _agreement: &FeeAgreement) -> SigningResult<ContractSentDetails> {
        Self::unsupported("send_contract")
    }

    async fn void_contract(&self, _agreement: &FeeAgreement, _reason: &str) -> SigningResult<()> {
        Self::unsupported("void_contract")
    }

    async fn send_reminder(&self, _agreement: &FeeAgreement) -> SigningResult<()> {
        Self::unsupported("send_reminder")
    }

    async fn get_signature_email_by_signer_role(
        &self,
        _agreement: &FeeAgreement,
        _role: SignerRole,
    ) -> SigningResult<Option<String>> {
        Self::unsupported("get_signature_email_by_signer_role")
    }

    async fn update_hiring_authority_signer_email(
        &self,
        _agreement: &FeeAgreement,
        _email: &str,
    ) -> SigningResult<()> {
        Self::unsupported("update_hiring_authority_signer_email")
    }

    async fn get_files_in_base64(&self, agreement: &FeeAgreement) -> SigningResult<String> {
        let url = agreement
            .pdf_url
            .as_deref()
            .ok_or(SigningError::MissingContract(agreement.id))?;

        debug!(fee_agreement_id = %agreement.id, "Downloading externally signed document");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SigningError::provider(PROVIDER, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SigningError::provider(PROVIDER, e))?;

        Ok(BASE64_STANDARD.encode(bytes))
    }

    async fn check_if_contract_exists(&self, agreement: &FeeAgreement) -> SigningResult<bool> {
        Ok(agreement.pdf_url.is_some())
    }
}
