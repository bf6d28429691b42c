//! Façade over the signing providers.
//!
//! First sends cascade through providers in preference order. Everything
//! after that goes to the one provider recorded on the agreement, because
//! the contract only exists there.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::models::{FeeAgreement, SignatureProvider, SignerRole};
use super::providers::{
    BaseSigningProvider, ProviderFailure, SendOutcome, SigningError, SigningResult,
};

/// Order in which providers are tried for a brand-new agreement.
pub const PROVIDER_PREFERENCE: [SignatureProvider; 2] =
    [SignatureProvider::DocuSign, SignatureProvider::HelloSign];

#[derive(Clone, Default)]
pub struct ContractManager {
    providers: HashMap<SignatureProvider, Arc<dyn BaseSigningProvider>>,
}

impl ContractManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under the provider it reports.
    pub fn with_provider(mut self, adapter: Arc<dyn BaseSigningProvider>) -> Self {
        self.providers.insert(adapter.provider(), adapter);
        self
    }

    pub fn registered(&self) -> Vec<SignatureProvider> {
        let mut providers: Vec<_> = self.providers.keys().copied().collect();
        providers.sort_by_key(|p| p.as_str());
        providers
    }

    fn adapter(&self, provider: SignatureProvider) -> SigningResult<&Arc<dyn BaseSigningProvider>> {
        self.providers.get(&provider).ok_or_else(|| {
            SigningError::Configuration(format!("no signing adapter registered for {}", provider))
        })
    }

    /// Adapter bound to the agreement's recorded provider.
    fn bound_adapter(
        &self,
        agreement: &FeeAgreement,
    ) -> SigningResult<&Arc<dyn BaseSigningProvider>> {
        let provider = agreement.signature_provider.ok_or_else(|| {
            SigningError::Configuration(format!(
                "fee agreement {} has no signature provider recorded",
                agreement.id
            ))
        })?;
        self.adapter(provider)
    }

    /// Send a new agreement, falling back through providers until one accepts.
    pub async fn send_fee_agreement(&self, agreement: &FeeAgreement) -> SigningResult<SendOutcome> {
        let candidates: Vec<_> = PROVIDER_PREFERENCE
            .iter()
            .filter_map(|p| self.providers.get(p))
            .collect();

        if candidates.is_empty() {
            return Err(SigningError::Configuration(
                "no signing providers are configured".to_string(),
            ));
        }

        let mut failures = Vec::new();
        for adapter in candidates {
            let provider = adapter.provider();
            match adapter.send_contract(agreement).await {
                Ok(details) => {
                    info!(
                        fee_agreement_id = %agreement.id,
                        provider = %provider,
                        contract_id = %details.contract_id,
                        failed_attempts = failures.len(),
                        "Fee agreement sent"
                    );
                    return Ok(SendOutcome { provider, details });
                }
                Err(error) => {
                    warn!(
                        fee_agreement_id = %agreement.id,
                        provider = %provider,
                        error = %error,
                        "Signing provider failed, trying next"
                    );
                    failures.push(ProviderFailure { provider, error });
                }
            }
        }

        Err(SigningError::AllProvidersFailed(failures))
    }

    /// Send through exactly one provider, without fallback.
    pub async fn send_fee_agreement_through_specific_provider(
        &self,
        agreement: &FeeAgreement,
        provider: SignatureProvider,
    ) -> SigningResult<SendOutcome> {
        let details = self.adapter(provider)?.send_contract(agreement).await?;
        Ok(SendOutcome { provider, details })
    }

    pub async fn void_contract(&self, agreement: &FeeAgreement, reason: &str) -> SigningResult<()> {
        self.bound_adapter(agreement)?
            .void_contract(agreement, reason)
            .await
    }

    pub async fn send_reminder(&self, agreement: &FeeAgreement) -> SigningResult<()> {
        self.bound_adapter(agreement)?.send_reminder(agreement).await
    }

    pub async fn get_signature_email_by_signer_role(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<Option<String>> {
        self.bound_adapter(agreement)?
            .get_signature_email_by_signer_role(agreement, role)
            .await
    }

    pub async fn update_hiring_authority_signer_email(
        &self,
        agreement: &FeeAgreement,
        email: &str,
    ) -> SigningResult<()> {
        self.bound_adapter(agreement)?
            .update_hiring_authority_signer_email(agreement, email)
            .await
    }

    pub async fn get_files_in_base64(&self, agreement: &FeeAgreement) -> SigningResult<String> {
        self.bound_adapter(agreement)?
            .get_files_in_base64(agreement)
            .await
    }

    pub async fn check_if_contract_exists(&self, agreement: &FeeAgreement) -> SigningResult<bool> {
        self.bound_adapter(agreement)?
            .check_if_contract_exists(agreement)
            .await
    }
}
