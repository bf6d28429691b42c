//! Signing provider adapters.
//!
//! Every provider implements [`BaseSigningProvider`]; the contract manager
//! selects one by [`SignatureProvider`]. Adapters build their own roles,
//! recipients and custom fields but share template resolution and field
//! values with each other.

pub mod docusign;
pub mod external;
pub mod hellosign;

pub use docusign::{DocusignProvider, DocusignSettings};
pub use external::ExternalDocumentProvider;
pub use hellosign::{HelloSignProvider, HelloSignSettings};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{FeeAgreement, FeeAgreementStatus, SignatureProvider, SignerRole};
use crate::common::FeeAgreementId;

pub type SigningResult<T> = std::result::Result<T, SigningError>;

/// What a provider returns after accepting a new contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSentDetails {
    pub provider: SignatureProvider,
    pub contract_id: String,
}

/// Result of a first send through the contract manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub provider: SignatureProvider,
    pub details: ContractSentDetails,
}

/// One provider's failure inside the send cascade.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: SignatureProvider,
    pub error: SigningError,
}

#[derive(Debug, Error)]
pub enum SigningError {
    /// Deployment defect: no adapter registered, or nothing to bind to.
    #[error("Signing configuration error: {0}")]
    Configuration(String),

    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: SignatureProvider,
        operation: &'static str,
    },

    #[error("Fee agreement {0} has no contract on record")]
    MissingContract(FeeAgreementId),

    #[error("Fee agreement {agreement_id} is recorded on {recorded:?}, not {provider}")]
    ProviderMismatch {
        agreement_id: FeeAgreementId,
        provider: SignatureProvider,
        recorded: Option<SignatureProvider>,
    },

    #[error("{provider} contract {contract_id} not found")]
    NotFound {
        provider: SignatureProvider,
        contract_id: String,
    },

    #[error("No {role:?} signer on {provider} contract {contract_id}")]
    SignerNotFound {
        provider: SignatureProvider,
        contract_id: String,
        role: SignerRole,
    },

    #[error("No signer is pending while the agreement is {0:?}")]
    NoPendingSigner(FeeAgreementStatus),

    #[error("{provider} request failed: {source}")]
    Provider {
        provider: SignatureProvider,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("All signing providers failed: {}", describe_failures(.0))]
    AllProvidersFailed(Vec<ProviderFailure>),
}

impl SigningError {
    pub fn provider(
        provider: SignatureProvider,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Provider {
            provider,
            source: Box::new(source),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Unsupported { .. })
    }
}

fn describe_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Capabilities every e-signature provider must offer.
#[async_trait]
pub trait BaseSigningProvider: Send + Sync {
    fn provider(&self) -> SignatureProvider;

    /// Create the contract from the resolved template and send it out.
    async fn send_contract(&self, agreement: &FeeAgreement) -> SigningResult<ContractSentDetails>;

    async fn void_contract(&self, agreement: &FeeAgreement, reason: &str) -> SigningResult<()>;

    /// Re-notify whichever signer the agreement's status is waiting on.
    async fn send_reminder(&self, agreement: &FeeAgreement) -> SigningResult<()>;

    async fn get_signature_email_by_signer_role(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<Option<String>>;

    async fn update_hiring_authority_signer_email(
        &self,
        agreement: &FeeAgreement,
        email: &str,
    ) -> SigningResult<()>;

    /// The signed document, base64 encoded.
    async fn get_files_in_base64(&self, agreement: &FeeAgreement) -> SigningResult<String>;

    /// `false` when the provider no longer knows the contract.
    async fn check_if_contract_exists(&self, agreement: &FeeAgreement) -> SigningResult<bool>;
}

/// The agreement's contract id, checked to belong to `provider`.
pub(crate) fn recorded_contract(
    provider: SignatureProvider,
    agreement: &FeeAgreement,
) -> SigningResult<&str> {
    if agreement.signature_provider != Some(provider) {
        return Err(SigningError::ProviderMismatch {
            agreement_id: agreement.id,
            provider,
            recorded: agreement.signature_provider,
        });
    }
    agreement
        .contract_on(provider)
        .ok_or(SigningError::MissingContract(agreement.id))
}

/// Signer the agreement is currently waiting on.
pub(crate) fn pending_signer(agreement: &FeeAgreement) -> SigningResult<SignerRole> {
    SignerRole::pending_for(agreement.status).ok_or(SigningError::NoPendingSigner(agreement.status))
}

/// Subject line used for every outgoing contract.
pub(crate) fn email_subject(agreement: &FeeAgreement) -> String {
    format!("Fee Agreement - {}", agreement.company.name)
}
