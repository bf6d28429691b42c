use serde::{Deserialize, Serialize};

/// Lifecycle status of a fee agreement.
///
/// Created -> PendingCoachValidation -> PendingRegionalValidation ->
/// PendingHiringAuthoritySignature -> SignedByHiringAuthority -> Signed,
/// with PendingUpdate looping back to validation and Declined, Voided and
/// Expired as terminal branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeAgreementStatus {
    Created,
    PendingCoachValidation,
    PendingRegionalValidation,
    PendingHiringAuthoritySignature,
    SignedByHiringAuthority,
    Signed,
    PendingUpdate,
    Declined,
    Voided,
    Expired,
}

/// Payment scheme that drives template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentScheme {
    Standard,
    Flat,
    Conversion,
    #[serde(rename = "basesalary")]
    BaseSalary,
    /// Any scheme this core does not know; handled as standard.
    #[serde(other)]
    Unknown,
}

/// Where the agreement's contract lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureProvider {
    DocuSign,
    HelloSign,
    /// Signed outside any integrated provider; only a stored PDF exists.
    External,
}

impl SignatureProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DocuSign => "docusign",
            Self::HelloSign => "hellosign",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for SignatureProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signer slots every fee-agreement template defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    HiringAuthority,
    ProductionDirector,
}

impl SignerRole {
    /// Role name as configured in the provider templates.
    pub fn role_name(self) -> &'static str {
        match self {
            Self::HiringAuthority => "hiring_authority",
            Self::ProductionDirector => "production_director",
        }
    }

    /// The signer whose turn it is for a given status, if any.
    pub fn pending_for(status: FeeAgreementStatus) -> Option<Self> {
        match status {
            FeeAgreementStatus::PendingHiringAuthoritySignature => Some(Self::HiringAuthority),
            FeeAgreementStatus::SignedByHiringAuthority => Some(Self::ProductionDirector),
            _ => None,
        }
    }
}
