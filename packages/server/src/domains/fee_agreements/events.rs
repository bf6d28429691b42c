//! Status transitions the dispatcher reacts to.
//!
//! Transitions are decided upstream; these are facts handed in after the
//! status has already changed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeAgreementEvent {
    /// Standard terms, sent straight to the hiring authority.
    CreatedStandard,
    /// Non-standard terms, waiting on coach or operations validation.
    CreatedNonStandard,
    ValidatedByCoach,
    /// Operations approved the terms and the contract went out.
    ValidatedAndSentToSign,
    DeclinedByCoach { reason: String },
    DeclinedByOperations { reason: String },
    /// Sent back to the creator for changes (pending update).
    UpdateRequested { notes: Option<String> },
    SignedByHiringAuthority,
    SignedByProductionDirector,
    Voided { reason: String },
    Expired,
    AboutToExpire { days_left: u32 },
}

impl FeeAgreementEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreatedStandard => "created_standard",
            Self::CreatedNonStandard => "created_non_standard",
            Self::ValidatedByCoach => "validated_by_coach",
            Self::ValidatedAndSentToSign => "validated_and_sent_to_sign",
            Self::DeclinedByCoach { .. } => "declined_by_coach",
            Self::DeclinedByOperations { .. } => "declined_by_operations",
            Self::UpdateRequested { .. } => "update_requested",
            Self::SignedByHiringAuthority => "signed_by_hiring_authority",
            Self::SignedByProductionDirector => "signed_by_production_director",
            Self::Voided { .. } => "voided",
            Self::Expired => "expired",
            Self::AboutToExpire { .. } => "about_to_expire",
        }
    }
}
