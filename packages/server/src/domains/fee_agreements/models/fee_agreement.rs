use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::{FeeAgreementStatus, PaymentScheme, SignatureProvider};
use crate::common::{CompanyId, FeeAgreementId, HiringAuthorityId, UserId};

/// Fee agreement aggregate with every related entity loaded.
///
/// Owned by the CRM; this core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeAgreement {
    pub id: FeeAgreementId,
    pub company: Company,
    pub hiring_authority: HiringAuthority,
    pub creator: StaffMember,
    pub coach: Option<StaffMember>,
    pub regional_director: Option<StaffMember>,
    pub production_director: StaffMember,
    pub payment_scheme: PaymentScheme,
    pub fee_percentage: Option<Decimal>,
    pub flat_fee_amount: Option<Decimal>,
    pub guarantee_days: Option<u32>,
    pub status: FeeAgreementStatus,
    /// Provider holding `contract_id`. `None` until first sent.
    pub signature_provider: Option<SignatureProvider>,
    /// Opaque reference, only meaningful for `signature_provider`.
    pub contract_id: Option<String>,
    #[serde(default)]
    pub cc_emails: Vec<String>,
    pub signed_date: Option<DateTime<Utc>>,
    /// Stored PDF for externally managed agreements.
    pub pdf_url: Option<String>,
    pub specialty: Option<String>,
    #[serde(default)]
    pub event_logs: Vec<EventLog>,
}

impl FeeAgreement {
    /// Contract reference, provided it belongs to `provider`.
    pub fn contract_on(&self, provider: SignatureProvider) -> Option<&str> {
        if self.signature_provider == Some(provider) {
            self.contract_id.as_deref()
        } else {
            None
        }
    }

    /// Staff who follow the deal: creator plus coach when it is someone else.
    pub fn deal_team_user_ids(&self) -> Vec<UserId> {
        let mut ids = vec![self.creator.user_id];
        if let Some(coach) = &self.coach {
            if coach.user_id != self.creator.user_id {
                ids.push(coach.user_id);
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiringAuthority {
    pub id: HiringAuthorityId,
    pub full_name: String,
    pub title: Option<String>,
    pub work_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
}

/// One entry of the append-only audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    pub event_type: String,
    pub result_status: FeeAgreementStatus,
    #[serde(default)]
    pub details: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}
