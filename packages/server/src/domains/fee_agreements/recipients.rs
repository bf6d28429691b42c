//! Carbon-copy recipients and custom-field values shared by the adapters.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::models::{FeeAgreement, PaymentScheme};
use crate::common::utils::{format_integer, format_money, format_ordinal, format_percentage};

/// A cc recipient bound to a unique template role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcRecipient {
    pub email: String,
    pub role: String,
}

/// Merge cc sources into uniquely named roles.
///
/// Order is `cc_emails`, then coach, then creator. Exact duplicates keep
/// their first position. Providers reject repeated role names, hence
/// `cc_1`, `cc_2`, ...
pub fn build_cc_recipients(
    cc_emails: &[String],
    coach_email: Option<&str>,
    creator_email: Option<&str>,
) -> Vec<CcRecipient> {
    let mut seen = HashSet::new();

    cc_emails
        .iter()
        .map(String::as_str)
        .chain(coach_email)
        .chain(creator_email)
        .filter(|email| !email.trim().is_empty())
        .filter(|email| seen.insert(*email))
        .enumerate()
        .map(|(i, email)| CcRecipient {
            email: email.to_string(),
            role: format!("cc_{}", i + 1),
        })
        .collect()
}

/// cc recipients for an agreement.
pub fn agreement_cc_recipients(agreement: &FeeAgreement) -> Vec<CcRecipient> {
    build_cc_recipients(
        &agreement.cc_emails,
        agreement.coach.as_ref().map(|c| c.email.as_str()),
        Some(agreement.creator.email.as_str()),
    )
}

/// A named value placed into a document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractField {
    pub name: &'static str,
    pub value: String,
}

impl ContractField {
    fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Field values filled in on the hiring authority's copy of the document.
pub fn contract_fields(agreement: &FeeAgreement) -> Vec<ContractField> {
    let mut fields = vec![
        ContractField::new("company_name", agreement.company.name.clone()),
        ContractField::new("hiring_authority_name", agreement.hiring_authority.full_name.clone()),
        ContractField::new(
            "hiring_authority_title",
            agreement.hiring_authority.title.clone().unwrap_or_default(),
        ),
        ContractField::new(
            "production_director_name",
            agreement.production_director.full_name.clone(),
        ),
    ];

    if let Some(days) = agreement.guarantee_days {
        fields.push(ContractField::new("guarantee_days", format_integer(Decimal::from(days))));
        fields.push(ContractField::new("guarantee_days_ordinal", format_ordinal(i64::from(days))));
    }

    match agreement.payment_scheme {
        PaymentScheme::Flat => {
            fields.push(ContractField::new(
                "flat_fee_amount",
                format_money(agreement.flat_fee_amount),
            ));
        }
        _ => {
            if let Some(percentage) = agreement.fee_percentage {
                fields.push(ContractField::new("fee_percentage", format_percentage(percentage)));
            }
        }
    }

    fields
}
