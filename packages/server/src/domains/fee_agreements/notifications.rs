//! Push notification payloads built per transition.

use serde::{Deserialize, Serialize};

use super::events::FeeAgreementEvent;
use super::models::FeeAgreement;
use crate::common::UserId;

/// Devices a notification is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceMask(pub u8);

impl DeviceMask {
    pub const WEB: DeviceMask = DeviceMask(0b01);
    pub const MOBILE: DeviceMask = DeviceMask(0b10);
    pub const ALL: DeviceMask = DeviceMask(0b11);

    pub fn includes(self, other: DeviceMask) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub target_user_ids: Vec<UserId>,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub color: String,
    pub click_url: String,
    pub click_action: String,
    pub device_mask: DeviceMask,
}

/// Named payload; `None` means "nothing to send for this slot".
pub type NamedPayload = (&'static str, Option<NotificationPayload>);

/// Settings shared by notification builders and side effects.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    /// CRM web app, used for click-through links.
    pub app_base_url: String,
    /// Mailbox receiving a copy of every signed agreement.
    pub internal_copy_email: String,
    pub operations_email: String,
    /// Operations team members notified in-app.
    pub operations_user_ids: Vec<UserId>,
    pub signed_chat_channel: String,
    pub email_templates: EmailTemplates,
}

/// Transactional email template ids.
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    pub hiring_authority_thank_you: String,
    pub validation_request: String,
    pub internal_signed_copy: String,
}

mod style {
    pub const ICON_SIGNATURE: &str = "signature";
    pub const ICON_VALIDATION: &str = "validation";
    pub const ICON_WARNING: &str = "warning";
    pub const ICON_DECLINED: &str = "declined";

    pub const COLOR_SUCCESS: &str = "#27AE60";
    pub const COLOR_INFO: &str = "#2F80ED";
    pub const COLOR_WARNING: &str = "#F2994A";
    pub const COLOR_DANGER: &str = "#EB5757";
}

use style::*;

const CLICK_ACTION: &str = "open_fee_agreement";

fn payload(
    agreement: &FeeAgreement,
    settings: &NotificationSettings,
    targets: Vec<UserId>,
    title: impl Into<String>,
    body: impl Into<String>,
    icon: &str,
    color: &str,
) -> Option<NotificationPayload> {
    if targets.is_empty() {
        return None;
    }

    Some(NotificationPayload {
        target_user_ids: targets,
        title: title.into(),
        body: body.into(),
        icon: icon.to_string(),
        color: color.to_string(),
        click_url: format!(
            "{}/fee-agreements/{}",
            settings.app_base_url.trim_end_matches('/'),
            agreement.id
        ),
        click_action: CLICK_ACTION.to_string(),
        device_mask: DeviceMask::ALL,
    })
}

fn regional_director(agreement: &FeeAgreement) -> Vec<UserId> {
    agreement
        .regional_director
        .iter()
        .map(|rd| rd.user_id)
        .collect()
}

/// Everyone following the deal plus the regional director.
fn deal_team_and_director(agreement: &FeeAgreement) -> Vec<UserId> {
    let mut targets = agreement.deal_team_user_ids();
    for id in regional_director(agreement) {
        if !targets.contains(&id) {
            targets.push(id);
        }
    }
    targets
}

/// Payloads for a transition, keyed by recipient group.
pub fn build_payloads(
    event: &FeeAgreementEvent,
    agreement: &FeeAgreement,
    settings: &NotificationSettings,
) -> Vec<NamedPayload> {
    let company = &agreement.company.name;
    let creator = &agreement.creator.full_name;

    match event {
        FeeAgreementEvent::CreatedStandard => vec![(
            "regional_director",
            payload(
                agreement,
                settings,
                regional_director(agreement),
                "New fee agreement sent",
                format!("{} sent a standard fee agreement to {}", creator, company),
                ICON_SIGNATURE,
                COLOR_INFO,
            ),
        )],
        FeeAgreementEvent::CreatedNonStandard => {
            let (name, targets) = match &agreement.coach {
                Some(coach) => ("coach_validation", vec![coach.user_id]),
                None => ("operations_validation", settings.operations_user_ids.clone()),
            };
            vec![(
                name,
                payload(
                    agreement,
                    settings,
                    targets,
                    "Fee agreement needs validation",
                    format!("{} requested non-standard terms for {}", creator, company),
                    ICON_VALIDATION,
                    COLOR_WARNING,
                ),
            )]
        }
        FeeAgreementEvent::ValidatedByCoach => vec![(
            "regional_director",
            payload(
                agreement,
                settings,
                regional_director(agreement),
                "Fee agreement validated by coach",
                format!("The coach approved the {} fee agreement", company),
                ICON_VALIDATION,
                COLOR_WARNING,
            ),
        )],
        FeeAgreementEvent::ValidatedAndSentToSign => vec![(
            "deal_team",
            payload(
                agreement,
                settings,
                agreement.deal_team_user_ids(),
                "Fee agreement sent to sign",
                format!("The {} fee agreement was validated and sent for signature", company),
                ICON_SIGNATURE,
                COLOR_INFO,
            ),
        )],
        FeeAgreementEvent::DeclinedByCoach { reason }
        | FeeAgreementEvent::DeclinedByOperations { reason } => vec![(
            "deal_team",
            payload(
                agreement,
                settings,
                agreement.deal_team_user_ids(),
                "Fee agreement declined",
                format!("The {} fee agreement was declined: {}", company, reason),
                ICON_DECLINED,
                COLOR_DANGER,
            ),
        )],
        FeeAgreementEvent::UpdateRequested { notes } => {
            let body = match notes {
                Some(notes) => format!("Changes requested on the {} fee agreement: {}", company, notes),
                None => format!("Changes requested on the {} fee agreement", company),
            };
            vec![(
                "creator",
                payload(
                    agreement,
                    settings,
                    vec![agreement.creator.user_id],
                    "Fee agreement needs updates",
                    body,
                    ICON_WARNING,
                    COLOR_WARNING,
                ),
            )]
        }
        FeeAgreementEvent::SignedByHiringAuthority => vec![(
            "deal_team",
            payload(
                agreement,
                settings,
                agreement.deal_team_user_ids(),
                "Hiring authority signed",
                format!(
                    "{} signed the {} fee agreement",
                    agreement.hiring_authority.full_name, company
                ),
                ICON_SIGNATURE,
                COLOR_INFO,
            ),
        )],
        FeeAgreementEvent::SignedByProductionDirector => vec![(
            "deal_team",
            payload(
                agreement,
                settings,
                deal_team_and_director(agreement),
                "Fee agreement signed",
                format!("The {} fee agreement is fully signed", company),
                ICON_SIGNATURE,
                COLOR_SUCCESS,
            ),
        )],
        FeeAgreementEvent::Voided { reason } => vec![(
            "deal_team",
            payload(
                agreement,
                settings,
                agreement.deal_team_user_ids(),
                "Fee agreement voided",
                format!("The {} fee agreement was voided: {}", company, reason),
                ICON_DECLINED,
                COLOR_DANGER,
            ),
        )],
        FeeAgreementEvent::Expired => vec![(
            "deal_team",
            payload(
                agreement,
                settings,
                agreement.deal_team_user_ids(),
                "Fee agreement expired",
                format!("The {} fee agreement expired before it was signed", company),
                ICON_WARNING,
                COLOR_DANGER,
            ),
        )],
        FeeAgreementEvent::AboutToExpire { days_left } => {
            let when = match days_left {
                0 => "today".to_string(),
                1 => "in 1 day".to_string(),
                n => format!("in {} days", n),
            };
            vec![(
                "deal_team",
                payload(
                    agreement,
                    settings,
                    agreement.deal_team_user_ids(),
                    "Fee agreement about to expire",
                    format!("The {} fee agreement expires {}", company, when),
                    ICON_WARNING,
                    COLOR_WARNING,
                ),
            )]
        }
    }
}
