//! Additional work run after a transition's notifications are sent.
//!
//! Each unit of work is independent: the dispatcher runs them one by one and
//! logs failures without stopping the rest.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use tracing::info;

use super::events::FeeAgreementEvent;
use super::models::FeeAgreement;
use super::notifications::{NotificationPayload, NotificationSettings};
use crate::kernel::{ChatMessage, EmailAttachment, EmailRecipient, ServerDeps, TemplatedEmail};

/// Everything a unit of work can see.
pub struct WorkContext<'a> {
    pub deps: &'a ServerDeps,
    pub event: &'a FeeAgreementEvent,
    /// Freshly re-loaded after notifications went out.
    pub agreement: &'a FeeAgreement,
    pub payloads: &'a [(&'static str, NotificationPayload)],
    /// Names of payloads that were delivered.
    pub sent: &'a [&'static str],
}

#[async_trait]
pub trait AdditionalWork: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &WorkContext<'_>) -> Result<()>;
}

// =============================================================================
// Hiring authority thank-you
// =============================================================================

/// Thank the hiring authority and point them at the signing email.
pub struct SendHiringAuthorityThankYou;

#[async_trait]
impl AdditionalWork for SendHiringAuthorityThankYou {
    fn name(&self) -> &'static str {
        "send_hiring_authority_thank_you"
    }

    async fn run(&self, ctx: &WorkContext<'_>) -> Result<()> {
        let agreement = ctx.agreement;
        let settings = &ctx.deps.settings;

        let email = TemplatedEmail {
            template_id: settings.email_templates.hiring_authority_thank_you.clone(),
            to: vec![EmailRecipient::new(
                agreement.hiring_authority.work_email.clone(),
                Some(agreement.hiring_authority.full_name.clone()),
            )],
            data: json!({
                "hiring_authority_name": agreement.hiring_authority.full_name,
                "company_name": agreement.company.name,
                "recruiter_name": agreement.creator.full_name,
                "recruiter_email": agreement.creator.email,
            }),
            attachments: Vec::new(),
        };

        ctx.deps.email.send_templated(&email).await
    }
}

// =============================================================================
// Validation request emails
// =============================================================================

/// Ask the coach (or operations) to validate non-standard terms.
pub struct SendValidationRequestEmails;

/// Who receives validation emails for a transition.
///
/// When a coach is assigned they validate first, so the generic operations
/// entry is left out.
pub fn validation_recipients(
    event: &FeeAgreementEvent,
    agreement: &FeeAgreement,
    settings: &NotificationSettings,
) -> Vec<(&'static str, EmailRecipient)> {
    let operations = (
        "operations",
        EmailRecipient::new(settings.operations_email.clone(), None),
    );

    let coach = agreement.coach.as_ref().map(|coach| {
        (
            "coach",
            EmailRecipient::new(coach.email.clone(), Some(coach.full_name.clone())),
        )
    });

    match (event, coach) {
        (FeeAgreementEvent::CreatedNonStandard, Some(coach)) => vec![coach],
        _ => vec![operations],
    }
}

#[async_trait]
impl AdditionalWork for SendValidationRequestEmails {
    fn name(&self) -> &'static str {
        "send_validation_request_emails"
    }

    async fn run(&self, ctx: &WorkContext<'_>) -> Result<()> {
        let agreement = ctx.agreement;
        let settings = &ctx.deps.settings;

        for (group, recipient) in validation_recipients(ctx.event, agreement, settings) {
            let email = TemplatedEmail {
                template_id: settings.email_templates.validation_request.clone(),
                to: vec![recipient],
                data: json!({
                    "validator_group": group,
                    "company_name": agreement.company.name,
                    "creator_name": agreement.creator.full_name,
                    "fee_agreement_url": format!(
                        "{}/fee-agreements/{}",
                        settings.app_base_url.trim_end_matches('/'),
                        agreement.id
                    ),
                }),
                attachments: Vec::new(),
            };

            ctx.deps
                .email
                .send_templated(&email)
                .await
                .with_context(|| format!("validation email to {}", group))?;
        }

        Ok(())
    }
}

// =============================================================================
// Internal signed copy
// =============================================================================

/// Mail the fully signed PDF to the internal contracts mailbox.
pub struct SendInternalSignedCopy;

#[async_trait]
impl AdditionalWork for SendInternalSignedCopy {
    fn name(&self) -> &'static str {
        "send_internal_signed_copy"
    }

    async fn run(&self, ctx: &WorkContext<'_>) -> Result<()> {
        let agreement = ctx.agreement;
        let settings = &ctx.deps.settings;

        let content = ctx
            .deps
            .contracts
            .get_files_in_base64(agreement)
            .await
            .context("fetch signed document")?;

        let email = TemplatedEmail {
            template_id: settings.email_templates.internal_signed_copy.clone(),
            to: vec![EmailRecipient::new(settings.internal_copy_email.clone(), None)],
            data: json!({
                "company_name": agreement.company.name,
                "hiring_authority_name": agreement.hiring_authority.full_name,
                "creator_name": agreement.creator.full_name,
                "signed_date": agreement.signed_date,
            }),
            attachments: vec![EmailAttachment {
                filename: format!("Fee Agreement - {}.pdf", agreement.company.name),
                content_type: "application/pdf".to_string(),
                content,
            }],
        };

        ctx.deps.email.send_templated(&email).await
    }
}

// =============================================================================
// Daily signed count
// =============================================================================

/// Celebrate the signature in team chat with today's running total.
pub struct PostDailySignedCount;

#[async_trait]
impl AdditionalWork for PostDailySignedCount {
    fn name(&self) -> &'static str {
        "post_daily_signed_count"
    }

    async fn run(&self, ctx: &WorkContext<'_>) -> Result<()> {
        let agreement = ctx.agreement;
        let today = Utc::now().date_naive();
        let midnight = Utc.from_utc_datetime(
            &today
                .and_hms_opt(0, 0, 0)
                .context("midnight is a valid time")?,
        );

        let count = ctx.deps.repository.count_signed_since(midnight).await?;

        let text = format!(
            "{} signed a fee agreement with {}{}. That makes {} signed today!",
            agreement.creator.full_name,
            agreement.company.name,
            agreement
                .specialty
                .as_ref()
                .map(|s| format!(" ({})", s))
                .unwrap_or_default(),
            count
        );

        ctx.deps
            .chat
            .post_message(&ChatMessage {
                channel: ctx.deps.settings.signed_chat_channel.clone(),
                text,
            })
            .await?;

        info!(fee_agreement_id = %agreement.id, signed_today = count, "Posted daily signed count");
        Ok(())
    }
}

// =============================================================================
// Signer reminder
// =============================================================================

/// Re-send the signing email to whoever the agreement is waiting on.
pub struct RemindPendingSigner;

#[async_trait]
impl AdditionalWork for RemindPendingSigner {
    fn name(&self) -> &'static str {
        "remind_pending_signer"
    }

    async fn run(&self, ctx: &WorkContext<'_>) -> Result<()> {
        ctx.deps.contracts.send_reminder(ctx.agreement).await?;
        Ok(())
    }
}
