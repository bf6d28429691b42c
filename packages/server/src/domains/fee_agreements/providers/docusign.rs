//! DocuSign (envelope-style) adapter.

use async_trait::async_trait;
use base64::prelude::*;
use docusign_client::{
    DocusignClient, DocusignError, EnvelopeDefinition, EventNotification, Recipients, Signer,
    Tabs, TemplateRole, TextTab,
};
use tracing::info;

use super::{
    email_subject, pending_signer, recorded_contract, BaseSigningProvider, ContractSentDetails,
    SigningError, SigningResult,
};
use crate::domains::fee_agreements::models::{FeeAgreement, SignatureProvider, SignerRole};
use crate::domains::fee_agreements::recipients::{agreement_cc_recipients, contract_fields};
use crate::domains::fee_agreements::templates::{resolve_template, TemplateTable};

const PROVIDER: SignatureProvider = SignatureProvider::DocuSign;

#[derive(Debug, Clone)]
pub struct DocusignSettings {
    pub templates: TemplateTable,
    /// Connect listener for envelope status events.
    pub webhook_url: Option<String>,
}

pub struct DocusignProvider {
    client: DocusignClient,
    settings: DocusignSettings,
}

impl DocusignProvider {
    pub fn new(client: DocusignClient, settings: DocusignSettings) -> Self {
        Self { client, settings }
    }

    async fn signer(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<(String, Option<Signer>)> {
        let envelope_id = recorded_contract(PROVIDER, agreement)?;
        let envelope = self
            .client
            .get_envelope(envelope_id)
            .await
            .map_err(|e| map_error(e, envelope_id))?;

        Ok((
            envelope_id.to_string(),
            envelope.signer_by_role(role.role_name()).cloned(),
        ))
    }

    async fn required_signer(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<(String, Signer)> {
        match self.signer(agreement, role).await? {
            (envelope_id, Some(signer)) => Ok((envelope_id, signer)),
            (envelope_id, None) => Err(SigningError::SignerNotFound {
                provider: PROVIDER,
                contract_id: envelope_id,
                role,
            }),
        }
    }
}

/// Envelope request for a fee agreement.
pub fn build_envelope_definition(
    agreement: &FeeAgreement,
    settings: &DocusignSettings,
) -> EnvelopeDefinition {
    let template_id = resolve_template(
        agreement.payment_scheme,
        agreement.guarantee_days,
        &settings.templates,
    );

    let text_tabs = contract_fields(agreement)
        .into_iter()
        .map(|field| TextTab {
            tab_label: field.name.to_string(),
            value: field.value,
        })
        .collect();

    let mut template_roles = vec![
        TemplateRole {
            role_name: SignerRole::HiringAuthority.role_name().to_string(),
            name: agreement.hiring_authority.full_name.clone(),
            email: agreement.hiring_authority.work_email.clone(),
            tabs: Some(Tabs { text_tabs }),
        },
        TemplateRole {
            role_name: SignerRole::ProductionDirector.role_name().to_string(),
            name: agreement.production_director.full_name.clone(),
            email: agreement.production_director.email.clone(),
            tabs: None,
        },
    ];

    template_roles.extend(agreement_cc_recipients(agreement).into_iter().map(|cc| {
        TemplateRole {
            name: cc.email.clone(),
            role_name: cc.role,
            email: cc.email,
            tabs: None,
        }
    }));

    EnvelopeDefinition {
        template_id: template_id.to_string(),
        email_subject: email_subject(agreement),
        status: "sent".to_string(),
        template_roles,
        event_notification: settings
            .webhook_url
            .as_ref()
            .map(EventNotification::full_lifecycle),
    }
}

fn map_error(e: DocusignError, envelope_id: &str) -> SigningError {
    if e.is_not_found() {
        SigningError::NotFound {
            provider: PROVIDER,
            contract_id: envelope_id.to_string(),
        }
    } else {
        SigningError::provider(PROVIDER, e)
    }
}

/// Minimal signer body for a recipients update.
fn signer_update(signer: &Signer, email: &str) -> Recipients {
    Recipients {
        signers: vec![Signer {
            recipient_id: signer.recipient_id.clone(),
            role_name: None,
            name: signer.name.clone(),
            email: email.to_string(),
            status: None,
        }],
        carbon_copies: Vec::new(),
    }
}

#[async_trait]
impl BaseSigningProvider for DocusignProvider {
    fn provider(&self) -> SignatureProvider {
        PROVIDER
    }

    async fn send_contract(&self, agreement: &FeeAgreement) -> SigningResult<ContractSentDetails> {
        let definition = build_envelope_definition(agreement, &self.settings);
        let summary = self
            .client
            .create_envelope(&definition)
            .await
            .map_err(|e| SigningError::provider(PROVIDER, e))?;

        info!(
            fee_agreement_id = %agreement.id,
            envelope_id = %summary.envelope_id,
            template_id = %definition.template_id,
            "Fee agreement sent through DocuSign"
        );

        Ok(ContractSentDetails {
            provider: PROVIDER,
            contract_id: summary.envelope_id,
        })
    }

    async fn void_contract(&self, agreement: &FeeAgreement, reason: &str) -> SigningResult<()> {
        let envelope_id = recorded_contract(PROVIDER, agreement)?;
        self.client
            .void_envelope(envelope_id, reason)
            .await
            .map_err(|e| map_error(e, envelope_id))
    }

    async fn send_reminder(&self, agreement: &FeeAgreement) -> SigningResult<()> {
        let role = pending_signer(agreement)?;
        let (envelope_id, signer) = self.required_signer(agreement, role).await?;

        self.client
            .update_recipients(&envelope_id, &signer_update(&signer, &signer.email), true)
            .await
            .map_err(|e| map_error(e, &envelope_id))
    }

    async fn get_signature_email_by_signer_role(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<Option<String>> {
        let (_, signer) = self.signer(agreement, role).await?;
        Ok(signer.map(|s| s.email))
    }

    async fn update_hiring_authority_signer_email(
        &self,
        agreement: &FeeAgreement,
        email: &str,
    ) -> SigningResult<()> {
        let (envelope_id, signer) = self
            .required_signer(agreement, SignerRole::HiringAuthority)
            .await?;

        self.client
            .update_recipients(&envelope_id, &signer_update(&signer, email), true)
            .await
            .map_err(|e| map_error(e, &envelope_id))
    }

    async fn get_files_in_base64(&self, agreement: &FeeAgreement) -> SigningResult<String> {
        let envelope_id = recorded_contract(PROVIDER, agreement)?;
        let bytes = self
            .client
            .get_combined_document(envelope_id)
            .await
            .map_err(|e| map_error(e, envelope_id))?;
        Ok(BASE64_STANDARD.encode(bytes))
    }

    async fn check_if_contract_exists(&self, agreement: &FeeAgreement) -> SigningResult<bool> {
        let envelope_id = match recorded_contract(PROVIDER, agreement) {
            Ok(id) => id,
            Err(SigningError::MissingContract(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        match self.client.get_envelope(envelope_id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(SigningError::provider(PROVIDER, e)),
        }
    }
}
