//! HelloSign (signature-request-style) adapter.

use async_trait::async_trait;
use hellosign_client::{
    CustomField, HelloSignClient, HelloSignError, SendWithTemplateRequest, Signature,
    TemplateCc, TemplateSigner,
};
use tracing::{debug, info};

use super::{
    email_subject, pending_signer, recorded_contract, BaseSigningProvider, ContractSentDetails,
    SigningError, SigningResult,
};
use crate::domains::fee_agreements::models::{FeeAgreement, SignatureProvider, SignerRole};
use crate::domains::fee_agreements::recipients::{agreement_cc_recipients, contract_fields};
use crate::domains::fee_agreements::templates::{resolve_template, TemplateTable};

const PROVIDER: SignatureProvider = SignatureProvider::HelloSign;

#[derive(Debug, Clone)]
pub struct HelloSignSettings {
    pub templates: TemplateTable,
    /// Requests are free and not legally binding in test mode.
    pub test_mode: bool,
    pub client_id: Option<String>,
}

pub struct HelloSignProvider {
    client: HelloSignClient,
    settings: HelloSignSettings,
}

impl HelloSignProvider {
    pub fn new(client: HelloSignClient, settings: HelloSignSettings) -> Self {
        Self { client, settings }
    }

    async fn signature(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<(String, Option<Signature>)> {
        let request_id = recorded_contract(PROVIDER, agreement)?;
        let request = self
            .client
            .get_signature_request(request_id)
            .await
            .map_err(|e| map_error(e, request_id))?;

        Ok((
            request_id.to_string(),
            request.signature_by_role(role.role_name()).cloned(),
        ))
    }

    async fn required_signature(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<(String, Signature)> {
        match self.signature(agreement, role).await? {
            (request_id, Some(signature)) => Ok((request_id, signature)),
            (request_id, None) => Err(SigningError::SignerNotFound {
                provider: PROVIDER,
                contract_id: request_id,
                role,
            }),
        }
    }
}

/// Signature request for a fee agreement.
///
/// Only fields the template declares are sent; HelloSign rejects unknown
/// custom field names.
pub fn build_signature_request(
    agreement: &FeeAgreement,
    settings: &HelloSignSettings,
    template_id: &str,
    declared_fields: &[&str],
) -> SendWithTemplateRequest {
    let custom_fields = contract_fields(agreement)
        .into_iter()
        .filter(|field| declared_fields.contains(&field.name))
        .map(|field| CustomField {
            name: field.name.to_string(),
            value: field.value,
        })
        .collect();

    let signers = vec![
        TemplateSigner {
            role: SignerRole::HiringAuthority.role_name().to_string(),
            name: agreement.hiring_authority.full_name.clone(),
            email_address: agreement.hiring_authority.work_email.clone(),
        },
        TemplateSigner {
            role: SignerRole::ProductionDirector.role_name().to_string(),
            name: agreement.production_director.full_name.clone(),
            email_address: agreement.production_director.email.clone(),
        },
    ];

    let ccs = agreement_cc_recipients(agreement)
        .into_iter()
        .map(|cc| TemplateCc {
            role: cc.role,
            email_address: cc.email,
        })
        .collect();

    SendWithTemplateRequest {
        template_ids: vec![template_id.to_string()],
        subject: email_subject(agreement),
        message: format!(
            "Please review and sign the fee agreement for {}.",
            agreement.company.name
        ),
        signers,
        ccs,
        custom_fields,
        test_mode: settings.test_mode,
        client_id: settings.client_id.clone(),
    }
}

fn map_error(e: HelloSignError, request_id: &str) -> SigningError {
    if e.is_not_found() {
        SigningError::NotFound {
            provider: PROVIDER,
            contract_id: request_id.to_string(),
        }
    } else {
        SigningError::provider(PROVIDER, e)
    }
}

#[async_trait]
impl BaseSigningProvider for HelloSignProvider {
    fn provider(&self) -> SignatureProvider {
        PROVIDER
    }

    async fn send_contract(&self, agreement: &FeeAgreement) -> SigningResult<ContractSentDetails> {
        let template_id = resolve_template(
            agreement.payment_scheme,
            agreement.guarantee_days,
            &self.settings.templates,
        );

        let template = self
            .client
            .get_template(template_id)
            .await
            .map_err(|e| SigningError::provider(PROVIDER, e))?;
        let declared = template.custom_field_names();
        debug!(template_id, fields = ?declared, "Inspected HelloSign template");

        let request = build_signature_request(agreement, &self.settings, template_id, &declared);
        let sent = self
            .client
            .send_with_template(&request)
            .await
            .map_err(|e| SigningError::provider(PROVIDER, e))?;

        info!(
            fee_agreement_id = %agreement.id,
            signature_request_id = %sent.signature_request_id,
            template_id,
            "Fee agreement sent through HelloSign"
        );

        Ok(ContractSentDetails {
            provider: PROVIDER,
            contract_id: sent.signature_request_id,
        })
    }

    async fn void_contract(&self, agreement: &FeeAgreement, reason: &str) -> SigningResult<()> {
        let request_id = recorded_contract(PROVIDER, agreement)?;
        debug!(signature_request_id = %request_id, reason, "Cancelling HelloSign request");

        self.client
            .cancel_signature_request(request_id)
            .await
            .map_err(|e| map_error(e, request_id))
    }

    async fn send_reminder(&self, agreement: &FeeAgreement) -> SigningResult<()> {
        let role = pending_signer(agreement)?;
        let (request_id, signature) = self.required_signature(agreement, role).await?;

        self.client
            .remind(&request_id, &signature.signer_email_address)
            .await
            .map_err(|e| map_error(e, &request_id))
    }

    async fn get_signature_email_by_signer_role(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<Option<String>> {
        let (_, signature) = self.signature(agreement, role).await?;
        Ok(signature.map(|s| s.signer_email_address))
    }

    async fn update_hiring_authority_signer_email(
        &self,
        agreement: &FeeAgreement,
        email: &str,
    ) -> SigningResult<()> {
        let (request_id, signature) = self
            .required_signature(agreement, SignerRole::HiringAuthority)
            .await?;

        self.client
            .update_signer_email(&request_id, &signature.signature_id, email)
            .await
            .map_err(|e| map_error(e, &request_id))
    }

    async fn get_files_in_base64(&self, agreement: &FeeAgreement) -> SigningResult<String> {
        let request_id = recorded_contract(PROVIDER, agreement)?;
        let files = self
            .client
            .files_as_data_uri(request_id)
            .await
            .map_err(|e| map_error(e, request_id))?;
        Ok(files.base64_payload().to_string())
    }

    async fn check_if_contract_exists(&self, agreement: &FeeAgreement) -> SigningResult<bool> {
        let request_id = match recorded_contract(PROVIDER, agreement) {
            Ok(id) => id,
            Err(SigningError::MissingContract(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        match self.client.get_signature_request(request_id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(SigningError::provider(PROVIDER, e)),
        }
    }
}
