use serde::{Deserialize, Serialize};

/// Body of `POST /signature_request/send_with_template`.
#[derive(Debug, Clone, Serialize)]
pub struct SendWithTemplateRequest {
    pub template_ids: Vec<String>,
    pub subject: String,
    pub message: String,
    pub signers: Vec<TemplateSigner>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ccs: Vec<TemplateCc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
    pub test_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSigner {
    pub role: String,
    pub name: String,
    pub email_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateCc {
    pub role: String,
    pub email_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureRequestResponse {
    pub signature_request: SignatureRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureRequest {
    pub signature_request_id: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub is_declined: bool,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

impl SignatureRequest {
    /// Find the signature slot bound to a template role.
    pub fn signature_by_role(&self, role: &str) -> Option<&Signature> {
        self.signatures
            .iter()
            .find(|s| s.signer_role.as_deref() == Some(role))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    pub signature_id: String,
    pub signer_email_address: String,
    pub signer_name: Option<String>,
    pub signer_role: Option<String>,
    pub status_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateResponse {
    pub template: Template,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub template_id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub signer_roles: Vec<TemplateRoleName>,
    #[serde(default)]
    pub cc_roles: Vec<TemplateRoleName>,
    #[serde(default)]
    pub custom_fields: Vec<TemplateCustomField>,
    #[serde(default)]
    pub documents: Vec<TemplateDocument>,
}

impl Template {
    /// Names of every custom field declared on the template or its documents,
    /// sorted and without duplicates.
    pub fn custom_field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .custom_fields
            .iter()
            .chain(self.documents.iter().flat_map(|d| d.custom_fields.iter()))
            .map(|f| f.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateRoleName {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateCustomField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDocument {
    #[serde(default)]
    pub custom_fields: Vec<TemplateCustomField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemindRequest {
    pub email_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateSignerRequest {
    pub signature_id: String,
    pub email_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilesDataUri {
    pub data_uri: String,
}

impl FilesDataUri {
    /// Base64 payload with the `data:<mime>;base64,` prefix removed.
    pub fn base64_payload(&self) -> &str {
        match self.data_uri.split_once(";base64,") {
            Some((_, payload)) => payload,
            None => &self.data_uri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_uri_prefix() {
        let files = FilesDataUri {
            data_uri: "data:application/pdf;base64,JVBERi0xLjQ=".into(),
        };
        assert_eq!(files.base64_payload(), "JVBERi0xLjQ=");
    }

    #[test]
    fn collects_custom_fields_from_documents() {
        let template: Template = serde_json::from_value(serde_json::json!({
            "template_id": "tpl",
            "signer_roles": [{"name": "hiring_authority"}],
            "documents": [
                {"custom_fields": [{"name": "company_name", "type": "text"}]},
                {"custom_fields": [{"name": "fee_percentage", "type": "text"}]}
            ]
        }))
        .unwrap();

        assert_eq!(
            template.custom_field_names(),
            vec!["company_name", "fee_percentage"]
        );
    }

    #[test]
    fn repeated_fields_across_documents_collapse() {
        let template: Template = serde_json::from_value(serde_json::json!({
            "template_id": "tpl",
            "custom_fields": [{"name": "company_name"}],
            "documents": [
                {"custom_fields": [{"name": "fee_percentage"}, {"name": "company_name"}]},
                {"custom_fields": [{"name": "fee_percentage"}]}
            ]
        }))
        .unwrap();

        assert_eq!(
            template.custom_field_names(),
            vec!["company_name", "fee_percentage"]
        );
    }
}
