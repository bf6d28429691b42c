use serde::{Deserialize, Serialize};

/// Envelope creation request built from a server-side template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDefinition {
    pub template_id: String,
    pub email_subject: String,
    /// "sent" to dispatch immediately, "created" to keep a draft.
    pub status: String,
    pub template_roles: Vec<TemplateRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_notification: Option<EventNotification>,
}

/// A named signer or cc slot inside a template, bound at send time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRole {
    pub role_name: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Tabs>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tabs {
    pub text_tabs: Vec<TextTab>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextTab {
    pub tab_label: String,
    pub value: String,
}

/// Per-envelope webhook (Connect) registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNotification {
    pub url: String,
    pub require_acknowledgment: String,
    #[serde(rename = "includeHMAC")]
    pub include_hmac: String,
    pub logging_enabled: String,
    pub envelope_events: Vec<EnvelopeEvent>,
}

impl EventNotification {
    /// Subscribe to the full envelope lifecycle.
    pub fn full_lifecycle(url: impl Into<String>) -> Self {
        let envelope_events = ["draft", "sent", "delivered", "completed", "declined", "voided"]
            .into_iter()
            .map(|code| EnvelopeEvent {
                envelope_event_status_code: code.to_string(),
            })
            .collect();

        Self {
            url: url.into(),
            require_acknowledgment: "true".to_string(),
            include_hmac: "true".to_string(),
            logging_enabled: "true".to_string(),
            envelope_events,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeEvent {
    pub envelope_event_status_code: String,
}

/// Response to envelope creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeSummary {
    pub envelope_id: String,
    pub status: Option<String>,
    pub status_date_time: Option<String>,
    pub uri: Option<String>,
}

/// Envelope as returned by `GET /envelopes/{id}?include=recipients`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub envelope_id: String,
    pub status: String,
    #[serde(default)]
    pub recipients: Option<Recipients>,
}

impl Envelope {
    /// Find the signer bound to a template role.
    pub fn signer_by_role(&self, role_name: &str) -> Option<&Signer> {
        self.recipients
            .as_ref()?
            .signers
            .iter()
            .find(|s| s.role_name.as_deref() == Some(role_name))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipients {
    #[serde(default)]
    pub signers: Vec<Signer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub carbon_copies: Vec<CarbonCopy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub recipient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCopy {
    pub recipient_id: String,
    #[serde(default)]
    pub role_name: Option<String>,
    pub name: String,
    pub email: String,
}

/// Envelope status change (used to void).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeUpdate {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_reason: Option<String>,
}

/// OAuth token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
