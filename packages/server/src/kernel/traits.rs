// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - the collaborators the fee-agreement
// core talks to but does not own. Business logic lives in domain functions
// that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseEmailService)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::FeeAgreementId;
use crate::domains::fee_agreements::models::FeeAgreement;
use crate::domains::fee_agreements::notifications::NotificationPayload;
use crate::domains::fee_agreements::webhook::SignatureWebhookEvent;

// =============================================================================
// Fee Agreement Repository (read-only access to the CRM aggregate)
// =============================================================================

#[async_trait]
pub trait BaseFeeAgreementRepository: Send + Sync {
    /// Load an agreement with company, hiring authority, staff and event logs.
    async fn load_with_relations(&self, id: FeeAgreementId) -> Result<FeeAgreement>;

    /// Number of agreements that reached fully signed since `since`.
    async fn count_signed_since(&self, since: DateTime<Utc>) -> Result<u64>;
}

// =============================================================================
// Push Notification Trait
// =============================================================================

#[async_trait]
pub trait BaseNotificationService: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> Result<()>;
}

// =============================================================================
// Transactional Email Trait
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecipient {
    pub email: String,
    pub name: Option<String>,
}

impl EmailRecipient {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    /// Base64 encoded file contents.
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatedEmail {
    pub template_id: String,
    pub to: Vec<EmailRecipient>,
    pub data: serde_json::Value,
    #[serde(default)]
    pub attachments: Vec<EmailAttachment>,
}

#[async_trait]
pub trait BaseEmailService: Send + Sync {
    async fn send_templated(&self, email: &TemplatedEmail) -> Result<()>;
}

// =============================================================================
// Team Chat Trait
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel: String,
    pub text: String,
}

#[async_trait]
pub trait BaseChatService: Send + Sync {
    async fn post_message(&self, message: &ChatMessage) -> Result<()>;
}

// =============================================================================
// Signature Event Sink (verified provider callbacks -> upstream)
// =============================================================================

#[async_trait]
pub trait BaseSignatureEventSink: Send + Sync {
    async fn publish(&self, event: &SignatureWebhookEvent) -> Result<()>;
}
