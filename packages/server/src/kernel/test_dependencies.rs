// TestDependencies - mock implementations for testing
//
// Provides mock collaborators and signing providers that can be assembled
// into ServerDeps for dispatcher, contract manager and webhook tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

use super::{
    BaseChatService, BaseEmailService, BaseFeeAgreementRepository, BaseNotificationService,
    BaseSignatureEventSink, ChatMessage, ServerDeps, TemplatedEmail,
};
use crate::common::{CompanyId, FeeAgreementId, HiringAuthorityId, UserId};
use crate::domains::fee_agreements::contract_manager::ContractManager;
use crate::domains::fee_agreements::models::{
    Company, FeeAgreement, FeeAgreementStatus, HiringAuthority, PaymentScheme, SignatureProvider,
    SignerRole, StaffMember,
};
use crate::domains::fee_agreements::notifications::{
    EmailTemplates, NotificationPayload, NotificationSettings,
};
use crate::domains::fee_agreements::providers::{
    BaseSigningProvider, ContractSentDetails, SigningError, SigningResult,
};
use crate::domains::fee_agreements::webhook::SignatureWebhookEvent;

// =============================================================================
// Fixtures
// =============================================================================

fn staff(name: &str, email: &str) -> StaffMember {
    StaffMember {
        user_id: UserId::new(),
        full_name: name.to_string(),
        email: email.to_string(),
    }
}

/// Agreement sent through DocuSign and waiting on the hiring authority.
pub fn sample_fee_agreement() -> FeeAgreement {
    FeeAgreement {
        id: FeeAgreementId::new(),
        company: Company {
            id: CompanyId::new(),
            name: "Acme Industrial".to_string(),
        },
        hiring_authority: HiringAuthority {
            id: HiringAuthorityId::new(),
            full_name: "Dana Whitfield".to_string(),
            title: Some("VP Engineering".to_string()),
            work_email: "dana@acme.test".to_string(),
        },
        creator: staff("Riley Chen", "riley@recruit.test"),
        coach: Some(staff("Morgan Ortiz", "morgan@recruit.test")),
        regional_director: Some(staff("Sam Patel", "sam@recruit.test")),
        production_director: staff("Jordan Lee", "jordan@recruit.test"),
        payment_scheme: PaymentScheme::Standard,
        fee_percentage: Some(Decimal::new(25, 0)),
        flat_fee_amount: None,
        guarantee_days: Some(90),
        status: FeeAgreementStatus::PendingHiringAuthoritySignature,
        signature_provider: Some(SignatureProvider::DocuSign),
        contract_id: Some("env-123".to_string()),
        cc_emails: vec!["billing@acme.test".to_string()],
        signed_date: None,
        pdf_url: None,
        specialty: Some("Engineering".to_string()),
        event_logs: Vec::new(),
    }
}

pub fn sample_settings() -> NotificationSettings {
    NotificationSettings {
        app_base_url: "https://crm.example.com".to_string(),
        internal_copy_email: "contracts@recruit.test".to_string(),
        operations_email: "operations@recruit.test".to_string(),
        operations_user_ids: vec![UserId::new()],
        signed_chat_channel: "#signed-deals".to_string(),
        email_templates: EmailTemplates {
            hiring_authority_thank_you: "tpl-thank-you".to_string(),
            validation_request: "tpl-validation".to_string(),
            internal_signed_copy: "tpl-signed-copy".to_string(),
        },
    }
}

// =============================================================================
// Mock Signing Provider
// =============================================================================

/// Records every call; can be told to fail all of them.
pub struct MockSigningProvider {
    provider: SignatureProvider,
    fail: bool,
    contract_id: String,
    files: String,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockSigningProvider {
    pub fn new(provider: SignatureProvider) -> Self {
        Self {
            provider,
            fail: false,
            contract_id: format!("{}-contract", provider),
            files: "JVBERi0xLjQ=".to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn with_files(mut self, base64: &str) -> Self {
        self.files = base64.to_string();
        self
    }

    /// Operation names in call order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) -> SigningResult<()> {
        self.calls.lock().unwrap().push(operation);
        if self.fail {
            Err(SigningError::provider(
                self.provider,
                std::io::Error::new(std::io::ErrorKind::Other, format!("mock {} failure", operation)),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BaseSigningProvider for MockSigningProvider {
    fn provider(&self) -> SignatureProvider {
        self.provider
    }

    async fn send_contract(&self, _agreement: &FeeAgreement) -> SigningResult<ContractSentDetails> {
        self.record("send_contract")?;
        Ok(ContractSentDetails {
            provider: self.provider,
            contract_id: self.contract_id.clone(),
        })
    }

    async fn void_contract(&self, _agreement: &FeeAgreement, _reason: &str) -> SigningResult<()> {
        self.record("void_contract")
    }

    async fn send_reminder(&self, _agreement: &FeeAgreement) -> SigningResult<()> {
        self.record("send_reminder")
    }

    async fn get_signature_email_by_signer_role(
        &self,
        agreement: &FeeAgreement,
        role: SignerRole,
    ) -> SigningResult<Option<String>> {
        self.record("get_signature_email_by_signer_role")?;
        Ok(Some(match role {
            SignerRole::HiringAuthority => agreement.hiring_authority.work_email.clone(),
            SignerRole::ProductionDirector => agreement.production_director.email.clone(),
        }))
    }

    async fn update_hiring_authority_signer_email(
        &self,
        _agreement: &FeeAgreement,
        _email: &str,
    ) -> SigningResult<()> {
        self.record("update_hiring_authority_signer_email")
    }

    async fn get_files_in_base64(&self, _agreement: &FeeAgreement) -> SigningResult<String> {
        self.record("get_files_in_base64")?;
        Ok(self.files.clone())
    }

    async fn check_if_contract_exists(&self, _agreement: &FeeAgreement) -> SigningResult<bool> {
        self.record("check_if_contract_exists")?;
        Ok(true)
    }
}

// =============================================================================
// Mock Repository
// =============================================================================

pub struct MockFeeAgreementRepository {
    agreement: Mutex<Option<FeeAgreement>>,
    signed_today: u64,
    load_calls: Arc<Mutex<Vec<FeeAgreementId>>>,
    count_calls: Arc<Mutex<Vec<DateTime<Utc>>>>,
}

impl MockFeeAgreementRepository {
    pub fn new() -> Self {
        Self {
            agreement: Mutex::new(None),
            signed_today: 0,
            load_calls: Arc::new(Mutex::new(Vec::new())),
            count_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_agreement(self, agreement: FeeAgreement) -> Self {
        *self.agreement.lock().unwrap() = Some(agreement);
        self
    }

    pub fn with_signed_count(mut self, count: u64) -> Self {
        self.signed_today = count;
        self
    }

    pub fn load_calls(&self) -> Vec<FeeAgreementId> {
        self.load_calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self) -> Vec<DateTime<Utc>> {
        self.count_calls.lock().unwrap().clone()
    }
}

impl Default for MockFeeAgreementRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseFeeAgreementRepository for MockFeeAgreementRepository {
    async fn load_with_relations(&self, id: FeeAgreementId) -> Result<FeeAgreement> {
        self.load_calls.lock().unwrap().push(id);
        self.agreement
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("fee agreement {} not found", id))
    }

    async fn count_signed_since(&self, since: DateTime<Utc>) -> Result<u64> {
        self.count_calls.lock().unwrap().push(since);
        Ok(self.signed_today)
    }
}

// =============================================================================
// Mock Notification Service
// =============================================================================

pub struct MockNotificationService {
    fail: bool,
    sent: Arc<Mutex<Vec<NotificationPayload>>>,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self {
            fail: false,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockNotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotificationService for MockNotificationService {
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        if self.fail {
            return Err(anyhow!("push gateway unavailable"));
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

// =============================================================================
// Mock Email Service
// =============================================================================

pub struct MockEmailService {
    fail: bool,
    sent: Arc<Mutex<Vec<TemplatedEmail>>>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self {
            fail: false,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn sent(&self) -> Vec<TemplatedEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseEmailService for MockEmailService {
    async fn send_templated(&self, email: &TemplatedEmail) -> Result<()> {
        if self.fail {
            return Err(anyhow!("email provider rejected {}", email.template_id));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// =============================================================================
// Mock Chat Service
// =============================================================================

pub struct MockChatService {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl MockChatService {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl Default for MockChatService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseChatService for MockChatService {
    async fn post_message(&self, message: &ChatMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// =============================================================================
// Mock Signature Event Sink
// =============================================================================

pub struct MockSignatureEventSink {
    fail: bool,
    events: Arc<Mutex<Vec<SignatureWebhookEvent>>>,
}

impl MockSignatureEventSink {
    pub fn new() -> Self {
        Self {
            fail: false,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn events(&self) -> Vec<SignatureWebhookEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Default for MockSignatureEventSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSignatureEventSink for MockSignatureEventSink {
    async fn publish(&self, event: &SignatureWebhookEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(anyhow!("upstream rejected event"));
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Mock collaborators bundled for building ServerDeps.
pub struct TestDependencies {
    pub repository: Arc<MockFeeAgreementRepository>,
    pub notifications: Arc<MockNotificationService>,
    pub email: Arc<MockEmailService>,
    pub chat: Arc<MockChatService>,
    pub contracts: ContractManager,
    pub settings: NotificationSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            repository: Arc::new(MockFeeAgreementRepository::new()),
            notifications: Arc::new(MockNotificationService::new()),
            email: Arc::new(MockEmailService::new()),
            chat: Arc::new(MockChatService::new()),
            contracts: ContractManager::new(),
            settings: sample_settings(),
        }
    }

    /// Set a mock repository
    pub fn mock_repository(mut self, repository: MockFeeAgreementRepository) -> Self {
        self.repository = Arc::new(repository);
        self
    }

    /// Set a mock push notification service
    pub fn mock_notifications(mut self, service: MockNotificationService) -> Self {
        self.notifications = Arc::new(service);
        self
    }

    /// Set a mock email service
    pub fn mock_email(mut self, service: MockEmailService) -> Self {
        self.email = Arc::new(service);
        self
    }

    /// Register a signing provider
    pub fn with_signing_provider(mut self, provider: Arc<dyn BaseSigningProvider>) -> Self {
        self.contracts = self.contracts.with_provider(provider);
        self
    }

    /// Convert into ServerDeps; the mocks stay inspectable through `self`.
    pub fn to_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.repository.clone(),
            self.notifications.clone(),
            self.email.clone(),
            self.chat.clone(),
            Arc::new(self.contracts.clone()),
            self.settings.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
