//! Test harness wiring mock collaborators into the dispatcher.

use std::sync::Arc;

use server_core::domains::fee_agreements::models::{FeeAgreement, SignatureProvider};
use server_core::domains::fee_agreements::StatusEventDispatcher;
use server_core::kernel::test_dependencies::{
    sample_fee_agreement, MockEmailService, MockFeeAgreementRepository, MockNotificationService,
    MockSigningProvider,
};
use server_core::kernel::TestDependencies;

/// Initialize tracing once, respecting RUST_LOG.
/// Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct TestHarness {
    pub deps: TestDependencies,
    pub agreement: FeeAgreement,
    pub docusign: Arc<MockSigningProvider>,
}

impl TestHarness {
    /// Agreement on DocuSign, backed by a healthy mock DocuSign adapter.
    pub fn new() -> Self {
        Self::with_agreement(sample_fee_agreement())
    }

    pub fn with_agreement(agreement: FeeAgreement) -> Self {
        Self::build(agreement, MockSigningProvider::new(SignatureProvider::DocuSign), 0)
    }

    pub fn build(agreement: FeeAgreement, docusign: MockSigningProvider, signed_today: u64) -> Self {
        init_tracing();

        let docusign = Arc::new(docusign);
        let deps = TestDependencies::new()
            .mock_repository(
                MockFeeAgreementRepository::new()
                    .with_agreement(agreement.clone())
                    .with_signed_count(signed_today),
            )
            .with_signing_provider(docusign.clone());

        Self {
            deps,
            agreement,
            docusign,
        }
    }

    pub fn with_notifications(mut self, service: MockNotificationService) -> Self {
        self.deps = self.deps.mock_notifications(service);
        self
    }

    pub fn with_email(mut self, service: MockEmailService) -> Self {
        self.deps = self.deps.mock_email(service);
        self
    }

    pub fn dispatcher(&self) -> StatusEventDispatcher {
        StatusEventDispatcher::new(self.deps.to_deps())
    }
}
