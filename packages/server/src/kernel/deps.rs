//! Server dependencies for the dispatcher and its side effects.
//!
//! All external collaborators sit behind traits so tests can swap in the
//! mocks from `test_dependencies`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::domains::fee_agreements::contract_manager::ContractManager;
use crate::domains::fee_agreements::notifications::NotificationSettings;
use crate::domains::fee_agreements::providers::{
    DocusignProvider, ExternalDocumentProvider, HelloSignProvider,
};
use crate::kernel::{
    BaseChatService, BaseEmailService, BaseFeeAgreementRepository, BaseNotificationService,
};

#[derive(Clone)]
pub struct ServerDeps {
    pub repository: Arc<dyn BaseFeeAgreementRepository>,
    pub notifications: Arc<dyn BaseNotificationService>,
    pub email: Arc<dyn BaseEmailService>,
    pub chat: Arc<dyn BaseChatService>,
    pub contracts: Arc<ContractManager>,
    pub settings: NotificationSettings,
}

impl ServerDeps {
    pub fn new(
        repository: Arc<dyn BaseFeeAgreementRepository>,
        notifications: Arc<dyn BaseNotificationService>,
        email: Arc<dyn BaseEmailService>,
        chat: Arc<dyn BaseChatService>,
        contracts: Arc<ContractManager>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            repository,
            notifications,
            email,
            chat,
            contracts,
            settings,
        }
    }
}

/// Wire the collaborators and the configured signing providers together.
pub fn build_server_deps(
    config: &Config,
    repository: Arc<dyn BaseFeeAgreementRepository>,
    notifications: Arc<dyn BaseNotificationService>,
    email: Arc<dyn BaseEmailService>,
    chat: Arc<dyn BaseChatService>,
) -> Result<ServerDeps> {
    let contracts = build_contract_manager(config)?;
    Ok(ServerDeps::new(
        repository,
        notifications,
        email,
        chat,
        Arc::new(contracts),
        config.notifications.clone(),
    ))
}

/// Build the contract manager from whichever providers are configured.
///
/// The external adapter is always registered; it needs no credentials.
pub fn build_contract_manager(config: &Config) -> Result<ContractManager> {
    let http_client = reqwest::Client::new();
    let mut manager = ContractManager::new()
        .with_provider(Arc::new(ExternalDocumentProvider::new(http_client)));

    if let Some(docusign) = &config.docusign {
        let client = docusign_client::DocusignClient::new(docusign.options.clone())
            .context("Failed to initialise DocuSign client")?;
        manager = manager.with_provider(Arc::new(DocusignProvider::new(
            client,
            docusign.settings.clone(),
        )));
    }

    if let Some(hellosign) = &config.hellosign {
        let client = hellosign_client::HelloSignClient::new(hellosign.api_key.clone());
        manager = manager.with_provider(Arc::new(HelloSignProvider::new(
            client,
            hellosign.settings.clone(),
        )));
    }

    info!(providers = ?manager.registered(), "Signing providers registered");
    Ok(manager)
}
