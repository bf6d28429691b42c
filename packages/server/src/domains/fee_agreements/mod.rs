//! Fee agreement signing: provider adapters, the contract manager, webhook
//! verification and the status event dispatcher.

pub mod contract_manager;
pub mod dispatcher;
pub mod effects;
pub mod events;
pub mod models;
pub mod notifications;
pub mod providers;
pub mod recipients;
pub mod templates;
pub mod webhook;

pub use contract_manager::{ContractManager, PROVIDER_PREFERENCE};
pub use dispatcher::{
    handler_for, DispatchFailure, DispatchReport, DispatchStage, StatusEventDispatcher,
    TransitionHandler,
};
pub use events::FeeAgreementEvent;
pub use models::*;
pub use providers::{BaseSigningProvider, SigningError, SigningResult};
pub use templates::{resolve_template, TemplateTable};
