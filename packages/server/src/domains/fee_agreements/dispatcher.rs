//! Status event dispatcher.
//!
//! A fixed transition table maps each [`FeeAgreementEvent`] to the
//! notification payloads it produces and the additional work that follows.
//! Nothing here ever fails the caller: every step runs in its own failure
//! boundary and ends up in the returned [`DispatchReport`].

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use super::effects::{
    AdditionalWork, PostDailySignedCount, RemindPendingSigner, SendHiringAuthorityThankYou,
    SendInternalSignedCopy, SendValidationRequestEmails, WorkContext,
};
use super::events::FeeAgreementEvent;
use super::models::FeeAgreement;
use super::notifications::{build_payloads, NamedPayload, NotificationSettings};
use crate::common::FeeAgreementId;
use crate::kernel::ServerDeps;

pub type PayloadBuilder =
    fn(&FeeAgreementEvent, &FeeAgreement, &NotificationSettings) -> Vec<NamedPayload>;

/// What happens after a transition.
#[derive(Clone)]
pub struct TransitionHandler {
    pub payloads: PayloadBuilder,
    pub additional_work: Vec<Arc<dyn AdditionalWork>>,
}

impl TransitionHandler {
    fn notify_only() -> Self {
        Self {
            payloads: build_payloads,
            additional_work: Vec::new(),
        }
    }

    fn then(mut self, work: impl AdditionalWork + 'static) -> Self {
        self.additional_work.push(Arc::new(work));
        self
    }
}

/// The transition table.
pub fn handler_for(event: &FeeAgreementEvent) -> TransitionHandler {
    let handler = TransitionHandler::notify_only();

    match event {
        FeeAgreementEvent::CreatedStandard | FeeAgreementEvent::ValidatedAndSentToSign => {
            handler.then(SendHiringAuthorityThankYou)
        }
        FeeAgreementEvent::CreatedNonStandard | FeeAgreementEvent::ValidatedByCoach => {
            handler.then(SendValidationRequestEmails)
        }
        FeeAgreementEvent::SignedByHiringAuthority | FeeAgreementEvent::AboutToExpire { .. } => {
            handler.then(RemindPendingSigner)
        }
        FeeAgreementEvent::SignedByProductionDirector => handler
            .then(SendInternalSignedCopy)
            .then(PostDailySignedCount),
        FeeAgreementEvent::DeclinedByCoach { .. }
        | FeeAgreementEvent::DeclinedByOperations { .. }
        | FeeAgreementEvent::UpdateRequested { .. }
        | FeeAgreementEvent::Voided { .. }
        | FeeAgreementEvent::Expired => handler,
    }
}

// =============================================================================
// Report
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStage {
    LoadAgreement,
    Notification,
    ReloadAgreement,
    AdditionalWork,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    pub stage: DispatchStage,
    pub name: String,
    pub error: String,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub event: &'static str,
    pub notifications_sent: Vec<&'static str>,
    pub work_completed: Vec<&'static str>,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    fn new(event: &FeeAgreementEvent) -> Self {
        Self {
            event: event.name(),
            notifications_sent: Vec::new(),
            work_completed: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, stage: DispatchStage, name: impl Into<String>, err: &anyhow::Error) {
        self.failures.push(DispatchFailure {
            stage,
            name: name.into(),
            error: format!("{:#}", err),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

pub struct StatusEventDispatcher {
    deps: ServerDeps,
}

impl StatusEventDispatcher {
    pub fn new(deps: ServerDeps) -> Self {
        Self { deps }
    }

    /// Run the table entry for `event`.
    pub async fn dispatch(&self, id: FeeAgreementId, event: FeeAgreementEvent) -> DispatchReport {
        let handler = handler_for(&event);
        self.dispatch_with(id, &event, &handler).await
    }

    /// Run an explicit handler. Used by callers that need a custom table.
    pub async fn dispatch_with(
        &self,
        id: FeeAgreementId,
        event: &FeeAgreementEvent,
        handler: &TransitionHandler,
    ) -> DispatchReport {
        let mut report = DispatchReport::new(event);
        info!(fee_agreement_id = %id, event = event.name(), "Dispatching fee agreement event");

        let agreement = match self.deps.repository.load_with_relations(id).await {
            Ok(agreement) => agreement,
            Err(e) => {
                error!(fee_agreement_id = %id, error = %e, "Failed to load fee agreement");
                report.fail(DispatchStage::LoadAgreement, "load_with_relations", &e);
                return report;
            }
        };

        let payloads: Vec<_> = (handler.payloads)(event, &agreement, &self.deps.settings)
            .into_iter()
            .filter_map(|(name, payload)| payload.map(|p| (name, p)))
            .collect();

        let results = join_all(
            payloads
                .iter()
                .map(|(_, payload)| self.deps.notifications.send(payload)),
        )
        .await;

        for ((name, _), result) in payloads.iter().zip(results) {
            match result {
                Ok(()) => report.notifications_sent.push(*name),
                Err(e) => {
                    warn!(fee_agreement_id = %id, notification = *name, error = %e, "Notification failed");
                    report.fail(DispatchStage::Notification, *name, &e);
                }
            }
        }

        if handler.additional_work.is_empty() {
            return report;
        }

        // Notifications may have changed the aggregate (event logs, status).
        let agreement = match self.deps.repository.load_with_relations(id).await {
            Ok(agreement) => agreement,
            Err(e) => {
                error!(fee_agreement_id = %id, error = %e, "Failed to reload fee agreement");
                report.fail(DispatchStage::ReloadAgreement, "load_with_relations", &e);
                return report;
            }
        };

        let sent = report.notifications_sent.clone();
        let ctx = WorkContext {
            deps: &self.deps,
            event,
            agreement: &agreement,
            payloads: &payloads,
            sent: &sent,
        };

        for work in &handler.additional_work {
            match work.run(&ctx).await {
                Ok(()) => report.work_completed.push(work.name()),
                Err(e) => {
                    error!(
                        fee_agreement_id = %id,
                        work = work.name(),
                        error = %format!("{:#}", e),
                        "Additional work failed"
                    );
                    report.fail(DispatchStage::AdditionalWork, work.name(), &e);
                }
            }
        }

        info!(
            fee_agreement_id = %id,
            event = event.name(),
            notifications = report.notifications_sent.len(),
            failures = report.failures.len(),
            "Fee agreement event dispatched"
        );

        report
    }
}
