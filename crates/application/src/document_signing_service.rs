use std::sync::Arc;

use proptrack_core::{AppError, AppResult, RecordId};
use proptrack_domain::{AuditTrail, ComplianceEvent, render_certificate};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{AuditTrailRepository, DocumentDelivery, DocumentDeliveryService};

/// Application service for document signing workflows.
///
/// Each call loads the stored trail, applies one audit operation and writes
/// the result back. Ordering concurrent writers for the same document is the
/// repository's concern.
#[derive(Clone)]
pub struct DocumentSigningService {
    trail_repository: Arc<dyn AuditTrailRepository>,
    delivery_service: Arc<dyn DocumentDeliveryService>,
}

impl DocumentSigningService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        trail_repository: Arc<dyn AuditTrailRepository>,
        delivery_service: Arc<dyn DocumentDeliveryService>,
    ) -> Self {
        Self {
            trail_repository,
            delivery_service,
        }
    }

    /// Starts and stores a new trail for a document.
    pub async fn start_trail(&self, document_id: RecordId) -> AppResult<AuditTrail> {
        if self
            .trail_repository
            .find_trail(&document_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "audit trail for document '{document_id}' already exists"
            )));
        }

        let trail = AuditTrail::new(document_id);
        self.trail_repository.save_trail(&trail).await?;

        info!(document_id = %trail.document_id(), "audit trail started");
        Ok(trail)
    }

    /// Returns the stored trail for a document.
    pub async fn trail(&self, document_id: &RecordId) -> AppResult<AuditTrail> {
        self.trail_repository
            .find_trail(document_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("audit trail for document '{document_id}'"))
            })
    }

    /// Registers a signer on the document.
    pub async fn add_signer(
        &self,
        document_id: &RecordId,
        signer_id: RecordId,
        name: &str,
        email: &str,
    ) -> AppResult<AuditTrail> {
        let trail = self.trail(document_id).await?;
        warn_if_completed(&trail, "add_signer");
        if trail.signer(&signer_id).is_some() {
            warn!(
                document_id = %document_id,
                signer_id = %signer_id,
                "registering a signer id that is already present"
            );
        }

        let trail = trail.add_signer(signer_id, name, email);
        self.store(trail).await
    }

    /// Appends a free-form action to the document's trail.
    pub async fn record_action(
        &self,
        document_id: &RecordId,
        action: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
        details: Option<Map<String, Value>>,
    ) -> AppResult<AuditTrail> {
        let trail = self.trail(document_id).await?.record_action(
            action,
            ip_address,
            user_agent,
            details,
        );
        self.store(trail).await
    }

    /// Records that a recipient opened the document.
    pub async fn record_view(
        &self,
        document_id: &RecordId,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<AuditTrail> {
        self.record_action(
            document_id,
            ComplianceEvent::DocumentViewed.as_str(),
            ip_address,
            user_agent,
            None,
        )
        .await
    }

    /// Records signer consent; unknown signers still leave an action entry.
    pub async fn record_consent(
        &self,
        document_id: &RecordId,
        signer_id: &RecordId,
        ip_address: Option<String>,
        verification_method: Option<String>,
    ) -> AppResult<AuditTrail> {
        let trail = self.trail(document_id).await?;
        warn_if_completed(&trail, "consent");
        warn_unknown_signer(&trail, signer_id, "consent");

        let trail = trail.record_consent(signer_id, ip_address, verification_method);
        self.store(trail).await
    }

    /// Records a signature; unknown signers still leave an action entry.
    pub async fn record_signature(
        &self,
        document_id: &RecordId,
        signer_id: &RecordId,
        ip_address: Option<String>,
        details: Option<Map<String, Value>>,
    ) -> AppResult<AuditTrail> {
        let trail = self.trail(document_id).await?;
        warn_if_completed(&trail, "signature");
        warn_unknown_signer(&trail, signer_id, "signature");

        let trail = trail.record_signature(signer_id, ip_address, details);
        self.store(trail).await
    }

    /// Marks the document complete.
    pub async fn complete(&self, document_id: &RecordId) -> AppResult<AuditTrail> {
        let trail = self.trail(document_id).await?;
        if let Some(completed_at) = trail.completion_time() {
            warn!(
                document_id = %document_id,
                completed_at = %completed_at,
                "completing an already completed trail overwrites its completion time"
            );
        }

        let trail = trail.complete();
        self.store(trail).await
    }

    /// Delivers the document and records a `document_sent` action.
    ///
    /// Nothing is recorded when delivery fails.
    pub async fn send_document(&self, delivery: DocumentDelivery) -> AppResult<AuditTrail> {
        if delivery.recipient.trim().is_empty() {
            return Err(AppError::Validation(
                "delivery recipient must not be empty".to_owned(),
            ));
        }

        let trail = self.trail(&delivery.document_id).await?;
        self.delivery_service.deliver(&delivery).await?;

        let mut details = Map::new();
        details.insert(
            "method".to_owned(),
            Value::String(delivery.method.as_str().to_owned()),
        );
        details.insert(
            "recipient".to_owned(),
            Value::String(delivery.recipient.clone()),
        );

        info!(
            document_id = %delivery.document_id,
            method = delivery.method.as_str(),
            "document delivered"
        );

        let trail = trail.record_action(
            ComplianceEvent::DocumentSent.as_str(),
            None,
            None,
            Some(details),
        );
        self.store(trail).await
    }

    /// Renders the certificate of completion for a document.
    pub async fn certificate(
        &self,
        document_id: &RecordId,
        document_title: &str,
    ) -> AppResult<String> {
        let trail = self.trail(document_id).await?;
        Ok(render_certificate(&trail, document_title))
    }

    async fn store(&self, trail: AuditTrail) -> AppResult<AuditTrail> {
        self.trail_repository.save_trail(&trail).await?;

        info!(
            document_id = %trail.document_id(),
            action_count = trail.actions().len(),
            signer_count = trail.signers().len(),
            "audit trail saved"
        );

        Ok(trail)
    }
}

fn warn_if_completed(trail: &AuditTrail, event: &str) {
    if let Some(completed_at) = trail.completion_time() {
        warn!(
            document_id = %trail.document_id(),
            completed_at = %completed_at,
            event = event,
            "changing signer state on a completed trail"
        );
    }
}

fn warn_unknown_signer(trail: &AuditTrail, signer_id: &RecordId, event: &str) {
    if trail.signer(signer_id).is_none() {
        warn!(
            document_id = %trail.document_id(),
            signer_id = %signer_id,
            event = event,
            "signer not registered; recording the attempt only"
        );
    }
}

#[cfg(test)]
mod tests;
