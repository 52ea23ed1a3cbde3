use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use proptrack_core::{AppError, AppResult, RecordId};
use proptrack_domain::{AuditTrail, DeliveryMethod};
use tokio::sync::Mutex;

use crate::{AuditTrailRepository, DocumentDelivery, DocumentDeliveryService};

use super::DocumentSigningService;

#[derive(Default)]
struct FakeAuditTrailRepository {
    trails: Mutex<HashMap<RecordId, AuditTrail>>,
}

#[async_trait]
impl AuditTrailRepository for FakeAuditTrailRepository {
    async fn find_trail(&self, document_id: &RecordId) -> AppResult<Option<AuditTrail>> {
        Ok(self.trails.lock().await.get(document_id).cloned())
    }

    async fn save_trail(&self, trail: &AuditTrail) -> AppResult<()> {
        self.trails
            .lock()
            .await
            .insert(trail.document_id().clone(), trail.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeDeliveryService {
    deliveries: Mutex<Vec<DocumentDelivery>>,
    fail: bool,
}

#[async_trait]
impl DocumentDeliveryService for FakeDeliveryService {
    async fn deliver(&self, delivery: &DocumentDelivery) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("gateway unavailable".to_owned()));
        }
        self.deliveries.lock().await.push(delivery.clone());
        Ok(())
    }
}

fn build_service(
    delivery_service: Arc<FakeDeliveryService>,
) -> (DocumentSigningService, Arc<FakeAuditTrailRepository>) {
    let repository = Arc::new(FakeAuditTrailRepository::default());
    let service = DocumentSigningService::new(repository.clone(), delivery_service);
    (service, repository)
}

fn action_tags(trail: &AuditTrail) -> Vec<String> {
    trail
        .actions()
        .iter()
        .map(|action| action.action().to_owned())
        .collect()
}

#[tokio::test]
async fn signing_workflow_is_persisted_step_by_step() {
    let (service, repository) = build_service(Arc::new(FakeDeliveryService::default()));
    let document_id = RecordId::from("doc-1");
    let signer_id = RecordId::from("s1");

    assert!(service.start_trail(document_id.clone()).await.is_ok());
    assert!(
        service
            .add_signer(&document_id, signer_id.clone(), "Jane Doe", "jane@example.com")
            .await
            .is_ok()
    );
    assert!(
        service
            .record_consent(&document_id, &signer_id, Some("10.0.0.1".to_owned()), None)
            .await
            .is_ok()
    );
    assert!(
        service
            .record_signature(&document_id, &signer_id, Some("10.0.0.1".to_owned()), None)
            .await
            .is_ok()
    );
    assert!(service.complete(&document_id).await.is_ok());

    let stored = repository.trails.lock().await.get(&document_id).cloned();
    let Some(stored) = stored else {
        panic!("trail should be stored");
    };
    assert!(stored.is_completed());
    assert!(stored.all_signed());
    assert_eq!(
        action_tags(&stored),
        vec![
            "consent_recorded".to_owned(),
            "signature_recorded".to_owned(),
            "document_completed".to_owned(),
        ]
    );
}

#[tokio::test]
async fn starting_twice_conflicts() {
    let (service, _) = build_service(Arc::new(FakeDeliveryService::default()));
    let document_id = RecordId::Number(12);

    assert!(service.start_trail(document_id.clone()).await.is_ok());
    let second = service.start_trail(document_id).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn operations_on_missing_trail_are_not_found() {
    let (service, _) = build_service(Arc::new(FakeDeliveryService::default()));
    let document_id = RecordId::from("missing");

    let consent = service
        .record_consent(&document_id, &RecordId::from("s1"), None, None)
        .await;
    let certificate = service.certificate(&document_id, "Lease").await;

    assert!(matches!(consent, Err(AppError::NotFound(_))));
    assert!(matches!(certificate, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn consent_for_unknown_signer_is_still_recorded() {
    let (service, _) = build_service(Arc::new(FakeDeliveryService::default()));
    let document_id = RecordId::from("doc-2");
    assert!(service.start_trail(document_id.clone()).await.is_ok());

    let trail = service
        .record_consent(&document_id, &RecordId::from("ghost"), None, None)
        .await;

    let Ok(trail) = trail else {
        panic!("consent should be recorded");
    };
    assert!(trail.signers().is_empty());
    assert_eq!(action_tags(&trail), vec!["consent_recorded".to_owned()]);
}

#[tokio::test]
async fn signature_for_unknown_signer_still_logs_attempt() {
    let (service, repository) = build_service(Arc::new(FakeDeliveryService::default()));
    let document_id = RecordId::from("doc-4");
    assert!(service.start_trail(document_id.clone()).await.is_ok());
    assert!(
        service
            .add_signer(&document_id, RecordId::from("s1"), "Jane Doe", "jane@example.com")
            .await
            .is_ok()
    );

    let trail = service
        .record_signature(&document_id, &RecordId::from("ghost"), None, None)
        .await;

    let Ok(trail) = trail else {
        panic!("signature attempt should be recorded");
    };
    assert_eq!(trail.signers().len(), 1);
    assert!(!trail.all_signed());
    assert_eq!(action_tags(&trail), vec!["signature_recorded".to_owned()]);

    let stored = repository.trails.lock().await.get(&document_id).cloned();
    assert_eq!(stored.as_ref(), Some(&trail));
}

#[tokio::test]
async fn completed_trail_still_accepts_signer_changes() {
    let (service, _) = build_service(Arc::new(FakeDeliveryService::default()));
    let document_id = RecordId::Number(21);
    let signer_id = RecordId::from("late");
    assert!(service.start_trail(document_id.clone()).await.is_ok());

    let completed = service.complete(&document_id).await;
    let Ok(completed) = completed else {
        panic!("trail should complete");
    };
    assert!(
        service
            .add_signer(&document_id, signer_id.clone(), "Late Signer", "late@example.com")
            .await
            .is_ok()
    );
    let signed = service
        .record_signature(&document_id, &signer_id, None, None)
        .await;

    let Ok(signed) = signed else {
        panic!("signature should be recorded after completion");
    };
    assert_eq!(signed.completion_time(), completed.completion_time());
    assert!(signed.all_signed());
    assert_eq!(
        action_tags(&signed),
        vec![
            "document_completed".to_owned(),
            "signature_recorded".to_owned(),
        ]
    );
}

#[tokio::test]
async fn send_document_delivers_then_records_action() {
    let delivery_service = Arc::new(FakeDeliveryService::default());
    let (service, _) = build_service(delivery_service.clone());
    let document_id = RecordId::from("doc-3");
    assert!(service.start_trail(document_id.clone()).await.is_ok());

    let trail = service
        .send_document(DocumentDelivery {
            document_id: document_id.clone(),
            method: DeliveryMethod::Sms,
            recipient: "+15550100".to_owned(),
            message: "Please sign your lease".to_owned(),
        })
        .await;

    let Ok(trail) = trail else {
        panic!("document should be sent");
    };
    assert_eq!(delivery_service.deliveries.lock().await.len(), 1);
    assert_eq!(action_tags(&trail), vec!["document_sent".to_owned()]);
    let details = trail.actions()[0].details();
    assert_eq!(
        details.and_then(|map| map.get("method")),
        Some(&serde_json::Value::String("sms".to_owned()))
    );
}

#[tokio::test]
async fn failed_delivery_records_nothing() {
    let delivery_service = Arc::new(FakeDeliveryService {
        deliveries: Mutex::new(Vec::new()),
        fail: true,
    });
    let (service, repository) = build_service(delivery_service);
    let document_id = RecordId::from("doc-4");
    assert!(service.start_trail(document_id.clone()).await.is_ok());

    let result = service
        .send_document(DocumentDelivery {
            document_id: document_id.clone(),
            method: DeliveryMethod::Email,
            recipient: "tenant@example.com".to_owned(),
            message: String::new(),
        })
        .await;

    assert!(result.is_err());
    let stored = repository.trails.lock().await.get(&document_id).cloned();
    assert!(matches!(stored, Some(trail) if trail.actions().is_empty()));
}

#[tokio::test]
async fn blank_recipient_is_rejected() {
    let (service, _) = build_service(Arc::new(FakeDeliveryService::default()));
    let document_id = RecordId::from("doc-5");
    assert!(service.start_trail(document_id.clone()).await.is_ok());

    let result = service
        .send_document(DocumentDelivery {
            document_id,
            method: DeliveryMethod::WhatsApp,
            recipient: "  ".to_owned(),
            message: "hi".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn certificate_reports_open_trail() {
    let (service, _) = build_service(Arc::new(FakeDeliveryService::default()));
    let document_id = RecordId::from("doc-6");
    assert!(service.start_trail(document_id.clone()).await.is_ok());
    assert!(service.record_view(&document_id, None, None).await.is_ok());

    let certificate = service.certificate(&document_id, "Move-in Checklist").await;

    let Ok(certificate) = certificate else {
        panic!("certificate should render");
    };
    assert!(certificate.contains("Document ID: doc-6"));
    assert!(certificate.contains("Not completed"));
    assert!(certificate.contains("- document_viewed"));
}
