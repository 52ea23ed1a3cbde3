use async_trait::async_trait;

use proptrack_core::{AppResult, RecordId};
use proptrack_domain::{AuditTrail, DeliveryMethod};

/// Repository port for audit trails keyed by document id.
#[async_trait]
pub trait AuditTrailRepository: Send + Sync {
    /// Finds the trail stored for a document.
    async fn find_trail(&self, document_id: &RecordId) -> AppResult<Option<AuditTrail>>;

    /// Inserts or replaces the trail for its document.
    async fn save_trail(&self, trail: &AuditTrail) -> AppResult<()>;
}

/// Request to deliver a document to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDelivery {
    /// Document being delivered.
    pub document_id: RecordId,
    /// Delivery channel.
    pub method: DeliveryMethod,
    /// Email address or phone number, depending on the channel.
    pub recipient: String,
    /// Message sent alongside the document link.
    pub message: String,
}

/// Port for delivering documents over email, SMS or WhatsApp.
#[async_trait]
pub trait DocumentDeliveryService: Send + Sync {
    /// Delivers the document to the recipient.
    async fn deliver(&self, delivery: &DocumentDelivery) -> AppResult<()>;
}
