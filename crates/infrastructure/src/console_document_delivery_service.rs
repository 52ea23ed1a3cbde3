//! Console document delivery for development. Logs deliveries to tracing output.

use async_trait::async_trait;
use proptrack_application::{DocumentDelivery, DocumentDeliveryService};
use proptrack_core::AppResult;
use tracing::info;

/// Development delivery service that logs documents to the console.
#[derive(Clone)]
pub struct ConsoleDocumentDeliveryService;

impl ConsoleDocumentDeliveryService {
    /// Creates a new console delivery service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleDocumentDeliveryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentDeliveryService for ConsoleDocumentDeliveryService {
    async fn deliver(&self, delivery: &DocumentDelivery) -> AppResult<()> {
        info!(
            document_id = %delivery.document_id,
            method = delivery.method.as_str(),
            recipient = delivery.recipient.as_str(),
            "--- DOCUMENT ({}) ---\nTo: {}\nDocument: {}\n\n{}\n--- END DOCUMENT ---",
            delivery.method.as_str(),
            delivery.recipient,
            delivery.document_id,
            delivery.message
        );

        Ok(())
    }
}
