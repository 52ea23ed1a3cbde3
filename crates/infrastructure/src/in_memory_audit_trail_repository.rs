use std::collections::HashMap;

use async_trait::async_trait;
use proptrack_application::AuditTrailRepository;
use proptrack_core::{AppResult, RecordId};
use proptrack_domain::AuditTrail;
use tokio::sync::RwLock;

/// In-memory audit trail repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryAuditTrailRepository {
    trails: RwLock<HashMap<RecordId, AuditTrail>>,
}

impl InMemoryAuditTrailRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trails: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AuditTrailRepository for InMemoryAuditTrailRepository {
    async fn find_trail(&self, document_id: &RecordId) -> AppResult<Option<AuditTrail>> {
        Ok(self.trails.read().await.get(document_id).cloned())
    }

    async fn save_trail(&self, trail: &AuditTrail) -> AppResult<()> {
        self.trails
            .write()
            .await
            .insert(trail.document_id().clone(), trail.clone());
        Ok(())
    }
}
