use crate::error::{AppError, Result};
use crate::ml::ModelArtifact;
use crate::models::RiskRecord;
use crate::state::{ModelStore, RecordStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory store (for MVP and testing).
///
/// Model artifacts are held as the same bincode blobs the persistent
/// backend stores, keeping them content-opaque here too.
#[derive(Clone)]
pub struct InMemoryStore {
    records: Arc<DashMap<String, Vec<RiskRecord>>>,
    models: Arc<DashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            models: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn append_record(&self, record: &RiskRecord) -> Result<Uuid> {
        self.records
            .entry(record.user_id.clone())
            .or_default()
            .push(record.clone());

        tracing::debug!(record_id = %record.id, user_id = %record.user_id, "Record appended");
        Ok(record.id)
    }

    async fn records_for_user(&self, user_id: &str) -> Result<Vec<RiskRecord>> {
        Ok(self
            .records
            .get(user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ModelStore for InMemoryStore {
    async fn save_model(&self, user_id: &str, artifact: &ModelArtifact) -> Result<()> {
        let bytes = bincode::serialize(artifact)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize model: {}", e)))?;

        self.models.insert(user_id.to_string(), bytes);

        tracing::debug!(user_id = %user_id, "Model artifact saved");
        Ok(())
    }

    async fn load_model(&self, user_id: &str) -> Result<Option<ModelArtifact>> {
        match self.models.get(user_id) {
            Some(entry) => {
                let artifact = bincode::deserialize(entry.value()).map_err(|e| {
                    AppError::Serialization(format!("Failed to deserialize model: {}", e))
                })?;
                Ok(Some(artifact))
            }
            None => Ok(None),
        }
    }
}
