use crate::error::{AppError, Result};
use crate::ml::ModelArtifact;
use crate::models::RiskRecord;
use crate::state::{ModelStore, RecordStore};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Persistent store using the Sled embedded database.
///
/// Records live under `user digest || record id`; model artifacts live in
/// their own tree under the user digest alone. Keying by sha256 of the
/// user id gives fixed-width, collision-free keys that never embed raw
/// caller input in the storage namespace.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    records_tree: sled::Tree,
    models_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(&path)
            .map_err(|e| AppError::Storage(format!("Failed to open Sled database: {}", e)))?;

        let records_tree = db
            .open_tree("records")
            .map_err(|e| AppError::Storage(format!("Failed to open records tree: {}", e)))?;

        let models_tree = db
            .open_tree("models")
            .map_err(|e| AppError::Storage(format!("Failed to open models tree: {}", e)))?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self {
            db: Arc::new(db),
            records_tree,
            models_tree,
        })
    }

    fn user_digest(user_id: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.finalize().into()
    }

    fn record_key(user_id: &str, id: &Uuid) -> Vec<u8> {
        let mut key = Vec::with_capacity(48);
        key.extend_from_slice(&Self::user_digest(user_id));
        key.extend_from_slice(id.as_bytes());
        key
    }

    fn serialize_record(record: &RiskRecord) -> Result<Vec<u8>> {
        bincode::serialize(record)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize record: {}", e)))
    }

    fn deserialize_record(bytes: &[u8]) -> Result<RiskRecord> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize record: {}", e)))
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SledStore {
    async fn append_record(&self, record: &RiskRecord) -> Result<Uuid> {
        let key = Self::record_key(&record.user_id, &record.id);
        let value = Self::serialize_record(record)?;

        self.records_tree
            .insert(&key, value)
            .map_err(|e| AppError::Storage(format!("Failed to append record: {}", e)))?;

        self.records_tree
            .flush()
            .map_err(|e| AppError::Storage(format!("Failed to flush records tree: {}", e)))?;

        tracing::debug!(record_id = %record.id, user_id = %record.user_id, "Record saved to Sled");
        Ok(record.id)
    }

    async fn records_for_user(&self, user_id: &str) -> Result<Vec<RiskRecord>> {
        let prefix = Self::user_digest(user_id);
        let mut records = Vec::new();

        for result in self.records_tree.scan_prefix(prefix) {
            let (_, value) =
                result.map_err(|e| AppError::Storage(format!("Failed to scan records: {}", e)))?;
            records.push(Self::deserialize_record(&value)?);
        }

        // Scan order is key order; restore insertion order for callers.
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(records)
    }
}

#[async_trait]
impl ModelStore for SledStore {
    async fn save_model(&self, user_id: &str, artifact: &ModelArtifact) -> Result<()> {
        let key = Self::user_digest(user_id);
        let value = bincode::serialize(artifact)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize model: {}", e)))?;

        self.models_tree
            .insert(key, value)
            .map_err(|e| AppError::Storage(format!("Failed to save model: {}", e)))?;

        self.models_tree
            .flush()
            .map_err(|e| AppError::Storage(format!("Failed to flush models tree: {}", e)))?;

        tracing::debug!(user_id = %user_id, "Model artifact saved to Sled");
        Ok(())
    }

    async fn load_model(&self, user_id: &str) -> Result<Option<ModelArtifact>> {
        let key = Self::user_digest(user_id);

        match self.models_tree.get(key) {
            Ok(Some(bytes)) => {
                let artifact = bincode::deserialize(&bytes).map_err(|e| {
                    AppError::Serialization(format!("Failed to deserialize model: {}", e))
                })?;
                Ok(Some(artifact))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to load model: {}", e))),
        }
    }
}
