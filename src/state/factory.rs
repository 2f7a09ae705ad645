use crate::config::{StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{InMemoryStore, ModelStore, RecordStore, SledStore};
use std::sync::Arc;

/// Build the record and model stores for the configured backend.
///
/// Both handles point at the same underlying store instance.
pub fn create_stores(config: &StateConfig) -> Result<(Arc<dyn RecordStore>, Arc<dyn ModelStore>)> {
    match config.backend {
        StateBackend::Memory => {
            tracing::info!("Using in-memory state backend");
            let store = Arc::new(InMemoryStore::new());
            Ok((store.clone(), store))
        }
        StateBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("state.path is required for the sled backend".to_string())
            })?;
            let store = Arc::new(SledStore::new(path)?);
            Ok((store.clone(), store))
        }
    }
}
