pub mod factory;
pub mod memory;
pub mod sled_store;

pub use factory::create_stores;
pub use memory::InMemoryStore;
pub use sled_store::SledStore;

use crate::error::Result;
use crate::ml::ModelArtifact;
use crate::models::RiskRecord;
use async_trait::async_trait;
use uuid::Uuid;

/// Append-only, query-by-user record storage
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a record, returning its id
    async fn append_record(&self, record: &RiskRecord) -> Result<Uuid>;

    /// All records owned by `user_id`, oldest first
    async fn records_for_user(&self, user_id: &str) -> Result<Vec<RiskRecord>>;
}

/// One serialized classifier artifact per user.
///
/// `load_model` of an absent artifact is `Ok(None)`: "not yet trained" is
/// an expected steady state, not a failure. Artifacts are namespaced per
/// user so one user can never read or overwrite another's.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Persist the artifact for `user_id`, overwriting any prior one
    async fn save_model(&self, user_id: &str, artifact: &ModelArtifact) -> Result<()>;

    /// Load the artifact for `user_id`, `None` when never trained
    async fn load_model(&self, user_id: &str) -> Result<Option<ModelArtifact>>;
}
