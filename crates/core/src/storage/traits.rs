use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingPatch};

/// Durable store for holdings, consumed by the engine as a plain CRUD
/// interface. The engine never persists anything itself; a database-backed
/// implementation lives with the embedding application.
#[async_trait]
pub trait HoldingStore: Send + Sync {
    /// All holdings belonging to `owner_id`, newest-first by creation time.
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Holding>, CoreError>;

    /// Persist a new holding. Returns the stored record.
    async fn create(&self, holding: Holding) -> Result<Holding, CoreError>;

    /// Apply a partial update to an existing holding.
    /// Changed fields are re-validated before anything is written.
    async fn update(&self, id: Uuid, patch: HoldingPatch) -> Result<(), CoreError>;

    /// Remove a holding by id.
    async fn delete(&self, id: Uuid) -> Result<(), CoreError>;
}
