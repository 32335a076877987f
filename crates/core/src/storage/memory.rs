use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingPatch};
use super::traits::HoldingStore;

/// In-memory [`HoldingStore`] — backs tests and embeddings that don't need
/// a database. Not durable.
#[derive(Default)]
pub struct MemoryHoldingStore {
    holdings: Mutex<Vec<Holding>>,
}

impl MemoryHoldingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored holdings across all owners.
    pub fn len(&self) -> usize {
        self.holdings.lock().expect("holding store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HoldingStore for MemoryHoldingStore {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Holding>, CoreError> {
        let holdings = self.holdings.lock().expect("holding store lock poisoned");
        let mut owned: Vec<Holding> = holdings
            .iter()
            .filter(|h| h.owner_id == owner_id)
            .cloned()
            .collect();
        // Newest-first, matching how the portfolio is displayed
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn create(&self, holding: Holding) -> Result<Holding, CoreError> {
        let mut holdings = self.holdings.lock().expect("holding store lock poisoned");
        if holdings.iter().any(|h| h.id == holding.id) {
            return Err(CoreError::Persistence(format!(
                "Holding {} already exists",
                holding.id
            )));
        }
        holdings.push(holding.clone());
        Ok(holding)
    }

    async fn update(&self, id: Uuid, patch: HoldingPatch) -> Result<(), CoreError> {
        let mut holdings = self.holdings.lock().expect("holding store lock poisoned");
        let existing = holdings
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| CoreError::HoldingNotFound(id.to_string()))?;
        let updated = patch.apply_to(existing)?;
        *existing = updated;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        let mut holdings = self.holdings.lock().expect("holding store lock poisoned");
        let idx = holdings
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| CoreError::HoldingNotFound(id.to_string()))?;
        holdings.remove(idx);
        Ok(())
    }
}
