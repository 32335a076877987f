// ═══════════════════════════════════════════════════════════════════
// Storage Tests — MemoryHoldingStore CRUD and owner filtering
// ═══════════════════════════════════════════════════════════════════

use uuid::Uuid;

use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::holding::{Holding, HoldingPatch};
use portfolio_tracker_core::storage::memory::MemoryHoldingStore;
use portfolio_tracker_core::storage::traits::HoldingStore;

fn holding(owner: &str, symbol: &str, quantity: u32, average_price: f64) -> Holding {
    Holding::new(owner, symbol, quantity, average_price).unwrap()
}

mod create_and_list {
    use super::*;

    #[tokio::test]
    async fn create_then_list() {
        let store = MemoryHoldingStore::new();
        let created = store
            .create(holding("user-1", "PETR4", 10, 30.0))
            .await
            .unwrap();

        let listed = store.list_for_owner("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);
    }

    #[tokio::test]
    async fn list_filters_by_owner() {
        let store = MemoryHoldingStore::new();
        store.create(holding("user-1", "PETR4", 10, 30.0)).await.unwrap();
        store.create(holding("user-2", "VALE3", 5, 60.0)).await.unwrap();

        let mine = store.list_for_owner("user-1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].symbol, "PETR4");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn list_unknown_owner_is_empty() {
        let store = MemoryHoldingStore::new();
        assert!(store.list_for_owner("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryHoldingStore::new();
        let mut older = holding("user-1", "PETR4", 10, 30.0);
        let mut newer = holding("user-1", "VALE3", 5, 60.0);
        // Pin creation times so the ordering assertion is deterministic.
        older.created_at = chrono::Utc::now() - chrono::Duration::hours(1);
        newer.created_at = chrono::Utc::now();
        store.create(older).await.unwrap();
        store.create(newer).await.unwrap();

        let listed = store.list_for_owner("user-1").await.unwrap();
        assert_eq!(listed[0].symbol, "VALE3");
        assert_eq!(listed[1].symbol, "PETR4");
    }

    #[tokio::test]
    async fn duplicate_id_rejected() {
        let store = MemoryHoldingStore::new();
        let h = holding("user-1", "PETR4", 10, 30.0);
        store.create(h.clone()).await.unwrap();

        let result = store.create(h).await;
        match result.unwrap_err() {
            CoreError::Persistence(msg) => assert!(msg.contains("already exists")),
            other => panic!("Expected Persistence, got {:?}", other),
        }
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn patch_applies() {
        let store = MemoryHoldingStore::new();
        let h = store.create(holding("user-1", "PETR4", 10, 30.0)).await.unwrap();

        store
            .update(
                h.id,
                HoldingPatch {
                    quantity: Some(15),
                    average_price: Some(31.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let listed = store.list_for_owner("user-1").await.unwrap();
        assert_eq!(listed[0].quantity, 15);
        assert_eq!(listed[0].average_price, 31.0);
        assert_eq!(listed[0].id, h.id);
    }

    #[tokio::test]
    async fn unknown_id_fails() {
        let store = MemoryHoldingStore::new();
        let result = store.update(Uuid::new_v4(), HoldingPatch::default()).await;
        match result.unwrap_err() {
            CoreError::HoldingNotFound(_) => {}
            other => panic!("Expected HoldingNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_patch_leaves_record_untouched() {
        let store = MemoryHoldingStore::new();
        let h = store.create(holding("user-1", "PETR4", 10, 30.0)).await.unwrap();

        let result = store
            .update(
                h.id,
                HoldingPatch {
                    average_price: Some(-1.0),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_err());

        let listed = store.list_for_owner("user-1").await.unwrap();
        assert_eq!(listed[0].average_price, 30.0);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes() {
        let store = MemoryHoldingStore::new();
        let h = store.create(holding("user-1", "PETR4", 10, 30.0)).await.unwrap();

        store.delete(h.id).await.unwrap();
        assert!(store.is_empty());
        assert!(store.list_for_owner("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_twice_fails() {
        let store = MemoryHoldingStore::new();
        let h = store.create(holding("user-1", "PETR4", 10, 30.0)).await.unwrap();

        store.delete(h.id).await.unwrap();
        assert!(store.delete(h.id).await.is_err());
    }

    #[tokio::test]
    async fn delete_unknown_id_fails() {
        let store = MemoryHoldingStore::new();
        assert!(store.delete(Uuid::new_v4()).await.is_err());
    }
}
