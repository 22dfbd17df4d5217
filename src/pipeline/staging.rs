//! Staging Store
//!
//! Holds untrusted agent output until a human adjudicates it. Items are never
//! edited and never merged anywhere on their own; each is consumed by exactly
//! one review decision.

use crate::error::{conflict_error, not_found_error, GovernanceResult};
use crate::pipeline::types::StagedContent;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct StagingStore {
    items: RwLock<HashMap<Uuid, StagedContent>>,
    /// Staged content id -> review decision id
    consumed: RwLock<HashMap<Uuid, Uuid>>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            consumed: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, content: StagedContent) -> StagedContent {
        let mut items = self.items.write().await;
        items.insert(content.id, content.clone());
        content
    }

    pub async fn get(&self, id: Uuid) -> GovernanceResult<StagedContent> {
        let items = self.items.read().await;
        items
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error(format!("Staged content {} not found", id)))
    }

    /// Bind a staged item to the review that consumed it. Only once.
    pub async fn consume(&self, id: Uuid, review_id: Uuid) -> GovernanceResult<()> {
        if !self.items.read().await.contains_key(&id) {
            return Err(not_found_error(format!("Staged content {} not found", id)));
        }

        let mut consumed = self.consumed.write().await;
        if let Some(existing) = consumed.get(&id) {
            return Err(conflict_error(format!(
                "Staged content {} was already reviewed by decision {}",
                id, existing
            )));
        }
        consumed.insert(id, review_id);
        Ok(())
    }

    /// Review that consumed the item, if any
    pub async fn consumed_by(&self, id: Uuid) -> Option<Uuid> {
        self.consumed.read().await.get(&id).copied()
    }
}

impl Default for StagingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GovernanceError;
    use crate::pipeline::types::StagedMetadata;
    use chrono::Utc;

    fn content() -> StagedContent {
        StagedContent {
            id: Uuid::new_v4(),
            intent_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            payload: serde_json::json!({ "summary": "draft" }),
            metadata: StagedMetadata {
                agent_id: "writer".to_string(),
                confidence: 0.8,
                warnings: vec![],
            },
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_consumed_exactly_once() {
        let store = StagingStore::new();
        let item = store.insert(content()).await;
        let first = Uuid::new_v4();

        store.consume(item.id, first).await.unwrap();
        let second = store.consume(item.id, Uuid::new_v4()).await;

        assert!(matches!(second, Err(GovernanceError::Conflict(_))));
        assert_eq!(store.consumed_by(item.id).await, Some(first));
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let store = StagingStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_err());
        assert!(store.consume(Uuid::new_v4(), Uuid::new_v4()).await.is_err());
        assert_eq!(store.consumed_by(Uuid::new_v4()).await, None);
    }
}
