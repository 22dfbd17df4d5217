//! Audit Log
//!
//! Append-only record of every human and pipeline action. Entries are only
//! ever pushed under the write guard; nothing replaces or truncates the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Human user id, agent id, or `system`
    pub actor: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
}

impl AuditEntry {
    pub fn new(
        actor: impl Into<String>,
        action: AuditAction,
        resource_type: &str,
        resource_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: actor.into(),
            action,
            resource_type: resource_type.to_string(),
            resource_id,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // Intent lifecycle
    IntentCreated,
    IntentSubmitted,
    IntentCancelled,

    // Work and staging
    WorkStarted,
    WorkCompleted,
    WorkFailed,
    ContentStaged,

    // Review and versioning
    ReviewSubmitted,
    VersionCreated,

    // Checkpoints
    CheckpointRaised,
    CheckpointApproved,
    CheckpointRejected,

    // Policy
    PolicyWarning,
}

/// Append-only audit log
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append an entry
    pub async fn record(&self, entry: AuditEntry) {
        let mut log = self.entries.write().await;
        log.push(entry);
    }

    /// Most recent entries first, optionally filtered
    pub async fn entries(
        &self,
        resource_type: Option<&str>,
        resource_id: Option<Uuid>,
        limit: usize,
    ) -> Vec<AuditEntry> {
        let log = self.entries.read().await;

        log.iter()
            .rev()
            .filter(|e| {
                resource_type.map(|t| e.resource_type == t).unwrap_or(true)
                    && resource_id.map(|id| e.resource_id == Some(id)).unwrap_or(true)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entries_are_most_recent_first() {
        let log = AuditLog::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        log.record(AuditEntry::new("alice", AuditAction::IntentCreated, "intent", Some(first)))
            .await;
        log.record(AuditEntry::new("alice", AuditAction::IntentSubmitted, "intent", Some(second)))
            .await;

        let entries = log.entries(None, None, 10).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].resource_id, Some(second));
    }

    #[tokio::test]
    async fn test_filter_by_resource() {
        let log = AuditLog::new();
        let id = Uuid::new_v4();
        log.record(AuditEntry::new("system", AuditAction::CheckpointRaised, "checkpoint", Some(id)))
            .await;
        log.record(AuditEntry::new("bob", AuditAction::ReviewSubmitted, "review", None))
            .await;

        assert_eq!(log.entries(Some("checkpoint"), None, 10).await.len(), 1);
        assert_eq!(log.entries(None, Some(id), 10).await.len(), 1);
        assert_eq!(log.len().await, 2);
    }
}
