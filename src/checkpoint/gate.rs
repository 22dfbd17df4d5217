//! Checkpoint Gate
//!
//! A blocking human-approval barrier. Once raised, a checkpoint stays pending
//! until a named human approves or rejects it. There is no timeout and no
//! auto-approval; waiters are woken through a watch channel when the
//! resolution lands.

use crate::audit::{AuditAction, AuditEntry, AuditLog};
use crate::checkpoint::sanitizer::{sanitize, ForbiddenPattern};
use crate::error::{conflict_error, not_found_error, validation_error, GovernanceError, GovernanceResult};
use crate::policy::{PendingAction, Sensitivity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

const DEFAULT_REJECTION_REASON: &str = "The request was declined at the checkpoint.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointOutcome {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointResolution {
    pub outcome: CheckpointOutcome,
    pub resolved_by: String,
    pub reason: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: Uuid,
    /// Intent whose pipeline is paused behind this checkpoint, if any
    pub intent_id: Option<Uuid>,
    pub sensitivity: Sensitivity,
    pub pending_actions: Vec<PendingAction>,
    /// Sanitized message shown to the human
    pub message: String,
    pub raised_at: DateTime<Utc>,
    pub resolution: Option<CheckpointResolution>,
}

impl Checkpoint {
    pub fn is_pending(&self) -> bool {
        self.resolution.is_none()
    }

    pub fn outcome(&self) -> Option<CheckpointOutcome> {
        self.resolution.as_ref().map(|r| r.outcome)
    }
}

/// Request to raise a checkpoint
#[derive(Debug, Clone)]
pub struct RaiseCheckpoint {
    pub intent_id: Option<Uuid>,
    pub sensitivity: Sensitivity,
    pub pending_actions: Vec<PendingAction>,
    pub candidate_message: Option<String>,
}

pub struct CheckpointGate {
    threshold: Sensitivity,
    default_message: String,
    checkpoints: RwLock<HashMap<Uuid, Checkpoint>>,
    /// Raise order, append-only
    order: RwLock<Vec<Uuid>>,
    watchers: RwLock<HashMap<Uuid, watch::Sender<Option<CheckpointResolution>>>>,
    audit: Arc<AuditLog>,
}

impl CheckpointGate {
    pub fn new(threshold: Sensitivity, default_message: impl Into<String>, audit: Arc<AuditLog>) -> Self {
        Self {
            threshold,
            default_message: default_message.into(),
            checkpoints: RwLock::new(HashMap::new()),
            order: RwLock::new(Vec::new()),
            watchers: RwLock::new(HashMap::new()),
            audit,
        }
    }

    pub fn threshold(&self) -> Sensitivity {
        self.threshold
    }

    /// Whether a bundle of this sensitivity must stop at a checkpoint
    pub fn requires_checkpoint(&self, sensitivity: Sensitivity) -> bool {
        sensitivity >= self.threshold
    }

    /// Raise a new pending checkpoint
    pub async fn raise(&self, request: RaiseCheckpoint) -> Checkpoint {
        let sanitized = sanitize(request.candidate_message.as_deref(), &self.default_message);
        if sanitized.substituted {
            self.log_policy_warning(request.intent_id, &sanitized.matched).await;
        }

        let checkpoint = Checkpoint {
            id: Uuid::new_v4(),
            intent_id: request.intent_id,
            sensitivity: request.sensitivity,
            pending_actions: request.pending_actions,
            message: sanitized.text,
            raised_at: Utc::now(),
            resolution: None,
        };

        let (tx, _rx) = watch::channel(None);
        self.watchers.write().await.insert(checkpoint.id, tx);
        self.checkpoints.write().await.insert(checkpoint.id, checkpoint.clone());
        self.order.write().await.push(checkpoint.id);

        self.audit
            .record(
                AuditEntry::new("system", AuditAction::CheckpointRaised, "checkpoint", Some(checkpoint.id))
                    .with_details(serde_json::json!({
                        "intentId": checkpoint.intent_id,
                        "sensitivity": checkpoint.sensitivity,
                        "actionCount": checkpoint.pending_actions.len(),
                    })),
            )
            .await;

        info!(
            "Raised {} checkpoint {} with {} pending action(s)",
            checkpoint.sensitivity,
            checkpoint.id,
            checkpoint.pending_actions.len()
        );
        checkpoint
    }

    /// Resolve a pending checkpoint. A second attempt is a conflict.
    pub async fn resolve(
        &self,
        checkpoint_id: Uuid,
        outcome: CheckpointOutcome,
        resolved_by: &str,
        reason: Option<String>,
    ) -> GovernanceResult<Checkpoint> {
        if resolved_by.trim().is_empty() {
            return Err(validation_error("A checkpoint must be resolved by a named human"));
        }

        let resolved = {
            let mut checkpoints = self.checkpoints.write().await;
            let checkpoint = checkpoints
                .get_mut(&checkpoint_id)
                .ok_or_else(|| not_found_error(format!("Checkpoint {} not found", checkpoint_id)))?;

            if let Some(existing) = &checkpoint.resolution {
                warn!(
                    "Duplicate resolution attempt on checkpoint {} (already {:?})",
                    checkpoint_id, existing.outcome
                );
                return Err(conflict_error(format!(
                    "Checkpoint {} is already resolved",
                    checkpoint_id
                )));
            }

            let reason = reason.map(|r| {
                let clean = sanitize(Some(&r), DEFAULT_REJECTION_REASON);
                clean.text
            });

            checkpoint.resolution = Some(CheckpointResolution {
                outcome,
                resolved_by: resolved_by.to_string(),
                reason,
                resolved_at: Utc::now(),
            });
            checkpoint.clone()
        };

        // Resolution is final, so the channel goes with it. Late waiters
        // read the stored resolution instead.
        let watcher = self.watchers.write().await.remove(&checkpoint_id);
        if let Some(tx) = watcher {
            tx.send_replace(resolved.resolution.clone());
        }

        let action = match outcome {
            CheckpointOutcome::Approved => AuditAction::CheckpointApproved,
            CheckpointOutcome::Rejected => AuditAction::CheckpointRejected,
        };
        self.audit
            .record(AuditEntry::new(resolved_by, action, "checkpoint", Some(checkpoint_id)))
            .await;

        info!("Checkpoint {} {:?} by {}", checkpoint_id, outcome, resolved_by);
        Ok(resolved)
    }

    /// Suspend until the checkpoint is resolved by a human
    pub async fn wait_for_resolution(&self, checkpoint_id: Uuid) -> GovernanceResult<CheckpointResolution> {
        let rx = self
            .watchers
            .read()
            .await
            .get(&checkpoint_id)
            .map(watch::Sender::subscribe);
        let Some(mut rx) = rx else {
            return self.stored_resolution(checkpoint_id).await;
        };

        let resolution = rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|resolution| resolution.clone());
        match resolution {
            Some(resolution) => Ok(resolution),
            None => self.stored_resolution(checkpoint_id).await,
        }
    }

    async fn stored_resolution(&self, checkpoint_id: Uuid) -> GovernanceResult<CheckpointResolution> {
        self.get(checkpoint_id)
            .await
            .ok_or_else(|| not_found_error(format!("Checkpoint {} not found", checkpoint_id)))?
            .resolution
            .ok_or_else(|| GovernanceError::Internal("checkpoint watcher closed before resolution".to_string()))
    }

    pub async fn get(&self, checkpoint_id: Uuid) -> Option<Checkpoint> {
        self.checkpoints.read().await.get(&checkpoint_id).cloned()
    }

    /// Pending checkpoints in the order they were raised
    pub async fn list_pending(&self) -> Vec<Checkpoint> {
        let order = self.order.read().await;
        let checkpoints = self.checkpoints.read().await;
        order
            .iter()
            .filter_map(|id| checkpoints.get(id))
            .filter(|c| c.is_pending())
            .cloned()
            .collect()
    }

    async fn log_policy_warning(&self, intent_id: Option<Uuid>, matched: &[ForbiddenPattern]) {
        warn!(
            ?matched,
            "Checkpoint message contained forbidden patterns, substituting default"
        );
        self.audit
            .record(
                AuditEntry::new("system", AuditAction::PolicyWarning, "checkpoint_message", intent_id)
                    .with_details(serde_json::json!({ "matched": matched })),
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CHECKPOINT_MESSAGE;
    use std::time::Duration;

    fn gate() -> (CheckpointGate, Arc<AuditLog>) {
        let audit = Arc::new(AuditLog::new());
        (
            CheckpointGate::new(Sensitivity::High, DEFAULT_CHECKPOINT_MESSAGE, audit.clone()),
            audit,
        )
    }

    fn request(message: Option<&str>) -> RaiseCheckpoint {
        RaiseCheckpoint {
            intent_id: None,
            sensitivity: Sensitivity::High,
            pending_actions: vec![PendingAction::new("archive_folder", "archive").irreversible()],
            candidate_message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_threshold() {
        let (gate, _) = gate();
        assert!(gate.requires_checkpoint(Sensitivity::Critical));
        assert!(gate.requires_checkpoint(Sensitivity::High));
        assert!(!gate.requires_checkpoint(Sensitivity::Medium));
    }

    #[tokio::test]
    async fn test_cost_message_replaced_with_default() {
        let (gate, audit) = gate();
        let checkpoint = gate.raise(request(Some("Estimated cost: ~3$"))).await;

        assert_eq!(checkpoint.message, DEFAULT_CHECKPOINT_MESSAGE);
        let warnings = audit.entries(Some("checkpoint_message"), None, 10).await;
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].action, AuditAction::PolicyWarning);
    }

    #[tokio::test]
    async fn test_resolution_is_immutable() {
        let (gate, _) = gate();
        let checkpoint = gate.raise(request(None)).await;

        let resolved = gate
            .resolve(checkpoint.id, CheckpointOutcome::Approved, "alice", None)
            .await
            .unwrap();
        assert_eq!(resolved.outcome(), Some(CheckpointOutcome::Approved));

        let second = gate
            .resolve(checkpoint.id, CheckpointOutcome::Rejected, "bob", None)
            .await;
        assert!(matches!(second, Err(GovernanceError::Conflict(_))));
        assert_eq!(
            gate.get(checkpoint.id).await.unwrap().outcome(),
            Some(CheckpointOutcome::Approved)
        );
    }

    #[tokio::test]
    async fn test_anonymous_resolution_is_refused() {
        let (gate, _) = gate();
        let checkpoint = gate.raise(request(None)).await;
        let result = gate
            .resolve(checkpoint.id, CheckpointOutcome::Approved, "  ", None)
            .await;
        assert!(matches!(result, Err(GovernanceError::Validation(_))));
        assert!(gate.get(checkpoint.id).await.unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_rejection_reason_is_sanitized() {
        let (gate, _) = gate();
        let checkpoint = gate.raise(request(None)).await;
        let resolved = gate
            .resolve(
                checkpoint.id,
                CheckpointOutcome::Rejected,
                "alice",
                Some("too expensive, 40% over".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(
            resolved.resolution.unwrap().reason.as_deref(),
            Some(DEFAULT_REJECTION_REASON)
        );
    }

    #[tokio::test]
    async fn test_waiter_stays_blocked_until_human_acts() {
        let (gate, _) = gate();
        let gate = Arc::new(gate);
        let checkpoint = gate.raise(request(None)).await;

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait_for_resolution(checkpoint.id).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        assert_eq!(gate.list_pending().await.len(), 1);

        gate.resolve(checkpoint.id, CheckpointOutcome::Rejected, "alice", Some("not now".into()))
            .await
            .unwrap();

        let resolution = waiter.await.unwrap().unwrap();
        assert_eq!(resolution.outcome, CheckpointOutcome::Rejected);
        assert_eq!(resolution.resolved_by, "alice");
        assert!(gate.list_pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_wait_after_resolution_returns_immediately() {
        let (gate, _) = gate();
        let checkpoint = gate.raise(request(None)).await;
        gate.resolve(checkpoint.id, CheckpointOutcome::Approved, "alice", None)
            .await
            .unwrap();

        assert!(gate.watchers.read().await.is_empty());
        let resolution = tokio_test::assert_ok!(gate.wait_for_resolution(checkpoint.id).await);
        assert_eq!(resolution.outcome, CheckpointOutcome::Approved);
        assert_eq!(resolution.resolved_by, "alice");
    }

    #[tokio::test]
    async fn test_watchers_released_on_resolution() {
        let (gate, _) = gate();
        let first = gate.raise(request(None)).await;
        let second = gate.raise(request(None)).await;
        assert_eq!(gate.watchers.read().await.len(), 2);

        gate.resolve(first.id, CheckpointOutcome::Rejected, "alice", None)
            .await
            .unwrap();
        let watchers = gate.watchers.read().await;
        assert_eq!(watchers.len(), 1);
        assert!(watchers.contains_key(&second.id));
    }

    #[tokio::test]
    async fn test_wait_on_unknown_checkpoint() {
        let (gate, _) = gate();
        let result = gate.wait_for_resolution(Uuid::new_v4()).await;
        assert!(matches!(result, Err(GovernanceError::NotFound(_))));
    }
}
