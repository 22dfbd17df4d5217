//! Core data model for the governed pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Intent status. Moves forward only, except the checkpoint-rejection reset
/// back to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Draft,
    Submitted,
    Processing,
    Completed,
    Cancelled,
}

impl IntentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IntentStatus::Completed | IntentStatus::Cancelled)
    }
}

/// A human-declared goal seeding one pass through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub id: Uuid,
    pub partition: String,
    pub description: String,
    pub status: IntentStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Intent {
    pub fn new(partition: String, description: String, created_by: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            partition,
            description,
            status: IntentStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        }
    }

    pub(crate) fn set_status(&mut self, status: IntentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
        if status == IntentStatus::Submitted {
            self.submitted_at = Some(self.updated_at);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Paused,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

/// One sandboxed attempt at fulfilling an intent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: Uuid,
    pub intent_id: Uuid,
    /// Opaque, freshly minted per session. Never a handle into durable storage.
    pub sandbox_id: String,
    pub agent_id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub staged_content_id: Option<Uuid>,
    pub failure: Option<String>,
}

impl WorkSession {
    pub(crate) fn finish(&mut self, status: SessionStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedMetadata {
    pub agent_id: String,
    pub confidence: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Untrusted agent output waiting for a human. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedContent {
    pub id: Uuid,
    pub intent_id: Uuid,
    pub session_id: Uuid,
    pub payload: serde_json::Value,
    pub metadata: StagedMetadata,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
    Modify,
    Defer,
}

/// A human's verdict on one staged item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    pub id: Uuid,
    pub staged_content_id: Uuid,
    pub intent_id: Uuid,
    pub decision: Decision,
    pub reviewer_id: String,
    pub rationale: Option<String>,
    pub decided_at: DateTime<Utc>,
}

impl ReviewDecision {
    pub fn is_accept(&self) -> bool {
        self.decision == Decision::Accept
    }
}
