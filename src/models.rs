//! Data models and DTOs (Data Transfer Objects)
//!
//! Request bodies accepted by the REST surface and the generic success
//! envelope every handler responds with.

use crate::checkpoint::CheckpointOutcome;
use crate::pipeline::{Decision, Phase};
use crate::policy::{PendingAction, Sensitivity, Severity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    #[validate(length(min = 1, max = 128, message = "Partition must be 1-128 characters"))]
    pub partition: String,
    #[validate(length(min = 1, max = 4000, message = "Description must be 1-4000 characters"))]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelIntentRequest {
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkRequest {
    #[validate(length(min = 1, max = 128, message = "Agent id must be 1-128 characters"))]
    pub agent_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteWorkRequest {
    pub payload: serde_json::Value,
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be between 0 and 1"))]
    pub confidence: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FailWorkRequest {
    #[validate(length(min = 1, max = 1000, message = "A failure reason is required"))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancePhaseRequest {
    pub target: Phase,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub decision: Decision,
    #[validate(length(max = 4000))]
    #[serde(default)]
    pub rationale: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RaiseCheckpointRequest {
    #[serde(default)]
    pub intent_id: Option<Uuid>,
    /// Classified from the pending actions when absent
    #[serde(default)]
    pub sensitivity: Option<Sensitivity>,
    #[serde(default)]
    pub pending_actions: Vec<PendingAction>,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCheckpointRequest {
    pub outcome: CheckpointOutcome,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IntentionRequest {
    #[validate(length(min = 1, max = 4000, message = "Intention must be 1-4000 characters"))]
    pub intention: String,
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub intent_id: Option<Uuid>,
    #[serde(default)]
    pub context: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitQuery {
    /// How long to hold the request open before answering with the
    /// still-pending checkpoint
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationQuery {
    pub agent_id: Option<String>,
    pub min_severity: Option<Severity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub resource_type: Option<String>,
    pub resource_id: Option<Uuid>,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_range_validated() {
        let request = CompleteWorkRequest {
            payload: serde_json::json!({}),
            confidence: 1.5,
            warnings: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_review_request_wire_format() {
        let request: ReviewRequest =
            serde_json::from_str(r#"{ "decision": "accept", "rationale": "looks right" }"#).unwrap();
        assert_eq!(request.decision, Decision::Accept);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_empty_intent_rejected() {
        let request = CreateIntentRequest {
            partition: "business".to_string(),
            description: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
