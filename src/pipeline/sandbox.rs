//! Sandbox boundary for agent work
//!
//! The executor only ever sees a [`SandboxContext`]: ids and the intent text.
//! It cannot reach the ledger or the review queue; it returns a candidate
//! payload and the core loop decides what happens to it.

use crate::error::GovernanceResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything an executor is allowed to know about its task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxContext {
    pub sandbox_id: String,
    pub session_id: Uuid,
    pub intent_id: Uuid,
    pub partition: String,
    pub agent_id: String,
    pub description: String,
}

/// Mint a fresh sandbox id. Never derived from any durable identifier.
pub fn new_sandbox_id() -> String {
    format!("sbx-{}", Uuid::new_v4().simple())
}

/// Candidate output of a work session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOutput {
    pub payload: serde_json::Value,
    pub confidence: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl WorkOutput {
    pub fn new(payload: serde_json::Value, confidence: f64) -> Self {
        Self {
            payload,
            confidence,
            warnings: Vec::new(),
        }
    }
}

/// The agent-execution layer, opaque to the core loop
#[async_trait]
pub trait WorkExecutor: Send + Sync {
    async fn execute(&self, context: &SandboxContext) -> GovernanceResult<WorkOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_ids_are_unique() {
        let a = new_sandbox_id();
        let b = new_sandbox_id();
        assert_ne!(a, b);
        assert!(a.starts_with("sbx-"));
    }
}
