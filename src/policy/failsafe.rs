//! Fail-safe response
//!
//! What an agent (or the orchestrator on its behalf) returns when it lacks the
//! confidence or context to answer. It never carries a recommendation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailSafeResponse {
    pub is_uncertain: bool,
    pub defers_to_human: bool,
    pub no_recommendation: bool,
    pub reason: String,
}

impl FailSafeResponse {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            is_uncertain: true,
            defers_to_human: true,
            no_recommendation: true,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_safe_flags_are_always_set() {
        let response = FailSafeResponse::new("not enough context");
        assert!(response.is_uncertain && response.defers_to_human && response.no_recommendation);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["defersToHuman"], true);
        assert_eq!(json["reason"], "not enough context");
    }
}
