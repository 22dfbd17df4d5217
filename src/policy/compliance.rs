//! Compliance report, derived from the violation log on every read

use crate::policy::types::{PolicyViolation, Severity};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub compliant: bool,
    pub total_violations: usize,
    pub critical_violations: usize,
    pub violations_by_agent: HashMap<String, usize>,
}

impl ComplianceReport {
    pub fn from_violations(violations: &[PolicyViolation]) -> Self {
        let critical_violations = violations
            .iter()
            .filter(|v| v.severity == Severity::Critical)
            .count();

        let mut violations_by_agent = HashMap::new();
        for v in violations {
            *violations_by_agent.entry(v.agent_id.clone()).or_insert(0) += 1;
        }

        Self {
            compliant: critical_violations == 0,
            total_violations: violations.len(),
            critical_violations,
            violations_by_agent,
        }
    }
}
