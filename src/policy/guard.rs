//! Policy Guard
//!
//! "Agent-proof" guardrails. Every agent side effect goes through
//! [`PolicyGuard::guard_agent_action`]; every agent message is checked against
//! the communication matrix; every agent suggestion is linted. Violations are
//! appended to a log that is never truncated.

use crate::error::{GovernanceError, GovernanceResult};
use crate::policy::compliance::ComplianceReport;
use crate::policy::suggestion::{self, SuggestionVerdict};
use crate::policy::types::{
    ForbiddenAction, Participant, PolicyViolation, Severity, ViolationType,
};
use std::future::Future;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// The guard that enforces agent policy
pub struct PolicyGuard {
    violations: RwLock<Vec<PolicyViolation>>,
}

impl PolicyGuard {
    pub fn new() -> Self {
        Self {
            violations: RwLock::new(Vec::new()),
        }
    }

    // =========================================================================
    // GUARDED EXECUTION
    // =========================================================================

    /// Run an agent side effect, unless the action is forbidden.
    ///
    /// A forbidden action is logged and `None` is returned; the callback is
    /// dropped without ever being invoked.
    pub async fn guard_agent_action<F, Fut, T>(
        &self,
        agent_id: &str,
        action_name: &str,
        action: F,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(forbidden) = ForbiddenAction::from_name(action_name) {
            warn!(
                agent_id,
                action = forbidden.name(),
                "Blocked forbidden agent action"
            );
            self.record(PolicyViolation::new(
                agent_id,
                ViolationType::ForbiddenAction,
                forbidden.severity(),
                format!("agent attempted forbidden action '{}'", forbidden.name()),
            ))
            .await;
            return None;
        }

        debug!(agent_id, action = action_name, "Running guarded agent action");
        Some(action().await)
    }

    // =========================================================================
    // COMMUNICATION MATRIX
    // =========================================================================

    /// Only orchestrator→agent, agent→orchestrator and orchestrator→human are allowed
    pub fn is_allowed_edge(from: &Participant, to: &Participant) -> bool {
        matches!(
            (from, to),
            (Participant::Orchestrator, Participant::Agent(_))
                | (Participant::Agent(_), Participant::Orchestrator)
                | (Participant::Orchestrator, Participant::Human)
        )
    }

    /// Check a message edge, logging a violation when it is not in the matrix
    pub async fn check_communication(
        &self,
        from: &Participant,
        to: &Participant,
    ) -> GovernanceResult<()> {
        if Self::is_allowed_edge(from, to) {
            return Ok(());
        }

        // Writing to the ledger from outside the core loop is a timeline write
        let severity = if *to == Participant::Ledger {
            Severity::Critical
        } else {
            Severity::High
        };
        let offender = match from {
            Participant::Agent(id) => id.clone(),
            other => other.to_string(),
        };

        warn!(from = %from, to = %to, "Blocked forbidden communication");
        self.record(PolicyViolation::new(
            offender,
            ViolationType::ForbiddenCommunication,
            severity,
            format!("communication {} -> {} is not permitted", from, to),
        ))
        .await;

        Err(GovernanceError::PolicyViolation(format!(
            "communication {} -> {} is not permitted",
            from, to
        )))
    }

    // =========================================================================
    // SUGGESTION LANGUAGE
    // =========================================================================

    /// Lint an agent suggestion. Imperative openers are logged as violations.
    pub async fn check_suggestion(&self, agent_id: &str, text: &str) -> SuggestionVerdict {
        let verdict = suggestion::lint(text);
        if let SuggestionVerdict::Imperative { phrase } = &verdict {
            warn!(agent_id, phrase, "Rejected imperative suggestion");
            self.record(PolicyViolation::new(
                agent_id,
                ViolationType::ImperativeLanguage,
                Severity::Medium,
                format!("suggestion opens with imperative phrase '{}'", phrase),
            ))
            .await;
        }
        verdict
    }

    // =========================================================================
    // VIOLATION LOG
    // =========================================================================

    /// Append a violation
    pub async fn record(&self, violation: PolicyViolation) {
        let mut log = self.violations.write().await;
        log.push(violation);
    }

    /// Violations, most recent first, optionally filtered
    pub async fn violations(
        &self,
        agent_id: Option<&str>,
        min_severity: Option<Severity>,
    ) -> Vec<PolicyViolation> {
        let log = self.violations.read().await;
        log.iter()
            .rev()
            .filter(|v| agent_id.map(|a| v.agent_id == a).unwrap_or(true))
            .filter(|v| min_severity.map(|s| v.severity >= s).unwrap_or(true))
            .cloned()
            .collect()
    }

    /// Derived on every call from the live log
    pub async fn generate_compliance_report(&self) -> ComplianceReport {
        let log = self.violations.read().await;
        ComplianceReport::from_violations(&log)
    }
}

impl Default for PolicyGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_write_timeline_never_runs_callback() {
        let guard = PolicyGuard::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        let result = guard
            .guard_agent_action("agentX", "write_timeline", || async move {
                c.fetch_add(1, Ordering::SeqCst);
                "written"
            })
            .await;

        assert_eq!(result, None);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        let report = guard.generate_compliance_report().await;
        assert!(!report.compliant);
    }

    #[tokio::test]
    async fn test_finalize_decision_is_blocked_and_logged() {
        let guard = PolicyGuard::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        let result = guard
            .guard_agent_action("agentX", "finalize_decision", || async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert!(result.is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        let log = guard.violations(Some("agentX"), None).await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].violation_type, ViolationType::ForbiddenAction);
    }

    #[tokio::test]
    async fn test_every_forbidden_action_is_blocked() {
        let guard = PolicyGuard::new();
        for action in ForbiddenAction::ALL {
            let result = guard
                .guard_agent_action("agentY", action.name(), || async { 1 })
                .await;
            assert!(result.is_none(), "{} ran", action.name());
        }
        assert_eq!(guard.violations(None, None).await.len(), ForbiddenAction::ALL.len());
    }

    #[tokio::test]
    async fn test_allowed_action_returns_result() {
        let guard = PolicyGuard::new();
        let result = guard
            .guard_agent_action("agentX", "summarize_notes", || async { 7 })
            .await;
        assert_eq!(result, Some(7));
        assert!(guard.violations(None, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_communication_matrix() {
        let guard = PolicyGuard::new();
        let agent = Participant::Agent("a1".to_string());

        assert!(guard.check_communication(&Participant::Orchestrator, &agent).await.is_ok());
        assert!(guard.check_communication(&agent, &Participant::Orchestrator).await.is_ok());
        assert!(guard
            .check_communication(&Participant::Orchestrator, &Participant::Human)
            .await
            .is_ok());

        let other = Participant::Agent("a2".to_string());
        assert!(guard.check_communication(&agent, &other).await.is_err());
        assert!(guard.check_communication(&agent, &Participant::Ui).await.is_err());
        assert!(guard.check_communication(&agent, &Participant::Ledger).await.is_err());

        let critical = guard.violations(Some("a1"), Some(Severity::Critical)).await;
        assert_eq!(critical.len(), 1);
        assert_eq!(guard.violations(Some("a1"), None).await.len(), 3);
    }

    #[tokio::test]
    async fn test_imperative_suggestion_is_logged() {
        let guard = PolicyGuard::new();
        let verdict = guard.check_suggestion("a1", "You should archive this").await;

        assert!(!verdict.is_accepted());
        let log = guard.violations(None, None).await;
        assert_eq!(log[0].violation_type, ViolationType::ImperativeLanguage);

        let report = guard.generate_compliance_report().await;
        assert!(report.compliant);
        assert_eq!(report.total_violations, 1);
    }

    #[tokio::test]
    async fn test_word_that_starts_like_imperative_is_not_logged() {
        let guard = PolicyGuard::new();
        let verdict = guard
            .check_suggestion("a1", "Nevertheless, the draft could wait a week")
            .await;

        assert_eq!(verdict, SuggestionVerdict::Unhedged);
        assert!(guard.violations(None, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_records_are_all_kept() {
        let guard = Arc::new(PolicyGuard::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let guard = guard.clone();
            handles.push(tokio::spawn(async move {
                guard
                    .guard_agent_action(&format!("agent-{}", i % 4), "autonomous_action", || async {})
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let report = guard.generate_compliance_report().await;
        assert_eq!(report.total_violations, 32);
        assert_eq!(report.violations_by_agent.len(), 4);
    }
}
