//! Policy types shared by the guard, the linter and the checkpoint gate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Violation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Sensitivity of a pending action bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for Sensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            "critical" => Ok(Sensitivity::Critical),
            other => Err(format!("unknown sensitivity '{}'", other)),
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensitivity::Low => write!(f, "low"),
            Sensitivity::Medium => write!(f, "medium"),
            Sensitivity::High => write!(f, "high"),
            Sensitivity::Critical => write!(f, "critical"),
        }
    }
}

/// Kinds of policy violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    ForbiddenAction,
    ForbiddenCommunication,
    ImperativeLanguage,
}

/// An entry of the append-only violation log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyViolation {
    pub id: Uuid,
    pub agent_id: String,
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub detail: String,
    pub occurred_at: DateTime<Utc>,
}

impl PolicyViolation {
    pub fn new(
        agent_id: impl Into<String>,
        violation_type: ViolationType,
        severity: Severity,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id: agent_id.into(),
            violation_type,
            severity,
            detail: detail.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// The closed set of actions an agent may never perform directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenAction {
    WriteTimeline,
    FinalizeDecision,
    TriggerIrreversibleAction,
    AgentToAgentCommunication,
    DirectUiManipulation,
    AutonomousAction,
}

impl ForbiddenAction {
    pub const ALL: [ForbiddenAction; 6] = [
        ForbiddenAction::WriteTimeline,
        ForbiddenAction::FinalizeDecision,
        ForbiddenAction::TriggerIrreversibleAction,
        ForbiddenAction::AgentToAgentCommunication,
        ForbiddenAction::DirectUiManipulation,
        ForbiddenAction::AutonomousAction,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ForbiddenAction::WriteTimeline => "write_timeline",
            ForbiddenAction::FinalizeDecision => "finalize_decision",
            ForbiddenAction::TriggerIrreversibleAction => "trigger_irreversible_action",
            ForbiddenAction::AgentToAgentCommunication => "agent_to_agent_communication",
            ForbiddenAction::DirectUiManipulation => "direct_ui_manipulation",
            ForbiddenAction::AutonomousAction => "autonomous_action",
        }
    }

    /// Match an action name against the forbidden set
    pub fn from_name(action_name: &str) -> Option<Self> {
        let normalized = action_name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|a| a.name() == normalized)
    }

    pub fn severity(&self) -> Severity {
        match self {
            ForbiddenAction::WriteTimeline
            | ForbiddenAction::FinalizeDecision
            | ForbiddenAction::TriggerIrreversibleAction => Severity::Critical,
            ForbiddenAction::AgentToAgentCommunication
            | ForbiddenAction::DirectUiManipulation
            | ForbiddenAction::AutonomousAction => Severity::High,
        }
    }
}

/// Endpoints of the communication matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Participant {
    Orchestrator,
    Agent(String),
    Human,
    Ui,
    Ledger,
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Orchestrator => write!(f, "orchestrator"),
            Participant::Agent(id) => write!(f, "agent:{}", id),
            Participant::Human => write!(f, "human"),
            Participant::Ui => write!(f, "ui"),
            Participant::Ledger => write!(f, "ledger"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_action_lookup() {
        assert_eq!(
            ForbiddenAction::from_name(" Write_Timeline "),
            Some(ForbiddenAction::WriteTimeline)
        );
        assert_eq!(ForbiddenAction::from_name("summarize_notes"), None);
    }

    #[test]
    fn test_sensitivity_ordering_and_parse() {
        assert!(Sensitivity::Critical > Sensitivity::High);
        assert_eq!("MEDIUM".parse::<Sensitivity>().unwrap(), Sensitivity::Medium);
        assert!("extreme".parse::<Sensitivity>().is_err());
    }

    #[test]
    fn test_violation_type_wire_name() {
        let json = serde_json::to_string(&ViolationType::ImperativeLanguage).unwrap();
        assert_eq!(json, "\"IMPERATIVE_LANGUAGE\"");
    }
}
