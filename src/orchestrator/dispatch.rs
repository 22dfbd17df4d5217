//! Intention dispatch
//!
//! Fans an intention out to the relevant handlers, runs each call through the
//! policy guard and folds whatever survives into a neutral option set. A
//! misbehaving agent is simply absent from the result; nothing here returns
//! an error to the caller.

use crate::orchestrator::registry::{AgentInput, AgentOutput, AgentRegistry};
use crate::policy::{FailSafeResponse, Participant, PolicyGuard, SuggestionVerdict};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Action name under which handler calls run through the policy guard
const PRODUCE_OPTIONS_ACTION: &str = "produce_options";

/// One hedged suggestion, attributed to the agent that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOption {
    pub agent_id: String,
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorResponse {
    pub options: Vec<AgentOption>,
    /// Always true: nothing returned here is a decision
    pub requires_validation: bool,
    pub consulted_agents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_safe: Option<FailSafeResponse>,
}

impl OrchestratorResponse {
    fn fail_safe(consulted_agents: Vec<String>, reason: &str) -> Self {
        Self {
            options: Vec::new(),
            requires_validation: true,
            consulted_agents,
            fail_safe: Some(FailSafeResponse::new(reason)),
        }
    }
}

pub struct Orchestrator {
    registry: AgentRegistry,
    guard: Arc<PolicyGuard>,
    confidence_floor: f64,
}

impl Orchestrator {
    pub fn new(guard: Arc<PolicyGuard>, confidence_floor: f64) -> Self {
        Self {
            registry: AgentRegistry::new(),
            guard,
            confidence_floor,
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn confidence_floor(&self) -> f64 {
        self.confidence_floor
    }

    pub async fn handle_intention(&self, input: &AgentInput) -> OrchestratorResponse {
        let handlers = self.registry.relevant(input).await;
        if handlers.is_empty() {
            info!("No agents available for intention; deferring to human");
            return OrchestratorResponse::fail_safe(
                Vec::new(),
                "No agents are available for this intention",
            );
        }

        let mut consulted = Vec::with_capacity(handlers.len());
        let mut options = Vec::new();
        let mut below_floor = 0usize;

        for (agent_id, handler) in handlers {
            let agent = Participant::Agent(agent_id.clone());
            if self
                .guard
                .check_communication(&Participant::Orchestrator, &agent)
                .await
                .is_err()
            {
                continue;
            }
            consulted.push(agent_id.clone());

            let output = match self
                .guard
                .guard_agent_action(&agent_id, PRODUCE_OPTIONS_ACTION, || handler.produce(input))
                .await
            {
                Some(Ok(output)) => output,
                Some(Err(e)) => {
                    warn!(agent_id = %agent_id, error = %e, "Agent failed to produce options");
                    continue;
                }
                None => continue,
            };

            if !self.deliverable(&agent, &output).await {
                continue;
            }
            if output.confidence < self.confidence_floor {
                debug!(
                    agent_id = %agent_id,
                    confidence = output.confidence,
                    "Dropping output below confidence floor"
                );
                below_floor += 1;
                continue;
            }

            for text in output.suggestions {
                match self.guard.check_suggestion(&agent_id, &text).await {
                    SuggestionVerdict::Accepted => options.push(AgentOption {
                        agent_id: agent_id.clone(),
                        text,
                        confidence: output.confidence,
                    }),
                    SuggestionVerdict::Imperative { .. } => {}
                    SuggestionVerdict::Unhedged => {
                        debug!(agent_id = %agent_id, "Dropping unhedged suggestion");
                    }
                }
            }
        }

        if options.is_empty() {
            let reason = if below_floor > 0 && below_floor == consulted.len() {
                "Agents were not confident enough to offer options"
            } else {
                "No agent produced an option that can be shown"
            };
            return OrchestratorResponse::fail_safe(consulted, reason);
        }

        info!(
            "Intention produced {} option(s) from {} agent(s)",
            options.len(),
            consulted.len()
        );
        OrchestratorResponse {
            options,
            requires_validation: true,
            consulted_agents: consulted,
            fail_safe: None,
        }
    }

    /// Output addressed anywhere but back to the orchestrator is discarded
    async fn deliverable(&self, agent: &Participant, output: &AgentOutput) -> bool {
        match &output.recipient {
            None | Some(Participant::Orchestrator) => true,
            Some(recipient) => self.guard.check_communication(agent, recipient).await.is_ok(),
        }
    }
}
