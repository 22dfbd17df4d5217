//! Agent handler registry
//!
//! A dynamic agent id → handler map. Handlers are opaque: the orchestrator
//! knows nothing about what they compute.

use crate::error::{GovernanceError, GovernanceResult};
use crate::policy::Participant;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// A human intention as handed to agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInput {
    pub intention: String,
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub intent_id: Option<Uuid>,
    #[serde(default)]
    pub context: serde_json::Value,
}

impl AgentInput {
    pub fn new(intention: impl Into<String>) -> Self {
        Self {
            intention: intention.into(),
            partition: None,
            intent_id: None,
            context: serde_json::Value::Null,
        }
    }
}

/// What a handler hands back to the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOutput {
    pub suggestions: Vec<String>,
    pub confidence: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Where the agent wants its output delivered. `None` is the orchestrator.
    #[serde(default)]
    pub recipient: Option<Participant>,
}

impl AgentOutput {
    pub fn new(suggestions: Vec<String>, confidence: f64) -> Self {
        Self {
            suggestions,
            confidence,
            warnings: Vec::new(),
            recipient: None,
        }
    }
}

#[async_trait]
pub trait AgentHandler: Send + Sync {
    async fn produce(&self, input: &AgentInput) -> GovernanceResult<AgentOutput>;

    /// Whether this handler is relevant to the input
    fn handles(&self, _input: &AgentInput) -> bool {
        true
    }
}

pub struct AgentRegistry {
    /// Ordered so dispatch order is stable
    handlers: RwLock<BTreeMap<String, Arc<dyn AgentHandler>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a handler, replacing any previous one under the same id
    pub async fn register(
        &self,
        agent_id: &str,
        handler: Arc<dyn AgentHandler>,
    ) -> GovernanceResult<()> {
        let agent_id = agent_id.trim();
        if agent_id.is_empty() {
            return Err(GovernanceError::Configuration(
                "Agent id cannot be empty".to_string(),
            ));
        }

        let mut handlers = self.handlers.write().await;
        if handlers.insert(agent_id.to_string(), handler).is_some() {
            warn!("Replaced handler for agent '{}'", agent_id);
        } else {
            info!("Registered agent '{}'", agent_id);
        }
        Ok(())
    }

    pub async fn unregister(&self, agent_id: &str) -> GovernanceResult<()> {
        let mut handlers = self.handlers.write().await;
        match handlers.remove(agent_id) {
            Some(_) => {
                info!("Unregistered agent '{}'", agent_id);
                Ok(())
            }
            None => Err(GovernanceError::Configuration(format!(
                "Agent '{}' is not registered",
                agent_id
            ))),
        }
    }

    pub async fn agent_ids(&self) -> Vec<String> {
        self.handlers.read().await.keys().cloned().collect()
    }

    /// Handlers relevant to the input, in id order
    pub async fn relevant(&self, input: &AgentInput) -> Vec<(String, Arc<dyn AgentHandler>)> {
        self.handlers
            .read()
            .await
            .iter()
            .filter(|(_, handler)| handler.handles(input))
            .map(|(id, handler)| (id.clone(), handler.clone()))
            .collect()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    #[async_trait]
    impl AgentHandler for Silent {
        async fn produce(&self, _input: &AgentInput) -> GovernanceResult<AgentOutput> {
            Ok(AgentOutput::new(vec![], 0.0))
        }
    }

    struct OnlyFinance;

    #[async_trait]
    impl AgentHandler for OnlyFinance {
        async fn produce(&self, _input: &AgentInput) -> GovernanceResult<AgentOutput> {
            Ok(AgentOutput::new(vec![], 0.0))
        }

        fn handles(&self, input: &AgentInput) -> bool {
            input.partition.as_deref() == Some("finance")
        }
    }

    #[tokio::test]
    async fn test_unregister_unknown_agent() {
        let registry = AgentRegistry::new();
        let result = registry.unregister("ghost").await;
        assert!(matches!(result, Err(GovernanceError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_register_and_unregister() {
        let registry = AgentRegistry::new();
        registry.register("b", Arc::new(Silent)).await.unwrap();
        registry.register("a", Arc::new(Silent)).await.unwrap();
        assert_eq!(registry.agent_ids().await, vec!["a", "b"]);

        registry.unregister("a").await.unwrap();
        assert_eq!(registry.agent_ids().await, vec!["b"]);
        assert!(registry.register("  ", Arc::new(Silent)).await.is_err());
    }

    #[tokio::test]
    async fn test_relevance_filter() {
        let registry = AgentRegistry::new();
        registry.register("general", Arc::new(Silent)).await.unwrap();
        registry.register("finance", Arc::new(OnlyFinance)).await.unwrap();

        let input = AgentInput::new("plan the offsite");
        let ids: Vec<String> = registry.relevant(&input).await.into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["general"]);
    }
}
