//! Orchestrator Module
//!
//! The single entry point for agent activity. It holds no domain knowledge
//! and no ledger handle; it only routes intentions to registered handlers
//! and returns neutral options for a human to validate.

pub mod dispatch;
pub mod registry;

pub use dispatch::{AgentOption, Orchestrator, OrchestratorResponse};
pub use registry::{AgentHandler, AgentInput, AgentOutput, AgentRegistry};
