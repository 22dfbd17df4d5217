//! Application state management
//!
//! Contains the engine components shared across all handlers. Everything
//! lives in memory; the ledger, policy guard and checkpoint gate are shared
//! between the core loop and the orchestrator.

use crate::audit::AuditLog;
use crate::checkpoint::CheckpointGate;
use crate::config::Settings;
use crate::idempotency::IdempotencyStore;
use crate::ledger::VersionLedger;
use crate::orchestrator::Orchestrator;
use crate::pipeline::CoreLoop;
use crate::policy::PolicyGuard;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Phase state machine, sharded per intent
    pub core: CoreLoop,

    /// Agent dispatch; holds no ledger handle
    pub orchestrator: Orchestrator,

    /// Append-only record of human and pipeline actions
    pub audit: Arc<AuditLog>,

    /// Replay cache for reviews and checkpoint resolutions
    pub idempotency: IdempotencyStore,

    /// JWT secret key for token validation
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let audit = Arc::new(AuditLog::new());
        let guard = Arc::new(PolicyGuard::new());
        let gate = Arc::new(CheckpointGate::new(
            settings.governance.checkpoint_threshold,
            settings.governance.default_checkpoint_message.clone(),
            audit.clone(),
        ));

        let core = CoreLoop::new(
            Arc::new(VersionLedger::new()),
            guard.clone(),
            gate,
            audit.clone(),
            settings.governance.partitions.clone(),
        );

        Self {
            core,
            orchestrator: Orchestrator::new(guard, settings.governance.confidence_floor),
            audit,
            idempotency: IdempotencyStore::new(),
            jwt_secret: settings.auth.jwt_secret.clone(),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
