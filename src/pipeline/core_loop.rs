//! Core Loop
//!
//! Drives every intent through THINK → WORK → ASSIST → STAGING → REVIEW →
//! VERSION. State is sharded per intent: each pipeline sits behind its own
//! mutex and is dropped from the active map once its version is minted or it
//! is cancelled.
//!
//! Invariants enforced here:
//! - at most one non-terminal work session per intent
//! - agent output becomes human-visible only through `stage_content`
//! - a version is minted only from an `accept` review, never otherwise
//! - a pipeline held by a checkpoint makes no forward progress

use crate::audit::{AuditAction, AuditEntry, AuditLog};
use crate::checkpoint::{Checkpoint, CheckpointGate, CheckpointOutcome, RaiseCheckpoint};
use crate::error::{
    conflict_error, not_found_error, validation_error, GovernanceError, GovernanceResult,
};
use crate::ledger::{NewVersion, Version, VersionLedger};
use crate::pipeline::phase::Phase;
use crate::pipeline::sandbox::{new_sandbox_id, SandboxContext, WorkExecutor, WorkOutput};
use crate::pipeline::staging::StagingStore;
use crate::pipeline::state::{Pause, PipelineState};
use crate::pipeline::types::*;
use crate::policy::{classify_actions, PendingAction, PolicyGuard};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

type SharedPipeline = Arc<Mutex<PipelineState>>;

/// Action name under which sandboxed work runs through the policy guard
const EXECUTE_WORK_ACTION: &str = "execute_work";

pub struct CoreLoop {
    /// Intent id -> live pipeline
    pipelines: RwLock<HashMap<Uuid, SharedPipeline>>,
    /// Intents whose pipeline has been disposed
    archive: RwLock<HashMap<Uuid, Intent>>,
    /// Session id -> intent id
    sessions: RwLock<HashMap<Uuid, Uuid>>,
    reviews: RwLock<HashMap<Uuid, ReviewDecision>>,
    staging: StagingStore,
    ledger: Arc<VersionLedger>,
    guard: Arc<PolicyGuard>,
    gate: Arc<CheckpointGate>,
    audit: Arc<AuditLog>,
    /// Known partitions; empty accepts any
    partitions: Vec<String>,
}

impl CoreLoop {
    pub fn new(
        ledger: Arc<VersionLedger>,
        guard: Arc<PolicyGuard>,
        gate: Arc<CheckpointGate>,
        audit: Arc<AuditLog>,
        partitions: Vec<String>,
    ) -> Self {
        Self {
            pipelines: RwLock::new(HashMap::new()),
            archive: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            reviews: RwLock::new(HashMap::new()),
            staging: StagingStore::new(),
            ledger,
            guard,
            gate,
            audit,
            partitions,
        }
    }

    pub fn ledger(&self) -> &Arc<VersionLedger> {
        &self.ledger
    }

    pub fn guard(&self) -> &Arc<PolicyGuard> {
        &self.guard
    }

    pub fn gate(&self) -> &Arc<CheckpointGate> {
        &self.gate
    }

    async fn pipeline(&self, intent_id: Uuid) -> GovernanceResult<SharedPipeline> {
        self.pipelines
            .read()
            .await
            .get(&intent_id)
            .cloned()
            .ok_or_else(|| not_found_error(format!("No active pipeline for intent {}", intent_id)))
    }

    async fn session_intent(&self, session_id: Uuid) -> GovernanceResult<Uuid> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .copied()
            .ok_or_else(|| not_found_error(format!("Work session {} not found", session_id)))
    }

    async fn dispose(&self, intent: Intent) {
        self.pipelines.write().await.remove(&intent.id);
        debug!("Disposed pipeline for intent {}", intent.id);
        self.archive.write().await.insert(intent.id, intent);
    }

    fn check_partition(&self, partition: &str) -> GovernanceResult<()> {
        if partition.is_empty() {
            return Err(GovernanceError::Configuration("Partition id is required".to_string()));
        }
        if !self.partitions.is_empty() && !self.partitions.iter().any(|p| p == partition) {
            return Err(GovernanceError::Configuration(format!(
                "Unknown partition '{}'",
                partition
            )));
        }
        Ok(())
    }

    // =========================================================================
    // THINK
    // =========================================================================

    /// Capture a new draft intent and open its pipeline in THINK
    pub async fn start_think(
        &self,
        partition: &str,
        description: &str,
        created_by: &str,
    ) -> GovernanceResult<Intent> {
        let partition = partition.trim();
        self.check_partition(partition)?;
        if description.trim().is_empty() {
            return Err(validation_error("Intent description cannot be empty"));
        }

        let intent = Intent::new(
            partition.to_string(),
            description.trim().to_string(),
            created_by.to_string(),
        );
        self.pipelines.write().await.insert(
            intent.id,
            Arc::new(Mutex::new(PipelineState::new(intent.clone()))),
        );

        self.audit
            .record(
                AuditEntry::new(created_by, AuditAction::IntentCreated, "intent", Some(intent.id))
                    .with_details(serde_json::json!({ "partition": intent.partition })),
            )
            .await;

        info!("Captured intent {} in partition '{}'", intent.id, intent.partition);
        Ok(intent)
    }

    /// Flip a draft intent to submitted and advance THINK → WORK.
    /// Returns false when the intent is not in a submittable state.
    pub async fn submit_intent(&self, intent_id: Uuid, submitted_by: &str) -> GovernanceResult<bool> {
        let pipeline = self.pipeline(intent_id).await?;
        let mut state = pipeline.lock().await;

        if let Err(e) = state.ensure_open() {
            warn!("Refusing to submit intent {}: {}", intent_id, e);
            return Ok(false);
        }
        if state.phase != Phase::Think || state.intent.status != IntentStatus::Draft {
            warn!(
                "Refusing to submit intent {} in {} with status {:?}",
                intent_id, state.phase, state.intent.status
            );
            return Ok(false);
        }

        state.intent.set_status(IntentStatus::Submitted);
        if let Err(e) = state.advance(Phase::Work) {
            state.intent.set_status(IntentStatus::Draft);
            warn!("Submitted intent {} could not enter WORK: {}", intent_id, e);
            return Ok(false);
        }
        drop(state);

        self.audit
            .record(AuditEntry::new(submitted_by, AuditAction::IntentSubmitted, "intent", Some(intent_id)))
            .await;
        info!("Intent {} submitted", intent_id);
        Ok(true)
    }

    // =========================================================================
    // WORK
    // =========================================================================

    /// Open a sandboxed work session. Fails if one is already active.
    pub async fn start_work(&self, intent_id: Uuid, agent_id: &str) -> GovernanceResult<WorkSession> {
        let agent_id = agent_id.trim();
        if agent_id.is_empty() {
            return Err(validation_error("Work sessions need an agent id"));
        }

        let pipeline = self.pipeline(intent_id).await?;
        let mut state = pipeline.lock().await;
        state.ensure_open()?;
        state.ensure_phase(Phase::Work)?;

        if state.has_active_session() {
            return Err(conflict_error(format!(
                "Intent {} already has an active work session",
                intent_id
            )));
        }

        let session = WorkSession {
            id: Uuid::new_v4(),
            intent_id,
            sandbox_id: new_sandbox_id(),
            agent_id: agent_id.to_string(),
            status: SessionStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            staged_content_id: None,
            failure: None,
        };
        state.session = Some(session.clone());
        state.intent.set_status(IntentStatus::Processing);
        drop(state);

        self.sessions.write().await.insert(session.id, intent_id);
        self.audit
            .record(
                AuditEntry::new(agent_id, AuditAction::WorkStarted, "work_session", Some(session.id))
                    .with_details(serde_json::json!({ "intentId": intent_id, "sandboxId": session.sandbox_id })),
            )
            .await;

        info!(
            "Started work session {} for intent {} in sandbox {}",
            session.id, intent_id, session.sandbox_id
        );
        Ok(session)
    }

    /// What the executor of a session is allowed to see
    pub async fn sandbox_context(&self, session_id: Uuid) -> GovernanceResult<SandboxContext> {
        let intent_id = self.session_intent(session_id).await?;
        let pipeline = self.pipeline(intent_id).await?;
        let state = pipeline.lock().await;
        let session = state
            .session
            .as_ref()
            .filter(|s| s.id == session_id)
            .ok_or_else(|| validation_error(format!("Session {} is no longer current", session_id)))?;

        Ok(SandboxContext {
            sandbox_id: session.sandbox_id.clone(),
            session_id,
            intent_id,
            partition: state.intent.partition.clone(),
            agent_id: session.agent_id.clone(),
            description: state.intent.description.clone(),
        })
    }

    /// Run an executor inside the session's sandbox, then stage its output
    /// as the session result. Executor failure fails the session.
    pub async fn run_work(
        &self,
        session_id: Uuid,
        executor: &dyn WorkExecutor,
    ) -> GovernanceResult<StagedContent> {
        let context = self.sandbox_context(session_id).await?;
        let agent_id = context.agent_id.clone();

        let outcome = self
            .guard
            .guard_agent_action(&agent_id, EXECUTE_WORK_ACTION, || executor.execute(&context))
            .await;

        match outcome {
            Some(Ok(output)) => self.complete_work(session_id, output).await,
            Some(Err(e)) => {
                self.fail_work(session_id, &e.to_string()).await?;
                Err(e)
            }
            None => {
                self.fail_work(session_id, "blocked by policy").await?;
                Err(GovernanceError::PolicyViolation(format!(
                    "Agent {} was not permitted to execute work",
                    agent_id
                )))
            }
        }
    }

    /// Attach the session output as new staged content and advance to ASSIST
    pub async fn complete_work(
        &self,
        session_id: Uuid,
        output: WorkOutput,
    ) -> GovernanceResult<StagedContent> {
        if !(0.0..=1.0).contains(&output.confidence) {
            return Err(validation_error("Confidence must be between 0 and 1"));
        }

        let intent_id = self.session_intent(session_id).await?;
        let pipeline = self.pipeline(intent_id).await?;
        let mut state = pipeline.lock().await;
        state.ensure_open()?;
        state.ensure_phase(Phase::Work)?;

        let session = state
            .session
            .as_mut()
            .filter(|s| s.id == session_id)
            .ok_or_else(|| validation_error(format!("Session {} is no longer current", session_id)))?;
        if session.status != SessionStatus::Running {
            return Err(validation_error(format!(
                "Session {} is {:?}, not running",
                session_id, session.status
            )));
        }

        let staged = StagedContent {
            id: Uuid::new_v4(),
            intent_id,
            session_id,
            payload: output.payload,
            metadata: StagedMetadata {
                agent_id: session.agent_id.clone(),
                confidence: output.confidence,
                warnings: output.warnings,
            },
            created_at: Utc::now(),
        };
        session.staged_content_id = Some(staged.id);
        session.finish(SessionStatus::Completed);

        state.candidate = Some(staged.id);
        state.advance(Phase::Assist)?;
        let staged = self.staging.insert(staged).await;
        drop(state);

        self.audit
            .record(
                AuditEntry::new(
                    staged.metadata.agent_id.as_str(),
                    AuditAction::WorkCompleted,
                    "work_session",
                    Some(session_id),
                )
                .with_details(serde_json::json!({ "stagedContentId": staged.id })),
            )
            .await;

        info!("Work session {} completed, staged content {}", session_id, staged.id);
        Ok(staged)
    }

    /// Mark a running session failed. The intent stays in WORK and a new
    /// session may be started.
    pub async fn fail_work(&self, session_id: Uuid, reason: &str) -> GovernanceResult<WorkSession> {
        let intent_id = self.session_intent(session_id).await?;
        let pipeline = self.pipeline(intent_id).await?;
        let mut state = pipeline.lock().await;

        let session = state
            .session
            .as_mut()
            .filter(|s| s.id == session_id)
            .ok_or_else(|| validation_error(format!("Session {} is no longer current", session_id)))?;
        if session.status.is_terminal() {
            return Err(validation_error(format!("Session {} already finished", session_id)));
        }
        session.failure = Some(reason.to_string());
        session.finish(SessionStatus::Failed);
        let session = session.clone();
        drop(state);

        self.audit
            .record(
                AuditEntry::new(session.agent_id.as_str(), AuditAction::WorkFailed, "work_session", Some(session_id))
                    .with_details(serde_json::json!({ "reason": reason })),
            )
            .await;
        warn!("Work session {} failed: {}", session_id, reason);
        Ok(session)
    }

    // =========================================================================
    // ASSIST / STAGING
    // =========================================================================

    /// Put the candidate in front of reviewers. ASSIST → STAGING → REVIEW.
    pub async fn stage_content(&self, intent_id: Uuid) -> GovernanceResult<StagedContent> {
        let pipeline = self.pipeline(intent_id).await?;
        let mut state = pipeline.lock().await;
        state.ensure_open()?;
        state.ensure_phase(Phase::Assist)?;

        let candidate = state
            .candidate
            .ok_or_else(|| validation_error(format!("Intent {} has no candidate to stage", intent_id)))?;

        state.advance(Phase::Staging)?;
        state.review_queue.push_back(candidate);
        state.candidate = None;
        state.advance(Phase::Review)?;
        drop(state);

        let staged = self.staging.get(candidate).await?;
        self.audit
            .record(AuditEntry::new("system", AuditAction::ContentStaged, "staged_content", Some(candidate)))
            .await;
        info!("Staged content {} for review on intent {}", candidate, intent_id);
        Ok(staged)
    }

    // =========================================================================
    // REVIEW
    // =========================================================================

    /// Consume one pending item with a human decision.
    ///
    /// Accept advances to VERSION once the queue is empty; every other
    /// decision leaves the intent in REVIEW. Durable state is never touched.
    pub async fn submit_review(
        &self,
        staged_content_id: Uuid,
        decision: Decision,
        reviewer_id: &str,
        rationale: Option<String>,
    ) -> GovernanceResult<ReviewDecision> {
        if reviewer_id.trim().is_empty() {
            return Err(validation_error("A review must be attributed to a human reviewer"));
        }

        let staged = self.staging.get(staged_content_id).await?;
        let pipeline = self.pipeline(staged.intent_id).await.map_err(|_| {
            conflict_error(format!("Intent {} is no longer under review", staged.intent_id))
        })?;
        let mut state = pipeline.lock().await;
        state.ensure_open()?;
        state.ensure_phase(Phase::Review)?;

        let position = state
            .review_queue
            .iter()
            .position(|id| *id == staged_content_id)
            .ok_or_else(|| {
                conflict_error(format!("Staged content {} is not awaiting review", staged_content_id))
            })?;

        let review = ReviewDecision {
            id: Uuid::new_v4(),
            staged_content_id,
            intent_id: staged.intent_id,
            decision,
            reviewer_id: reviewer_id.to_string(),
            rationale,
            decided_at: Utc::now(),
        };

        self.staging.consume(staged_content_id, review.id).await?;
        state.review_queue.remove(position);

        if review.is_accept() && state.accepted_review.is_none() {
            state.accepted_review = Some(review.id);
        }
        if state.accepted_review.is_some() && state.review_queue.is_empty() {
            state.advance(Phase::Version)?;
        }
        let phase = state.phase;
        drop(state);

        self.reviews.write().await.insert(review.id, review.clone());
        self.audit
            .record(
                AuditEntry::new(reviewer_id, AuditAction::ReviewSubmitted, "review", Some(review.id))
                    .with_details(serde_json::json!({
                        "stagedContentId": staged_content_id,
                        "decision": review.decision,
                    })),
            )
            .await;

        info!(
            "Review {} on {}: {:?} (intent {} now in {})",
            review.id, staged_content_id, review.decision, review.intent_id, phase
        );
        Ok(review)
    }

    // =========================================================================
    // VERSION
    // =========================================================================

    /// Mint a version from an accepted review.
    ///
    /// Returns `Ok(None)` for any review that is not an accept. Ledger
    /// integrity failures propagate.
    pub async fn create_version(&self, review_id: Uuid) -> GovernanceResult<Option<Version>> {
        let review = self
            .reviews
            .read()
            .await
            .get(&review_id)
            .cloned()
            .ok_or_else(|| not_found_error(format!("Review {} not found", review_id)))?;

        if !review.is_accept() {
            warn!(
                "Refusing to version review {} with decision {:?}",
                review_id, review.decision
            );
            return Ok(None);
        }

        let pipeline = self.pipeline(review.intent_id).await.map_err(|_| {
            conflict_error(format!(
                "Intent {} has no open pipeline; its version may already exist",
                review.intent_id
            ))
        })?;
        let mut state = pipeline.lock().await;
        state.ensure_open()?;
        if state.accepted_review != Some(review_id) {
            warn!("Review {} is not the accepted review of its pass", review_id);
            return Ok(None);
        }
        state.ensure_phase(Phase::Version)?;

        let staged = self.staging.get(review.staged_content_id).await?;
        let version = self
            .ledger
            .append(NewVersion {
                partition: state.intent.partition.clone(),
                intent_id: review.intent_id,
                review_id,
                approved_by: review.reviewer_id.clone(),
                content: staged.payload,
            })
            .await?;

        state.minted_version = Some(version.id());
        state.advance(Phase::Think)?;
        state.session = None;
        state.candidate = None;
        state.accepted_review = None;
        state.intent.set_status(IntentStatus::Completed);
        let intent = state.intent.clone();
        drop(state);

        self.dispose(intent).await;
        self.audit
            .record(
                AuditEntry::new(review.reviewer_id.as_str(), AuditAction::VersionCreated, "version", Some(version.id()))
                    .with_details(serde_json::json!({
                        "partition": version.partition(),
                        "versionNumber": version.version_number(),
                        "checksum": version.checksum(),
                    })),
            )
            .await;

        Ok(Some(version))
    }

    // =========================================================================
    // PHASE CONTROL
    // =========================================================================

    /// Explicit phase request. Anything but the next adjacent phase, or a
    /// move whose condition does not hold, is rejected and changes nothing.
    pub async fn advance_phase(&self, intent_id: Uuid, target: Phase) -> GovernanceResult<Phase> {
        let pipeline = self.pipeline(intent_id).await?;
        let mut state = pipeline.lock().await;
        let from = state.phase;
        let to = state.advance(target)?;
        debug!("Intent {} advanced {} -> {}", intent_id, from, to);
        Ok(to)
    }

    /// Human cancellation, allowed at any point before VERSION
    pub async fn cancel_intent(
        &self,
        intent_id: Uuid,
        cancelled_by: &str,
        reason: Option<String>,
    ) -> GovernanceResult<Intent> {
        let pipeline = self.pipeline(intent_id).await?;
        let mut state = pipeline.lock().await;

        if state.phase == Phase::Version {
            return Err(validation_error(format!(
                "Intent {} has accepted content awaiting its version",
                intent_id
            )));
        }

        if let Some(session) = state.session.as_mut() {
            if !session.status.is_terminal() {
                session.failure = Some("intent cancelled".to_string());
                session.finish(SessionStatus::Failed);
            }
        }
        state.candidate = None;
        state.review_queue.clear();
        state.intent.set_status(IntentStatus::Cancelled);
        let intent = state.intent.clone();
        drop(state);

        self.dispose(intent.clone()).await;
        self.audit
            .record(
                AuditEntry::new(cancelled_by, AuditAction::IntentCancelled, "intent", Some(intent_id))
                    .with_details(serde_json::json!({ "reason": reason })),
            )
            .await;
        info!("Intent {} cancelled by {}", intent_id, cancelled_by);
        Ok(intent)
    }

    // =========================================================================
    // CHECKPOINTS
    // =========================================================================

    /// Raise a checkpoint. When bound to an intent, that pipeline pauses in
    /// its current phase until the checkpoint is resolved.
    pub async fn raise_checkpoint(&self, request: RaiseCheckpoint) -> GovernanceResult<Checkpoint> {
        let Some(intent_id) = request.intent_id else {
            return Ok(self.gate.raise(request).await);
        };

        let pipeline = self.pipeline(intent_id).await?;
        let mut state = pipeline.lock().await;
        state.ensure_open()?;

        let checkpoint = self.gate.raise(request).await;
        let phase = state.phase;
        state.paused = Some(Pause {
            checkpoint_id: checkpoint.id,
            phase,
        });
        if let Some(session) = state.session.as_mut() {
            if session.status == SessionStatus::Running {
                session.status = SessionStatus::Paused;
            }
        }

        info!("Intent {} paused in {} by checkpoint {}", intent_id, phase, checkpoint.id);
        Ok(checkpoint)
    }

    /// Classify a continuation and raise a checkpoint if it crosses the
    /// gate's threshold
    pub async fn gate_continuation(
        &self,
        intent_id: Uuid,
        pending_actions: Vec<PendingAction>,
        candidate_message: Option<String>,
    ) -> GovernanceResult<Option<Checkpoint>> {
        let sensitivity = classify_actions(&pending_actions);
        if !self.gate.requires_checkpoint(sensitivity) {
            debug!("Continuation for intent {} is {}; no checkpoint needed", intent_id, sensitivity);
            return Ok(None);
        }

        self.raise_checkpoint(RaiseCheckpoint {
            intent_id: Some(intent_id),
            sensitivity,
            pending_actions,
            candidate_message,
        })
        .await
        .map(Some)
    }

    /// Resolve a checkpoint and apply the outcome to its paused pipeline.
    ///
    /// Approve resumes in the paused phase. Reject blocks every later phase,
    /// returns the intent to draft and requires a fresh submission.
    pub async fn resolve_checkpoint(
        &self,
        checkpoint_id: Uuid,
        outcome: CheckpointOutcome,
        resolved_by: &str,
        reason: Option<String>,
    ) -> GovernanceResult<Checkpoint> {
        let checkpoint = self
            .gate
            .resolve(checkpoint_id, outcome, resolved_by, reason)
            .await?;

        let Some(intent_id) = checkpoint.intent_id else {
            return Ok(checkpoint);
        };
        let Some(pipeline) = self.pipelines.read().await.get(&intent_id).cloned() else {
            debug!("Checkpoint {} resolved after intent {} closed", checkpoint_id, intent_id);
            return Ok(checkpoint);
        };

        let mut state = pipeline.lock().await;
        match state.paused.filter(|p| p.checkpoint_id == checkpoint_id) {
            Some(pause) => match outcome {
                CheckpointOutcome::Approved => {
                    state.paused = None;
                    if let Some(session) = state.session.as_mut() {
                        if session.status == SessionStatus::Paused {
                            session.status = SessionStatus::Running;
                        }
                    }
                    info!("Intent {} resumed in {}", intent_id, pause.phase);
                }
                CheckpointOutcome::Rejected => {
                    let reason = checkpoint
                        .resolution
                        .as_ref()
                        .and_then(|r| r.reason.clone())
                        .unwrap_or_else(|| "Declined at checkpoint".to_string());
                    state.block_after(pause, &reason);
                    info!(
                        "Intent {} returned to draft after checkpoint {} was rejected",
                        intent_id, checkpoint_id
                    );
                }
            },
            None => debug!("Checkpoint {} was not holding intent {}", checkpoint_id, intent_id),
        }

        Ok(checkpoint)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Current phase. Disposed pipelines have wrapped back to THINK.
    pub async fn phase(&self, intent_id: Uuid) -> Option<Phase> {
        if let Ok(pipeline) = self.pipeline(intent_id).await {
            return Some(pipeline.lock().await.phase);
        }
        self.archive
            .read()
            .await
            .contains_key(&intent_id)
            .then_some(Phase::Think)
    }

    pub async fn intent(&self, intent_id: Uuid) -> Option<Intent> {
        if let Ok(pipeline) = self.pipeline(intent_id).await {
            return Some(pipeline.lock().await.intent.clone());
        }
        self.archive.read().await.get(&intent_id).cloned()
    }

    /// Full view of a live pipeline
    pub async fn snapshot(&self, intent_id: Uuid) -> Option<PipelineState> {
        let pipeline = self.pipeline(intent_id).await.ok()?;
        let state = pipeline.lock().await;
        Some(state.clone())
    }

    pub async fn pending_review_count(&self, intent_id: Uuid) -> usize {
        match self.pipeline(intent_id).await {
            Ok(pipeline) => pipeline.lock().await.review_queue.len(),
            Err(_) => 0,
        }
    }

    /// Items awaiting review for an intent, oldest first
    pub async fn pending_reviews(&self, intent_id: Uuid) -> Vec<StagedContent> {
        let ids: Vec<Uuid> = match self.pipeline(intent_id).await {
            Ok(pipeline) => pipeline.lock().await.review_queue.iter().copied().collect(),
            Err(_) => return Vec::new(),
        };

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Ok(item) = self.staging.get(id).await {
                items.push(item);
            }
        }
        items
    }

    pub async fn staged_content(&self, staged_content_id: Uuid) -> GovernanceResult<StagedContent> {
        self.staging.get(staged_content_id).await
    }

    pub async fn staged_review_id(&self, staged_content_id: Uuid) -> Option<Uuid> {
        self.staging.consumed_by(staged_content_id).await
    }

    pub async fn review(&self, review_id: Uuid) -> Option<ReviewDecision> {
        self.reviews.read().await.get(&review_id).cloned()
    }

    pub async fn active_intents(&self) -> Vec<Intent> {
        let pipelines: Vec<SharedPipeline> = self.pipelines.read().await.values().cloned().collect();
        let mut intents = Vec::with_capacity(pipelines.len());
        for pipeline in pipelines {
            intents.push(pipeline.lock().await.intent.clone());
        }
        intents.sort_by_key(|i| i.created_at);
        intents
    }
}
