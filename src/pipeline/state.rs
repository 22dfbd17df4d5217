//! Per-intent pipeline state
//!
//! Each intent owns one of these, created at `start_think` and disposed once
//! its version is minted or it is cancelled. Nothing here is shared between
//! intents, so one intent's review queue can never hold up another.

use crate::error::{GovernanceError, GovernanceResult};
use crate::pipeline::phase::{check_transition, Phase};
use crate::pipeline::types::{Intent, IntentStatus, SessionStatus, WorkSession};
use serde::Serialize;
use std::collections::VecDeque;
use uuid::Uuid;

/// A phase skipped because a checkpoint was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedPhase {
    pub phase: Phase,
    pub checkpoint_id: Uuid,
    pub reason: String,
}

/// Checkpoint currently holding the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pause {
    pub checkpoint_id: Uuid,
    pub phase: Phase,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub intent: Intent,
    pub phase: Phase,
    pub session: Option<WorkSession>,
    /// Staged content produced by work but not yet shown to a human
    pub candidate: Option<Uuid>,
    /// Staged content visible to reviewers, oldest first
    pub review_queue: VecDeque<Uuid>,
    pub accepted_review: Option<Uuid>,
    pub minted_version: Option<Uuid>,
    pub paused: Option<Pause>,
    pub blocked: Vec<BlockedPhase>,
}

impl PipelineState {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            phase: Phase::Think,
            session: None,
            candidate: None,
            review_queue: VecDeque::new(),
            accepted_review: None,
            minted_version: None,
            paused: None,
            blocked: Vec::new(),
        }
    }

    pub fn has_active_session(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| !s.status.is_terminal())
            .unwrap_or(false)
    }

    /// Refuse any forward progress while terminal or held by a checkpoint
    pub fn ensure_open(&self) -> GovernanceResult<()> {
        if self.intent.status.is_terminal() {
            return Err(GovernanceError::Validation(format!(
                "Intent {} is {:?}",
                self.intent.id, self.intent.status
            )));
        }
        if let Some(pause) = &self.paused {
            return Err(GovernanceError::Validation(format!(
                "Intent {} is waiting on checkpoint {}",
                self.intent.id, pause.checkpoint_id
            )));
        }
        Ok(())
    }

    pub fn ensure_phase(&self, expected: Phase) -> GovernanceResult<()> {
        if self.phase != expected {
            return Err(GovernanceError::Validation(format!(
                "Intent {} is in {} (expected {})",
                self.intent.id, self.phase, expected
            )));
        }
        Ok(())
    }

    /// Condition that must hold before leaving the current phase for `to`
    fn guard(&self, to: Phase) -> Result<(), String> {
        match (self.phase, to) {
            (Phase::Think, Phase::Work) => {
                if self.intent.status == IntentStatus::Submitted {
                    Ok(())
                } else {
                    Err("intent has not been submitted".to_string())
                }
            }
            (Phase::Work, Phase::Assist) => match &self.session {
                Some(s) if s.status == SessionStatus::Completed => Ok(()),
                _ => Err("no completed work session".to_string()),
            },
            (Phase::Assist, Phase::Staging) => {
                if self.candidate.is_some() {
                    Ok(())
                } else {
                    Err("no pending staged content".to_string())
                }
            }
            (Phase::Staging, Phase::Review) => {
                if self.review_queue.is_empty() {
                    Err("no pending staged content".to_string())
                } else {
                    Ok(())
                }
            }
            (Phase::Review, Phase::Version) => {
                if !self.review_queue.is_empty() {
                    Err(format!("{} item(s) still awaiting review", self.review_queue.len()))
                } else if self.accepted_review.is_none() {
                    Err("no accepted review for this pass".to_string())
                } else {
                    Ok(())
                }
            }
            (Phase::Version, Phase::Think) => {
                if self.minted_version.is_some() {
                    Ok(())
                } else {
                    Err("no version minted for this pass".to_string())
                }
            }
            _ => Err("transition not in table".to_string()),
        }
    }

    /// Move to `to` if the table allows it and the guard holds.
    /// On failure the phase is left untouched.
    pub fn advance(&mut self, to: Phase) -> GovernanceResult<Phase> {
        check_transition(self.phase, to)?;
        if let Some(pause) = &self.paused {
            return Err(GovernanceError::Validation(format!(
                "Cannot leave {} while checkpoint {} is pending",
                self.phase, pause.checkpoint_id
            )));
        }
        self.guard(to).map_err(|reason| {
            GovernanceError::Validation(format!(
                "Cannot advance {} -> {}: {}",
                self.phase, to, reason
            ))
        })?;
        self.phase = to;
        Ok(to)
    }

    /// Return to THINK after a rejected checkpoint. Every phase after the
    /// paused one is recorded as blocked and the intent goes back to draft.
    pub fn block_after(&mut self, pause: Pause, reason: &str) {
        for phase in pause.phase.later_phases() {
            self.blocked.push(BlockedPhase {
                phase,
                checkpoint_id: pause.checkpoint_id,
                reason: reason.to_string(),
            });
        }

        if let Some(session) = self.session.as_mut() {
            if !session.status.is_terminal() {
                session.failure = Some("checkpoint rejected".to_string());
                session.finish(SessionStatus::Failed);
            }
        }
        self.candidate = None;
        self.review_queue.clear();
        self.accepted_review = None;
        self.paused = None;
        self.phase = Phase::Think;
        self.intent.set_status(IntentStatus::Draft);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PipelineState {
        PipelineState::new(Intent::new(
            "business".to_string(),
            "Q4 report".to_string(),
            "alice".to_string(),
        ))
    }

    #[test]
    fn test_draft_intent_cannot_leave_think() {
        let mut state = state();
        assert!(state.advance(Phase::Work).is_err());
        assert_eq!(state.phase, Phase::Think);
    }

    #[test]
    fn test_skip_is_rejected_without_mutation() {
        let mut state = state();
        state.intent.set_status(IntentStatus::Submitted);
        assert!(state.advance(Phase::Staging).is_err());
        assert_eq!(state.phase, Phase::Think);
        assert_eq!(state.advance(Phase::Work).unwrap(), Phase::Work);
    }

    #[test]
    fn test_review_to_version_requires_empty_queue_and_accept() {
        let mut state = state();
        state.phase = Phase::Review;
        state.review_queue.push_back(Uuid::new_v4());
        state.accepted_review = Some(Uuid::new_v4());
        assert!(state.advance(Phase::Version).is_err());

        state.review_queue.clear();
        assert!(state.advance(Phase::Version).is_ok());
    }

    #[test]
    fn test_pause_blocks_advance() {
        let mut state = state();
        state.intent.set_status(IntentStatus::Submitted);
        state.paused = Some(Pause {
            checkpoint_id: Uuid::new_v4(),
            phase: Phase::Think,
        });
        assert!(state.advance(Phase::Work).is_err());
        assert!(state.ensure_open().is_err());
    }

    #[test]
    fn test_block_after_resets_to_draft() {
        let mut state = state();
        state.intent.set_status(IntentStatus::Processing);
        state.phase = Phase::Assist;
        state.candidate = Some(Uuid::new_v4());
        let pause = Pause {
            checkpoint_id: Uuid::new_v4(),
            phase: Phase::Assist,
        };
        state.paused = Some(pause);

        state.block_after(pause, "declined");

        assert_eq!(state.phase, Phase::Think);
        assert_eq!(state.intent.status, IntentStatus::Draft);
        assert_eq!(state.blocked.len(), 3);
        assert!(state.candidate.is_none());
        assert!(state.paused.is_none());
    }
}
