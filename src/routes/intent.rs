//! Intent Routes
//!
//! THINK through STAGING: capture, submit, work sessions and staging.

use crate::auth::{require_role, Claims, Role};
use crate::error::{not_found_error, GovernanceError};
use crate::models::{
    AdvancePhaseRequest, CancelIntentRequest, CompleteWorkRequest, CreateIntentRequest,
    FailWorkRequest, StartWorkRequest, SuccessResponse,
};
use crate::pipeline::{Intent, Phase, PipelineState, StagedContent, WorkOutput, WorkSession};
use crate::state::SharedState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

// =============================================================================
// RESPONSE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub intent: Intent,
    pub phase: Option<Phase>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentDetailResponse {
    pub intent: Intent,
    pub phase: Option<Phase>,
    pub pending_reviews: usize,
    /// Absent once the pipeline has been disposed
    pub pipeline: Option<PipelineState>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentListResponse {
    pub intents: Vec<Intent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub submitted: bool,
    pub phase: Option<Phase>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResponse {
    pub phase: Phase,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session: WorkSession,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedResponse {
    pub staged_content: StagedContent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReviewsResponse {
    pub pending: Vec<StagedContent>,
}

// =============================================================================
// THINK
// =============================================================================

pub async fn create_intent(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<IntentResponse>>), GovernanceError> {
    require_role(&claims, Role::Operator)?;
    request.validate()?;

    let intent = state
        .core
        .start_think(&request.partition, &request.description, &claims.sub)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            "Intent captured",
            IntentResponse {
                intent,
                phase: Some(Phase::Think),
            },
        )),
    ))
}

pub async fn list_intents(
    State(state): State<SharedState>,
) -> Json<SuccessResponse<IntentListResponse>> {
    let intents = state.core.active_intents().await;
    Json(SuccessResponse::with_data(
        format!("{} active intent(s)", intents.len()),
        IntentListResponse { intents },
    ))
}

pub async fn get_intent(
    State(state): State<SharedState>,
    Path(intent_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<IntentDetailResponse>>, GovernanceError> {
    let intent = state
        .core
        .intent(intent_id)
        .await
        .ok_or_else(|| not_found_error(format!("Intent {} not found", intent_id)))?;

    Ok(Json(SuccessResponse::with_data(
        "Intent retrieved",
        IntentDetailResponse {
            intent,
            phase: state.core.phase(intent_id).await,
            pending_reviews: state.core.pending_review_count(intent_id).await,
            pipeline: state.core.snapshot(intent_id).await,
        },
    )))
}

pub async fn submit_intent(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(intent_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<SubmitResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;

    let submitted = state.core.submit_intent(intent_id, &claims.sub).await?;
    let message = if submitted {
        "Intent submitted"
    } else {
        "Intent is not in a submittable state"
    };

    Ok(Json(SuccessResponse::with_data(
        message,
        SubmitResponse {
            submitted,
            phase: state.core.phase(intent_id).await,
        },
    )))
}

pub async fn cancel_intent(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(intent_id): Path<Uuid>,
    Json(request): Json<CancelIntentRequest>,
) -> Result<Json<SuccessResponse<IntentResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;
    request.validate()?;

    let intent = state
        .core
        .cancel_intent(intent_id, &claims.sub, request.reason)
        .await?;

    Ok(Json(SuccessResponse::with_data(
        "Intent cancelled",
        IntentResponse { intent, phase: None },
    )))
}

pub async fn advance_phase(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(intent_id): Path<Uuid>,
    Json(request): Json<AdvancePhaseRequest>,
) -> Result<Json<SuccessResponse<PhaseResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;

    let phase = state.core.advance_phase(intent_id, request.target).await?;
    Ok(Json(SuccessResponse::with_data(
        format!("Intent advanced to {}", phase),
        PhaseResponse { phase },
    )))
}

// =============================================================================
// WORK
// =============================================================================

pub async fn start_work(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(intent_id): Path<Uuid>,
    Json(request): Json<StartWorkRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<SessionResponse>>), GovernanceError> {
    require_role(&claims, Role::Operator)?;
    request.validate()?;

    let session = state.core.start_work(intent_id, &request.agent_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            "Work session started",
            SessionResponse { session },
        )),
    ))
}

pub async fn complete_work(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CompleteWorkRequest>,
) -> Result<Json<SuccessResponse<StagedResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;
    request.validate()?;

    let output = WorkOutput {
        payload: request.payload,
        confidence: request.confidence,
        warnings: request.warnings,
    };
    let staged_content = state.core.complete_work(session_id, output).await?;

    Ok(Json(SuccessResponse::with_data(
        "Work completed; output awaits staging",
        StagedResponse { staged_content },
    )))
}

pub async fn fail_work(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<FailWorkRequest>,
) -> Result<Json<SuccessResponse<SessionResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;
    request.validate()?;

    let session = state.core.fail_work(session_id, &request.reason).await?;
    Ok(Json(SuccessResponse::with_data(
        "Work session failed",
        SessionResponse { session },
    )))
}

// =============================================================================
// STAGING
// =============================================================================

pub async fn stage_content(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(intent_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<StagedResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;

    let staged_content = state.core.stage_content(intent_id).await?;
    Ok(Json(SuccessResponse::with_data(
        "Content staged for review",
        StagedResponse { staged_content },
    )))
}

pub async fn pending_reviews(
    State(state): State<SharedState>,
    Path(intent_id): Path<Uuid>,
) -> Json<SuccessResponse<PendingReviewsResponse>> {
    let pending = state.core.pending_reviews(intent_id).await;
    Json(SuccessResponse::with_data(
        format!("{} item(s) awaiting review", pending.len()),
        PendingReviewsResponse { pending },
    ))
}
