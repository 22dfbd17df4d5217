//! Checkpoint Routes
//!
//! Raising, inspecting and resolving human-approval checkpoints.

use crate::auth::{require_role, Claims, Role};
use crate::checkpoint::{Checkpoint, RaiseCheckpoint};
use crate::error::{not_found_error, GovernanceError};
use crate::idempotency::{fingerprint, idempotency_key};
use crate::models::{RaiseCheckpointRequest, ResolveCheckpointRequest, SuccessResponse, WaitQuery};
use crate::policy::{classify_actions, Sensitivity};
use crate::state::SharedState;
use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

const RESOLVE_SCOPE: &str = "checkpoint";

/// Default and maximum hold time of a wait request
const DEFAULT_WAIT_SECS: u64 = 30;
const MAX_WAIT_SECS: u64 = 300;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointResponse {
    pub checkpoint: Checkpoint,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointListResponse {
    pub checkpoints: Vec<Checkpoint>,
}

/// Outcome of a raise request. `checkpoint` is null when the bundle sits
/// below the configured threshold and the continuation may proceed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResponse {
    pub sensitivity: Sensitivity,
    pub threshold: Sensitivity,
    pub checkpoint: Option<Checkpoint>,
}

/// Gate a continuation. Without an explicit `sensitivity` the bundle is
/// classified and only stops when it reaches the threshold; an explicit
/// sensitivity always raises.
pub async fn raise_checkpoint(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<RaiseCheckpointRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<GateResponse>>), GovernanceError> {
    require_role(&claims, Role::Operator)?;
    request.validate()?;

    let threshold = state.core.gate().threshold();
    let sensitivity = request
        .sensitivity
        .unwrap_or_else(|| classify_actions(&request.pending_actions));

    let checkpoint = match (request.sensitivity, request.intent_id) {
        (None, Some(intent_id)) => {
            state
                .core
                .gate_continuation(intent_id, request.pending_actions, request.message)
                .await?
        }
        (None, None) if !state.core.gate().requires_checkpoint(sensitivity) => None,
        (_, intent_id) => Some(
            state
                .core
                .raise_checkpoint(RaiseCheckpoint {
                    intent_id,
                    sensitivity,
                    pending_actions: request.pending_actions,
                    candidate_message: request.message,
                })
                .await?,
        ),
    };

    let (status, message) = match checkpoint {
        Some(_) => (StatusCode::CREATED, "Checkpoint raised"),
        None => (StatusCode::OK, "Below checkpoint threshold; continuation may proceed"),
    };
    Ok((
        status,
        Json(SuccessResponse::with_data(
            message,
            GateResponse {
                sensitivity,
                threshold,
                checkpoint,
            },
        )),
    ))
}

pub async fn list_pending(
    State(state): State<SharedState>,
) -> Json<SuccessResponse<CheckpointListResponse>> {
    let checkpoints = state.core.gate().list_pending().await;
    Json(SuccessResponse::with_data(
        format!("{} pending checkpoint(s)", checkpoints.len()),
        CheckpointListResponse { checkpoints },
    ))
}

pub async fn get_checkpoint(
    State(state): State<SharedState>,
    Path(checkpoint_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<CheckpointResponse>>, GovernanceError> {
    let checkpoint = state
        .core
        .gate()
        .get(checkpoint_id)
        .await
        .ok_or_else(|| not_found_error(format!("Checkpoint {} not found", checkpoint_id)))?;

    Ok(Json(SuccessResponse::with_data(
        "Checkpoint retrieved",
        CheckpointResponse { checkpoint },
    )))
}

/// Hold the request until the checkpoint is resolved or the hold time runs
/// out. Running out only ends the request; the checkpoint stays pending.
pub async fn wait_for_checkpoint(
    State(state): State<SharedState>,
    Path(checkpoint_id): Path<Uuid>,
    Query(query): Query<WaitQuery>,
) -> Result<Json<SuccessResponse<CheckpointResponse>>, GovernanceError> {
    let hold = Duration::from_secs(
        query
            .timeout_secs
            .unwrap_or(DEFAULT_WAIT_SECS)
            .min(MAX_WAIT_SECS),
    );

    let message = match tokio::time::timeout(hold, state.core.gate().wait_for_resolution(checkpoint_id)).await {
        Ok(resolution) => {
            resolution?;
            "Checkpoint resolved"
        }
        Err(_) => "Checkpoint is still pending",
    };

    let checkpoint = state
        .core
        .gate()
        .get(checkpoint_id)
        .await
        .ok_or_else(|| not_found_error(format!("Checkpoint {} not found", checkpoint_id)))?;

    Ok(Json(SuccessResponse::with_data(
        message,
        CheckpointResponse { checkpoint },
    )))
}

/// Approve or reject. Honours `Idempotency-Key`.
pub async fn resolve_checkpoint(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(checkpoint_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ResolveCheckpointRequest>,
) -> Result<Json<serde_json::Value>, GovernanceError> {
    require_role(&claims, Role::Reviewer)?;
    request.validate()?;

    let key = idempotency_key(&headers);
    let print = fingerprint(&(checkpoint_id, &claims.sub, &request));
    if let Some(key) = &key {
        if let Some(body) = state.idempotency.lookup(RESOLVE_SCOPE, key, &print).await? {
            return Ok(Json(body));
        }
    }

    let checkpoint = state
        .core
        .resolve_checkpoint(checkpoint_id, request.outcome, &claims.sub, request.reason)
        .await?;

    let body = serde_json::to_value(SuccessResponse::with_data(
        "Checkpoint resolved",
        CheckpointResponse { checkpoint },
    ))
    .map_err(|e| GovernanceError::Internal(format!("Failed to encode checkpoint: {}", e)))?;

    if let Some(key) = &key {
        state
            .idempotency
            .store(RESOLVE_SCOPE, key, print, body.clone())
            .await;
    }
    Ok(Json(body))
}
