//! Review Routes
//!
//! Human adjudication of staged content and version minting.

use crate::auth::{require_role, Claims, Role};
use crate::error::{not_found_error, GovernanceError};
use crate::idempotency::{fingerprint, idempotency_key};
use crate::ledger::Version;
use crate::models::{ReviewRequest, SuccessResponse};
use crate::pipeline::{ReviewDecision, StagedContent};
use crate::state::SharedState;
use axum::{
    extract::{Extension, Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

const REVIEW_SCOPE: &str = "review";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub review: ReviewDecision,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedDetailResponse {
    pub staged_content: StagedContent,
    /// Set once a human has reviewed the item
    pub review_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub created: bool,
    pub version: Option<Version>,
}

pub async fn get_staged_content(
    State(state): State<SharedState>,
    Path(staged_content_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<StagedDetailResponse>>, GovernanceError> {
    let staged_content = state.core.staged_content(staged_content_id).await?;
    let review_id = state.core.staged_review_id(staged_content_id).await;
    Ok(Json(SuccessResponse::with_data(
        "Staged content retrieved",
        StagedDetailResponse {
            staged_content,
            review_id,
        },
    )))
}

/// Record a human decision on one staged item. Honours `Idempotency-Key`.
pub async fn submit_review(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(staged_content_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<serde_json::Value>, GovernanceError> {
    require_role(&claims, Role::Reviewer)?;
    request.validate()?;

    let key = idempotency_key(&headers);
    let print = fingerprint(&(staged_content_id, &claims.sub, &request));
    if let Some(key) = &key {
        if let Some(body) = state.idempotency.lookup(REVIEW_SCOPE, key, &print).await? {
            return Ok(Json(body));
        }
    }

    let review = state
        .core
        .submit_review(staged_content_id, request.decision, &claims.sub, request.rationale)
        .await?;

    let body = serde_json::to_value(SuccessResponse::with_data(
        "Review recorded",
        ReviewResponse { review },
    ))
    .map_err(|e| GovernanceError::Internal(format!("Failed to encode review: {}", e)))?;

    if let Some(key) = &key {
        state
            .idempotency
            .store(REVIEW_SCOPE, key, print, body.clone())
            .await;
    }
    Ok(Json(body))
}

pub async fn get_review(
    State(state): State<SharedState>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<ReviewResponse>>, GovernanceError> {
    let review = state
        .core
        .review(review_id)
        .await
        .ok_or_else(|| not_found_error(format!("Review {} not found", review_id)))?;

    Ok(Json(SuccessResponse::with_data(
        "Review retrieved",
        ReviewResponse { review },
    )))
}

pub async fn create_version(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<VersionResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;

    let version = state.core.create_version(review_id).await?;
    let message = match &version {
        Some(v) => format!("Version {} created in '{}'", v.version_number(), v.partition()),
        None => "Review is not an acceptance; no version created".to_string(),
    };

    Ok(Json(SuccessResponse::with_data(
        message,
        VersionResponse {
            created: version.is_some(),
            version,
        },
    )))
}
