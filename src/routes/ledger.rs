//! Ledger Routes
//!
//! Read-only views of the version history. Nothing here can write.

use crate::error::{not_found_error, GovernanceError};
use crate::ledger::Version;
use crate::models::SuccessResponse;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionHistoryResponse {
    pub partition: String,
    pub versions: Vec<Version>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleVersionResponse {
    pub version: Version,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub partition: String,
    pub verified_versions: usize,
}

pub async fn list_versions(
    State(state): State<SharedState>,
    Path(partition): Path<String>,
) -> Json<SuccessResponse<VersionHistoryResponse>> {
    let versions = state.core.ledger().history(&partition).await;
    Json(SuccessResponse::with_data(
        format!("{} version(s)", versions.len()),
        VersionHistoryResponse { partition, versions },
    ))
}

pub async fn latest_version(
    State(state): State<SharedState>,
    Path(partition): Path<String>,
) -> Result<Json<SuccessResponse<SingleVersionResponse>>, GovernanceError> {
    let version = state
        .core
        .ledger()
        .latest(&partition)
        .await
        .ok_or_else(|| not_found_error(format!("Partition '{}' has no versions", partition)))?;

    Ok(Json(SuccessResponse::with_data(
        "Latest version retrieved",
        SingleVersionResponse { version },
    )))
}

pub async fn get_version(
    State(state): State<SharedState>,
    Path(version_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<SingleVersionResponse>>, GovernanceError> {
    let version = state
        .core
        .ledger()
        .get(version_id)
        .await
        .ok_or_else(|| not_found_error(format!("Version {} not found", version_id)))?;

    Ok(Json(SuccessResponse::with_data(
        "Version retrieved",
        SingleVersionResponse { version },
    )))
}

/// Recompute every checksum and chain link in a partition
pub async fn verify_partition(
    State(state): State<SharedState>,
    Path(partition): Path<String>,
) -> Result<Json<SuccessResponse<VerifyResponse>>, GovernanceError> {
    let verified_versions = state.core.ledger().verify_partition(&partition).await?;
    Ok(Json(SuccessResponse::with_data(
        "Partition history verified",
        VerifyResponse {
            partition,
            verified_versions,
        },
    )))
}
