//! Governance Routes
//!
//! Orchestrator intentions, policy violations, compliance and the audit log.

use crate::audit::AuditEntry;
use crate::auth::{require_role, Claims, Role};
use crate::error::GovernanceError;
use crate::models::{AuditQuery, IntentionRequest, SuccessResponse, ViolationQuery};
use crate::orchestrator::{AgentInput, OrchestratorResponse};
use crate::policy::{ComplianceReport, PolicyViolation};
use crate::state::SharedState;
use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Serialize;
use validator::Validate;

const DEFAULT_AUDIT_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentListResponse {
    pub agents: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationListResponse {
    pub violations: Vec<PolicyViolation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResponse {
    pub report: ComplianceReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub entries: Vec<AuditEntry>,
    /// Size of the whole log, before filtering
    pub total: usize,
}

/// Ask the registered agents for options. Never fails on agent misbehaviour.
pub async fn handle_intention(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<IntentionRequest>,
) -> Result<Json<SuccessResponse<OrchestratorResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;
    request.validate()?;

    let input = AgentInput {
        intention: request.intention,
        partition: request.partition,
        intent_id: request.intent_id,
        context: request.context,
    };
    let response = state.orchestrator.handle_intention(&input).await;
    let message = if response.fail_safe.is_some() {
        "No options available; deferring to human judgement"
    } else {
        "Options available for validation"
    };

    Ok(Json(SuccessResponse::with_data(message, response)))
}

pub async fn list_agents(State(state): State<SharedState>) -> Json<SuccessResponse<AgentListResponse>> {
    let agents = state.orchestrator.registry().agent_ids().await;
    Json(SuccessResponse::with_data(
        format!("{} registered agent(s)", agents.len()),
        AgentListResponse { agents },
    ))
}

pub async fn list_violations(
    State(state): State<SharedState>,
    Query(query): Query<ViolationQuery>,
) -> Json<SuccessResponse<ViolationListResponse>> {
    let violations = state
        .core
        .guard()
        .violations(query.agent_id.as_deref(), query.min_severity)
        .await;

    Json(SuccessResponse::with_data(
        format!("{} violation(s)", violations.len()),
        ViolationListResponse { violations },
    ))
}

pub async fn compliance_report(
    State(state): State<SharedState>,
) -> Json<SuccessResponse<ComplianceResponse>> {
    let report = state.core.guard().generate_compliance_report().await;
    let message = if report.compliant {
        "Compliant"
    } else {
        "Critical violations recorded"
    };
    Json(SuccessResponse::with_data(message, ComplianceResponse { report }))
}

pub async fn audit_log(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<SuccessResponse<AuditLogResponse>>, GovernanceError> {
    require_role(&claims, Role::Operator)?;

    let entries = state
        .audit
        .entries(
            query.resource_type.as_deref(),
            query.resource_id,
            query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT),
        )
        .await;

    let total = state.audit.len().await;

    Ok(Json(SuccessResponse::with_data(
        format!("{} of {} audit entries", entries.len(), total),
        AuditLogResponse { entries, total },
    )))
}
