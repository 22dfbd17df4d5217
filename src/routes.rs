//! Route definitions and router setup
//!
//! Configures all API routes and middleware. Every `/api` route requires a
//! bearer token; role checks happen in the handlers.

mod checkpoint;
mod governance;
mod intent;
mod ledger;
mod review;

use crate::auth::auth_middleware;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::{limit::ConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Upper bound on requests in flight
const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .propagate_x_request_id();

    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Health check
        .route("/health", get(health_check))
        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

fn api_routes(state: SharedState) -> Router<SharedState> {
    Router::new()
        // Intents (THINK)
        .route("/intents", get(intent::list_intents).post(intent::create_intent))
        .route("/intents/{id}", get(intent::get_intent))
        .route("/intents/{id}/submit", post(intent::submit_intent))
        .route("/intents/{id}/cancel", post(intent::cancel_intent))
        .route("/intents/{id}/advance", post(intent::advance_phase))
        // Work sessions (WORK)
        .route("/intents/{id}/work", post(intent::start_work))
        .route("/sessions/{id}/complete", post(intent::complete_work))
        .route("/sessions/{id}/fail", post(intent::fail_work))
        // Staging (ASSIST → STAGING → REVIEW)
        .route("/intents/{id}/stage", post(intent::stage_content))
        .route("/intents/{id}/reviews", get(intent::pending_reviews))
        // Reviews and versions
        .route("/staged/{id}", get(review::get_staged_content))
        .route("/staged/{id}/review", post(review::submit_review))
        .route("/reviews/{id}", get(review::get_review))
        .route("/reviews/{id}/version", post(review::create_version))
        // Ledger (read-only)
        .route("/partitions/{partition}/versions", get(ledger::list_versions))
        .route("/partitions/{partition}/versions/latest", get(ledger::latest_version))
        .route("/partitions/{partition}/verify", get(ledger::verify_partition))
        .route("/versions/{id}", get(ledger::get_version))
        // Checkpoints
        .route(
            "/checkpoints",
            get(checkpoint::list_pending).post(checkpoint::raise_checkpoint),
        )
        .route("/checkpoints/{id}", get(checkpoint::get_checkpoint))
        .route("/checkpoints/{id}/wait", get(checkpoint::wait_for_checkpoint))
        .route("/checkpoints/{id}/resolve", post(checkpoint::resolve_checkpoint))
        // Orchestrator and policy
        .route("/orchestrator/intentions", post(governance::handle_intention))
        .route("/orchestrator/agents", get(governance::list_agents))
        .route("/violations", get(governance::list_violations))
        .route("/compliance", get(governance::compliance_report))
        .route("/audit", get(governance::audit_log))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let allowed_headers = [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::ACCEPT,
        HeaderName::from_static(crate::idempotency::IDEMPOTENCY_KEY_HEADER),
    ];
    let allowed_methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods(allowed_methods)
        .allow_headers(allowed_headers)
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{create_token, Role};
    use crate::checkpoint::RaiseCheckpoint;
    use crate::idempotency::IDEMPOTENCY_KEY_HEADER;
    use crate::pipeline::{StagedContent, WorkOutput};
    use crate::policy::{PendingAction, Sensitivity};
    use crate::state::AppState;
    use axum::{body::Body, http::Request, http::StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> (Router, Settings) {
        let (state, settings) = shared_state();
        (create_router(state, &settings), settings)
    }

    fn shared_state() -> (SharedState, Settings) {
        let settings = Settings::default();
        (Arc::new(AppState::new(&settings)), settings)
    }

    fn bearer(settings: &Settings, role: Role) -> String {
        let token = create_token(&settings.auth.jwt_secret, "alice", role).unwrap();
        format!("Bearer {}", token)
    }

    fn post(settings: &Settings, role: Role, uri: &str, key: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, bearer(settings, role))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// A submitted intent with one item waiting in its review queue
    async fn staged_item(state: &SharedState, description: &str) -> StagedContent {
        let core = &state.core;
        let intent = core.start_think("business", description, "alice").await.unwrap();
        assert!(core.submit_intent(intent.id, "alice").await.unwrap());
        let session = core.start_work(intent.id, "writer").await.unwrap();
        core.complete_work(session.id, WorkOutput::new(json!({ "report": description }), 0.9))
            .await
            .unwrap();
        core.stage_content(intent.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/api/compliance").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_observer_cannot_create_intent() {
        let (app, settings) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/intents")
                    .header(header::AUTHORIZATION, bearer(&settings, Role::Observer))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"partition":"business","description":"Q4 report"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_operator_creates_intent() {
        let (app, settings) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/intents")
                    .header(header::AUTHORIZATION, bearer(&settings, Role::Operator))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"partition":"business","description":"Q4 report"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_low_sensitivity_continuation_passes_the_gate() {
        let (state, settings) = shared_state();
        let intent = state.core.start_think("business", "Q4 report", "alice").await.unwrap();
        assert!(state.core.submit_intent(intent.id, "alice").await.unwrap());
        let app = create_router(state.clone(), &settings);

        let (status, body) = send(
            &app,
            post(
                &settings,
                Role::Operator,
                "/api/checkpoints",
                None,
                json!({ "intentId": intent.id, "pendingActions": [{ "name": "summarize" }] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checkpoint"], Value::Null);
        assert_eq!(body["sensitivity"], "low");
        assert_eq!(body["threshold"], "high");
        assert!(state.core.snapshot(intent.id).await.unwrap().paused.is_none());
        assert!(state.core.gate().list_pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_irreversible_continuation_pauses_the_intent() {
        let (state, settings) = shared_state();
        let intent = state.core.start_think("business", "Q4 report", "alice").await.unwrap();
        assert!(state.core.submit_intent(intent.id, "alice").await.unwrap());
        let app = create_router(state.clone(), &settings);

        let (status, body) = send(
            &app,
            post(
                &settings,
                Role::Operator,
                "/api/checkpoints",
                None,
                json!({
                    "intentId": intent.id,
                    "pendingActions": [
                        { "name": "summarize" },
                        { "name": "archive_folder", "irreversible": true }
                    ]
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["sensitivity"], "high");
        let checkpoint_id: Uuid = serde_json::from_value(body["checkpoint"]["id"].clone()).unwrap();
        let paused = state.core.snapshot(intent.id).await.unwrap().paused.unwrap();
        assert_eq!(paused.checkpoint_id, checkpoint_id);
    }

    #[tokio::test]
    async fn test_explicit_sensitivity_always_raises() {
        let (state, settings) = shared_state();
        let app = create_router(state.clone(), &settings);

        let (status, body) = send(
            &app,
            post(
                &settings,
                Role::Operator,
                "/api/checkpoints",
                None,
                json!({ "sensitivity": "low", "pendingActions": [{ "name": "summarize" }] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["checkpoint"]["sensitivity"], "low");
        assert_eq!(state.core.gate().list_pending().await.len(), 1);
    }

    #[tokio::test]
    async fn test_review_replays_with_same_key() {
        let (state, settings) = shared_state();
        let staged = staged_item(&state, "Q4 report").await;
        let app = create_router(state.clone(), &settings);
        let uri = format!("/api/staged/{}/review", staged.id);
        let request = json!({ "decision": "accept", "rationale": "looks right" });

        let (first_status, first) = send(
            &app,
            post(&settings, Role::Reviewer, &uri, Some("review-1"), request.clone()),
        )
        .await;
        let (second_status, second) = send(
            &app,
            post(&settings, Role::Reviewer, &uri, Some("review-1"), request),
        )
        .await;

        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(first, second);
        let review_id: Uuid = serde_json::from_value(first["review"]["id"].clone()).unwrap();
        assert_eq!(state.core.staged_review_id(staged.id).await, Some(review_id));
    }

    #[tokio::test]
    async fn test_review_key_reused_for_other_request_conflicts() {
        let (state, settings) = shared_state();
        let first_item = staged_item(&state, "Q4 report").await;
        let second_item = staged_item(&state, "Q1 plan").await;
        let app = create_router(state.clone(), &settings);
        let request = json!({ "decision": "accept" });

        let (status, _) = send(
            &app,
            post(
                &settings,
                Role::Reviewer,
                &format!("/api/staged/{}/review", first_item.id),
                Some("review-1"),
                request.clone(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Same body, different item
        let (status, body) = send(
            &app,
            post(
                &settings,
                Role::Reviewer,
                &format!("/api/staged/{}/review", second_item.id),
                Some("review-1"),
                request,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(state.core.staged_review_id(second_item.id).await, None);

        // Same item, different decision
        let (status, _) = send(
            &app,
            post(
                &settings,
                Role::Reviewer,
                &format!("/api/staged/{}/review", first_item.id),
                Some("review-1"),
                json!({ "decision": "reject" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_checkpoint_resolution_replays_and_conflicts() {
        let (state, settings) = shared_state();
        let checkpoint = state
            .core
            .raise_checkpoint(RaiseCheckpoint {
                intent_id: None,
                sensitivity: Sensitivity::High,
                pending_actions: vec![PendingAction::new("archive_folder", "archive").irreversible()],
                candidate_message: None,
            })
            .await
            .unwrap();
        let app = create_router(state.clone(), &settings);
        let uri = format!("/api/checkpoints/{}/resolve", checkpoint.id);

        let (first_status, first) = send(
            &app,
            post(&settings, Role::Reviewer, &uri, Some("resolve-1"), json!({ "outcome": "approved" })),
        )
        .await;
        let (second_status, second) = send(
            &app,
            post(&settings, Role::Reviewer, &uri, Some("resolve-1"), json!({ "outcome": "approved" })),
        )
        .await;
        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(first["checkpoint"]["resolution"]["resolvedBy"], "alice");

        let (status, _) = send(
            &app,
            post(&settings, Role::Reviewer, &uri, Some("resolve-1"), json!({ "outcome": "rejected" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            state.core.gate().get(checkpoint.id).await.unwrap().outcome(),
            Some(crate::checkpoint::CheckpointOutcome::Approved)
        );
    }

    #[tokio::test]
    async fn test_audit_reports_total_alongside_filtered_entries() {
        let (state, settings) = shared_state();
        let staged = staged_item(&state, "Q4 report").await;
        let app = create_router(state.clone(), &settings);

        let request = Request::builder()
            .uri(format!("/api/audit?resourceType=intent&resourceId={}&limit=1", staged.intent_id))
            .header(header::AUTHORIZATION, bearer(&settings, Role::Operator))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);
        assert_eq!(body["total"], json!(state.audit.len().await));
        assert!(body["total"].as_u64().unwrap() > 1);
    }
}
