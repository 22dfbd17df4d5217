//! Governed Pipeline API
//!
//! Serves the governed execution pipeline over HTTP: intents move through
//! THINK → WORK → ASSIST → STAGING → REVIEW → VERSION, with every version
//! gated on a human review and sensitive steps held at checkpoints.

use governed_pipeline::config::Settings;
use governed_pipeline::routes::create_router;
use governed_pipeline::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Governed Pipeline...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    if settings.governance.partitions.is_empty() {
        warn!("⚠️  GOVERNANCE_PARTITIONS not set, any partition id will be accepted");
    }
    info!(
        "🛡️  Checkpoint threshold: {}, confidence floor: {}",
        settings.governance.checkpoint_threshold, settings.governance.confidence_floor
    );

    let state = Arc::new(AppState::new(&settings));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Intents ───");
    info!("   POST /api/intents                         - Capture a draft intent");
    info!("   POST /api/intents/{{id}}/submit             - Submit (THINK → WORK)");
    info!("   POST /api/intents/{{id}}/work               - Open a sandboxed work session");
    info!("   POST /api/sessions/{{id}}/complete          - Attach work output");
    info!("   POST /api/intents/{{id}}/stage              - Stage output for review");
    info!("   POST /api/intents/{{id}}/cancel             - Cancel before VERSION");
    info!("");
    info!("   ─── Review & Ledger ───");
    info!("   POST /api/staged/{{id}}/review              - Accept / reject / modify / defer");
    info!("   POST /api/reviews/{{id}}/version            - Mint a version from an acceptance");
    info!("   GET  /api/partitions/{{partition}}/versions - Version history");
    info!("   GET  /api/partitions/{{partition}}/verify   - Verify the hash chain");
    info!("");
    info!("   ─── Checkpoints & Policy ───");
    info!("   POST /api/checkpoints                     - Gate a continuation at the threshold");
    info!("   GET  /api/checkpoints/{{id}}/wait           - Hold until a human resolves");
    info!("   POST /api/checkpoints/{{id}}/resolve        - Approve or reject");
    info!("   POST /api/orchestrator/intentions         - Ask agents for options");
    info!("   GET  /api/compliance                      - Compliance report");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,governed_pipeline=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
