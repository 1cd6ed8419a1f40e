//! HTTP trigger surface.
//!
//! | Route          | Effect                                         |
//! |----------------|------------------------------------------------|
//! | `GET /health`  | liveness, always `{"status":"ok"}`             |
//! | `POST /check`  | run one poll now and report its outcome        |
//! | `GET /status`  | poll statistics and delivery counters          |

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::{NotifierError, Result};
use crate::notify::DeliveryCounters;
use crate::poll::{OutcomeKind, PollOrchestrator, PollStatus};

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<PollOrchestrator>,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct CheckBody {
    message: &'static str,
    outcome: OutcomeKind,
    changes: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    bucket: String,
    #[serde(flatten)]
    poll: PollStatus,
    deliveries: DeliveryCounters,
}

/// Build the trigger router over an orchestrator.
pub fn router(orchestrator: Arc<PollOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/check", post(check))
        .route("/status", get(status))
        .with_state(AppState { orchestrator })
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn check(
    State(state): State<AppState>,
) -> std::result::Result<Json<CheckBody>, (StatusCode, Json<ErrorBody>)> {
    tracing::info!("Check requested over HTTP");
    match state.orchestrator.execute_poll().await {
        Ok(outcome) => Ok(Json(CheckBody {
            message: "Check completed",
            outcome: outcome.kind(),
            changes: outcome.change_count(),
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                message: e.chain(),
            }),
        )),
    }
}

async fn status(State(state): State<AppState>) -> Json<StatusBody> {
    Json(StatusBody {
        bucket: state.orchestrator.bucket().to_string(),
        poll: state.orchestrator.status(),
        deliveries: state.orchestrator.delivery_stats(),
    })
}

/// Serve the trigger surface on `addr` until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve(
    orchestrator: Arc<PollOrchestrator>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| NotifierError::config(format!("failed to bind {addr}: {e}")))?;
    tracing::info!("Trigger server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    tracing::info!("Trigger server stopped");
    Ok(())
}
