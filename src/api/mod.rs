//! REST API for a completed run.
//!
//! Provides two GET endpoints:
//! - `/state`: loop configuration, strategy, KPI report and latest step
//! - `/telemetry`: per-tick records with optional range filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::sim::controller::ControllerKind;
use crate::sim::kpi::KpiReport;
use crate::sim::types::{SimConfig, StepResult};

pub use types::{ErrorResponse, StateResponse, TelemetryQuery, TelemetryRecord};

/// Read-only application state shared across all request handlers.
pub struct AppState {
    /// Loop configuration used for this run.
    pub config: SimConfig,
    /// Strategy that drove both channels.
    pub controller: ControllerKind,
    /// Aggregate KPI report.
    pub kpi: KpiReport,
    /// Per-tick records.
    pub results: Vec<StepResult>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/telemetry", get(handlers::get_telemetry))
        .with_state(state)
}

/// Binds to `addr` and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
