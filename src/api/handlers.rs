//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, StateResponse, TelemetryQuery, TelemetryRecord};

/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse {
        config: state.config.clone(),
        controller: state.controller.as_str(),
        kpi: state.kpi.clone(),
        latest_step: state.results.last().map(TelemetryRecord::from),
    })
}

/// Returns telemetry records, optionally filtered by tick range.
///
/// `GET /telemetry` → 200 + `Vec<TelemetryRecord>` JSON
/// `GET /telemetry?from=N&to=M` → inclusive range
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<TelemetryRecord> = state
        .results
        .iter()
        .filter(|r| r.tick >= from && r.tick <= to)
        .map(TelemetryRecord::from)
        .collect();

    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::sim::controller::ControllerKind;
    use crate::sim::kpi::KpiReport;
    use crate::sim::types::SimConfig;

    fn empty_state() -> Arc<AppState> {
        Arc::new(AppState {
            config: SimConfig::new(60.0, 0, 42),
            controller: ControllerKind::Pid,
            kpi: KpiReport::default(),
            results: Vec::new(),
        })
    }

    #[tokio::test]
    async fn state_before_any_tick_has_no_latest_step() {
        let app = router(empty_state());
        let req = Request::builder().uri("/state").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["latest_step"].is_null());
        assert_eq!(json["controller"], "pid");
    }

    #[tokio::test]
    async fn invalid_range_returns_400() {
        let app = router(empty_state());
        let req = Request::builder()
            .uri("/telemetry?from=10&to=5")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
