//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use hvac_sim::api::{AppState, router};
use hvac_sim::config::ScenarioConfig;
use hvac_sim::runner::run_scenario;
use hvac_sim::sim::controller::ControllerKind;

/// Runs 48 ticks of the demo preset and wraps the result as API state.
fn build_api_state() -> Arc<AppState> {
    let mut scenario = ScenarioConfig::demo();
    scenario.simulation.ticks = 48;
    let output = run_scenario(&scenario, ControllerKind::Pid, false)
        .unwrap_or_else(|e| panic!("demo should run: {e}"));
    Arc::new(AppState {
        config: scenario.simulation.sim_config(),
        controller: output.kind,
        kpi: output.kpi,
        results: output.results,
    })
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(build_api_state());
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn state_reports_config_kpi_and_latest_step() {
    let (status, json) = get_json("/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["controller"], "pid");
    assert_eq!(json["config"]["dt_s"], 60.0);
    assert!(json["kpi"]["rmse_temp_c"].as_f64().is_some_and(f64::is_finite));
    assert_eq!(json["latest_step"]["tick"], 47);
}

#[tokio::test]
async fn telemetry_returns_every_tick() {
    let (status, json) = get_json("/telemetry").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().map(Vec::len);
    assert_eq!(rows, Some(48));
}

#[tokio::test]
async fn telemetry_range_is_inclusive() {
    let (status, json) = get_json("/telemetry?from=5&to=10").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().cloned().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["tick"], 5);
    assert_eq!(rows[5]["tick"], 10);
    for key in ["indoor_c", "indoor_rh", "u_temp_pct", "power_w", "sensor_fault"] {
        assert!(rows[0].get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn inverted_range_returns_400() {
    let (status, json) = get_json("/telemetry?from=10&to=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}
