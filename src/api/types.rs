//! API response and query types.
//!
//! Telemetry field names match the CSV export columns.

use serde::{Deserialize, Serialize};

use crate::sim::kpi::KpiReport;
use crate::sim::types::{SimConfig, StepResult};

/// Configuration, strategy, KPIs and the latest record.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub config: SimConfig,
    /// Strategy name (`pid`, `fuzzy` or `onoff`).
    pub controller: &'static str,
    pub kpi: KpiReport,
    /// Most recent record, absent before the first tick.
    pub latest_step: Option<TelemetryRecord>,
}

/// One tick, flattened.
#[derive(Debug, Serialize)]
pub struct TelemetryRecord {
    pub tick: usize,
    pub time_h: f64,
    pub indoor_c: f64,
    pub wall_c: f64,
    pub outdoor_c: f64,
    pub indoor_rh: f64,
    pub outdoor_rh: f64,
    pub measured_c: f64,
    pub measured_rh: f64,
    pub co2_ppm: f64,
    pub u_temp_pct: f64,
    pub u_rh_pct: f64,
    /// Total electrical power (W).
    pub power_w: f64,
    pub energy_wh: f64,
    pub sensor_fault: bool,
}

impl From<&StepResult> for TelemetryRecord {
    fn from(r: &StepResult) -> Self {
        Self {
            tick: r.tick,
            time_h: r.time_hours(),
            indoor_c: r.state.indoor_temp_c,
            wall_c: r.state.wall_temp_c,
            outdoor_c: r.state.outdoor_temp_c,
            indoor_rh: r.state.indoor_rh,
            outdoor_rh: r.state.outdoor_rh,
            measured_c: r.measured.indoor_temp_c,
            measured_rh: r.measured.indoor_rh,
            co2_ppm: r.measured.co2_ppm,
            u_temp_pct: r.actuation.temperature,
            u_rh_pct: r.actuation.humidity,
            power_w: r.energy.total_w(),
            energy_wh: r.energy.energy_wh,
            sensor_fault: r.sensor_fault,
        }
    }
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// First tick (inclusive).
    pub from: Option<usize>,
    /// Last tick (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
