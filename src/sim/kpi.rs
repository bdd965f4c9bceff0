//! Post-hoc KPI computation from control-loop results.

use std::fmt;

use serde::Serialize;

use super::types::StepResult;

/// Setpoints and tolerances the KPIs are measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiTargets {
    /// Temperature setpoint (°C).
    pub temperature_c: f64,
    /// Relative-humidity setpoint (%).
    pub humidity: f64,
    /// Half-width of the temperature comfort band (°C).
    pub comfort_band_c: f64,
}

/// Aggregate indicators of one complete run.
///
/// Computed from the step records rather than tracked during the run, so the
/// report always agrees with exported telemetry. Errors are measured on the
/// true zone state, not on sensor readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiReport {
    /// Root-mean-square temperature error (°C).
    pub rmse_temp_c: f64,
    /// Mean absolute temperature error (°C).
    pub mae_temp_c: f64,
    /// Largest absolute temperature error (°C).
    pub max_abs_temp_error_c: f64,
    /// Absolute temperature error at the last tick (°C).
    pub final_temp_error_c: f64,
    /// Root-mean-square humidity error (%RH).
    pub rmse_rh: f64,
    /// Share of ticks outside the comfort band (%).
    pub comfort_violation_pct: f64,
    /// Total electrical energy (kWh).
    pub total_energy_kwh: f64,
    /// Heating share of the energy (kWh).
    pub heating_kwh: f64,
    /// Cooling share of the energy (kWh).
    pub cooling_kwh: f64,
    /// Mean electrical power (W).
    pub mean_power_w: f64,
    /// Peak electrical power (W).
    pub peak_power_w: f64,
    /// Changes between heating, idle and cooling on the temperature channel.
    pub mode_switches: usize,
    /// Ticks whose reading faulted.
    pub sensor_faults: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Heating,
    Idle,
    Cooling,
}

fn mode(command: f64) -> Mode {
    if command > 0.0 {
        Mode::Heating
    } else if command < 0.0 {
        Mode::Cooling
    } else {
        Mode::Idle
    }
}

impl KpiReport {
    /// Computes every KPI from a complete run.
    pub fn from_results(results: &[StepResult], targets: &KpiTargets) -> Self {
        let Some(last) = results.last() else {
            return Self::default();
        };

        let n = results.len() as f64;
        let mut sq_sum = 0.0;
        let mut abs_sum = 0.0;
        let mut max_abs = 0.0_f64;
        let mut rh_sq_sum = 0.0;
        let mut violations = 0_usize;
        let mut energy_wh = 0.0;
        let mut heating_wh = 0.0;
        let mut cooling_wh = 0.0;
        let mut power_sum = 0.0;
        let mut peak = 0.0_f64;
        let mut switches = 0_usize;
        let mut faults = 0_usize;
        let mut previous_mode = None;
        let mut previous_time_s = 0.0;

        for r in results {
            let err = r.state.indoor_temp_c - targets.temperature_c;
            sq_sum += err * err;
            abs_sum += err.abs();
            max_abs = max_abs.max(err.abs());
            if err.abs() > targets.comfort_band_c {
                violations += 1;
            }

            let rh_err = r.state.indoor_rh - targets.humidity;
            rh_sq_sum += rh_err * rh_err;

            let hours = (r.time_s - previous_time_s) / 3600.0;
            previous_time_s = r.time_s;
            energy_wh += r.energy.energy_wh;
            heating_wh += r.energy.heating_w * hours;
            cooling_wh += r.energy.cooling_w * hours;
            power_sum += r.energy.total_w();
            peak = peak.max(r.energy.total_w());

            let m = mode(r.actuation.temperature);
            if previous_mode.is_some_and(|p| p != m) {
                switches += 1;
            }
            previous_mode = Some(m);

            if r.sensor_fault {
                faults += 1;
            }
        }

        Self {
            rmse_temp_c: (sq_sum / n).sqrt(),
            mae_temp_c: abs_sum / n,
            max_abs_temp_error_c: max_abs,
            final_temp_error_c: (last.state.indoor_temp_c - targets.temperature_c).abs(),
            rmse_rh: (rh_sq_sum / n).sqrt(),
            comfort_violation_pct: 100.0 * violations as f64 / n,
            total_energy_kwh: energy_wh / 1000.0,
            heating_kwh: heating_wh / 1000.0,
            cooling_kwh: cooling_wh / 1000.0,
            mean_power_w: power_sum / n,
            peak_power_w: peak,
            mode_switches: switches,
            sensor_faults: faults,
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "RMSE temperature:      {:.3} °C", self.rmse_temp_c)?;
        writeln!(f, "MAE temperature:       {:.3} °C", self.mae_temp_c)?;
        writeln!(f, "Max temperature error: {:.3} °C", self.max_abs_temp_error_c)?;
        writeln!(f, "Final temperature err: {:.3} °C", self.final_temp_error_c)?;
        writeln!(f, "RMSE humidity:         {:.2} %RH", self.rmse_rh)?;
        writeln!(f, "Comfort violations:    {:.1}%", self.comfort_violation_pct)?;
        writeln!(
            f,
            "Energy:                {:.2} kWh (heat {:.2}, cool {:.2})",
            self.total_energy_kwh, self.heating_kwh, self.cooling_kwh
        )?;
        writeln!(
            f,
            "Power:                 {:.0} W mean, {:.0} W peak",
            self.mean_power_w, self.peak_power_w
        )?;
        writeln!(f, "Mode switches:         {}", self.mode_switches)?;
        write!(f, "Sensor faults:         {}", self.sensor_faults)
    }
}
