//! Core loop types: timing configuration, actuation commands and per-tick records.

use std::fmt;

use serde::Serialize;

use crate::sensors::SensorReading;

use super::energy::EnergyRecord;
use super::thermal::PhysicalState;

/// Timing, setpoints and seed shared by the loop and its collaborators.
///
/// # Examples
///
/// ```
/// use hvac_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(60.0, 1440, 42);
/// assert_eq!(cfg.duration_hours(), 24.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    /// Control interval in seconds.
    pub dt_s: f64,
    /// Number of ticks for a fixed-length run.
    pub ticks: usize,
    /// Indoor temperature setpoint (°C).
    pub temperature_setpoint_c: f64,
    /// Indoor relative-humidity setpoint (%).
    pub humidity_setpoint: f64,
    /// Master random seed for reproducibility.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a configuration with 22 °C / 45 %RH setpoints.
    ///
    /// # Panics
    ///
    /// Panics if `dt_s` is not finite and positive.
    pub fn new(dt_s: f64, ticks: usize, seed: u64) -> Self {
        assert!(dt_s.is_finite() && dt_s > 0.0, "dt_s must be > 0");
        Self {
            dt_s,
            ticks,
            temperature_setpoint_c: 22.0,
            humidity_setpoint: 45.0,
            seed,
        }
    }

    /// Replaces both setpoints.
    pub fn with_setpoints(mut self, temperature_c: f64, humidity: f64) -> Self {
        self.temperature_setpoint_c = temperature_c;
        self.humidity_setpoint = humidity;
        self
    }

    /// Simulated length of a fixed-length run in hours.
    pub fn duration_hours(&self) -> f64 {
        self.ticks as f64 * self.dt_s / 3600.0
    }
}

/// Signed actuator commands for one tick, in percent of capacity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuationCommand {
    /// Positive heats, negative cools.
    pub temperature: f64,
    /// Positive humidifies, negative dehumidifies.
    pub humidity: f64,
}

impl ActuationCommand {
    /// Both actuators off.
    pub const IDLE: Self = Self {
        temperature: 0.0,
        humidity: 0.0,
    };

    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    /// Whether any actuator is driven this tick.
    pub fn is_active(&self) -> bool {
        self.temperature != 0.0 || self.humidity != 0.0
    }
}

/// Complete, read-only record of one control tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Tick index.
    pub tick: usize,
    /// Simulated time at the end of the tick (s).
    pub time_s: f64,
    /// Reading the controllers acted on (last good reading on a fault).
    pub measured: SensorReading,
    /// True zone state after the tick.
    pub state: PhysicalState,
    /// Commands applied during the tick.
    pub actuation: ActuationCommand,
    /// Electrical draw during the tick.
    pub energy: EnergyRecord,
    /// Whether the sensor read faulted this tick.
    pub sensor_fault: bool,
}

impl StepResult {
    pub fn time_hours(&self) -> f64 {
        self.time_s / 3600.0
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} ({:>6.2}h) | T_in={:>5.2}°C  T_wall={:>5.2}°C  T_out={:>5.2}°C  \
             RH={:>5.1}% | u_T={:>7.2}%  u_RH={:>7.2}% | P={:>8.1} W{}",
            self.tick,
            self.time_hours(),
            self.state.indoor_temp_c,
            self.state.wall_temp_c,
            self.state.outdoor_temp_c,
            self.state.indoor_rh,
            self.actuation.temperature,
            self.actuation.humidity,
            self.energy.total_w(),
            if self.sensor_fault { " [sensor fault]" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_config_defaults() {
        let cfg = SimConfig::new(60.0, 1440, 42);
        assert_eq!(cfg.dt_s, 60.0);
        assert_eq!(cfg.ticks, 1440);
        assert_eq!(cfg.temperature_setpoint_c, 22.0);
        assert_eq!(cfg.humidity_setpoint, 45.0);
        assert_eq!(cfg.duration_hours(), 24.0);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_dt_panics() {
        SimConfig::new(0.0, 10, 0);
    }

    #[test]
    fn idle_command_is_inactive() {
        assert!(!ActuationCommand::IDLE.is_active());
        assert!(ActuationCommand::new(0.0, -3.0).is_active());
    }

    #[test]
    fn step_result_display_flags_faults() {
        let r = StepResult {
            tick: 3,
            time_s: 240.0,
            measured: SensorReading::default(),
            state: PhysicalState {
                indoor_temp_c: 21.5,
                wall_temp_c: 20.1,
                indoor_rh: 44.0,
                outdoor_temp_c: 5.0,
                outdoor_rh: 75.0,
                tick: 4,
                elapsed_s: 240.0,
            },
            actuation: ActuationCommand::new(12.5, 0.0),
            energy: EnergyRecord::default(),
            sensor_fault: true,
        };
        let s = r.to_string();
        assert!(s.contains("T_in=21.50"));
        assert!(s.ends_with("[sensor fault]"));
    }
}
