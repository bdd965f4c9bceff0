//! Electrical energy accounting for the HVAC plant.

use super::thermal::HvacParams;
use super::types::ActuationCommand;

/// Electrical draw of one tick, split by end use.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyRecord {
    /// Heating electrical power (W).
    pub heating_w: f64,
    /// Cooling electrical power (W).
    pub cooling_w: f64,
    /// Humidifier / dehumidifier electrical power (W).
    pub humidity_w: f64,
    /// Fan power (W).
    pub fan_w: f64,
    /// Energy used during the tick (Wh).
    pub energy_wh: f64,
}

impl EnergyRecord {
    /// Draw of the plant while executing `cmd` for `dt_s` seconds.
    ///
    /// Heating draws thermal output over efficiency, cooling draws thermal
    /// output over the COP, humidity treatment scales linearly with the
    /// command magnitude and the fan runs at its active level whenever any
    /// command is non-zero.
    pub fn from_command(hvac: &HvacParams, cmd: ActuationCommand, dt_s: f64) -> Self {
        let (heat, cool) = hvac.thermal_power_w(cmd.temperature);
        let heating_w = heat / hvac.efficiency;
        let cooling_w = cool / hvac.cooling_cop;
        let humidity_w = cmd.humidity.abs().min(100.0) / 100.0 * hvac.humidity_treatment_w;
        let fan_w = if cmd.is_active() {
            hvac.fan_active_w
        } else {
            hvac.fan_idle_w
        };

        let total = heating_w + cooling_w + humidity_w + fan_w;
        Self {
            heating_w,
            cooling_w,
            humidity_w,
            fan_w,
            energy_wh: total * dt_s / 3600.0,
        }
    }

    /// Total electrical power (W).
    pub fn total_w(&self) -> f64 {
        self.heating_w + self.cooling_w + self.humidity_w + self.fan_w
    }
}

/// Running totals over a sequence of [`EnergyRecord`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyMeter {
    heating_wh: f64,
    cooling_wh: f64,
    humidity_wh: f64,
    fan_wh: f64,
    peak_w: f64,
    samples: usize,
}

impl EnergyMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one tick's record.
    pub fn record(&mut self, record: &EnergyRecord, dt_s: f64) {
        let hours = dt_s / 3600.0;
        self.heating_wh += record.heating_w * hours;
        self.cooling_wh += record.cooling_w * hours;
        self.humidity_wh += record.humidity_w * hours;
        self.fan_wh += record.fan_w * hours;
        self.peak_w = self.peak_w.max(record.total_w());
        self.samples += 1;
    }

    pub fn total_kwh(&self) -> f64 {
        (self.heating_wh + self.cooling_wh + self.humidity_wh + self.fan_wh) / 1000.0
    }

    pub fn heating_kwh(&self) -> f64 {
        self.heating_wh / 1000.0
    }

    pub fn cooling_kwh(&self) -> f64 {
        self.cooling_wh / 1000.0
    }

    pub fn humidity_kwh(&self) -> f64 {
        self.humidity_wh / 1000.0
    }

    pub fn fan_kwh(&self) -> f64 {
        self.fan_wh / 1000.0
    }

    /// Highest single-tick draw seen (W).
    pub fn peak_w(&self) -> f64 {
        self.peak_w
    }

    /// Number of ticks recorded.
    pub fn samples(&self) -> usize {
        self.samples
    }
}
