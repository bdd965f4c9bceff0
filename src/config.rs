//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::sensors::SensorNoise;
use crate::sim::controller::{ControllerKind, Direction, FuzzyParams, OnOffParams, PidParams};
use crate::sim::thermal::{BuildingParams, HvacParams, InitialConditions};
use crate::sim::types::SimConfig;
use crate::sim::weather::{OccupancySchedule, WeatherParams};

/// Longest tick accepted from a scenario.
pub const MAX_DT_S: f64 = 3600.0;

/// Top-level scenario configuration parsed from TOML.
///
/// Every section is optional and falls back to the `demo` preset values.
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or start from a
/// preset with [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Loop timing, setpoints and strategy.
    pub simulation: SimulationConfig,
    /// Zone thermal constants and initial state.
    pub building: BuildingConfig,
    /// HVAC plant capacities.
    pub hvac: HvacConfig,
    /// PID tuning for both channels.
    pub pid: PidConfig,
    /// On-Off tuning for both channels.
    pub onoff: OnOffConfig,
    /// Fuzzy scaling for both channels.
    pub fuzzy: FuzzyConfig,
    /// Outdoor climate.
    pub weather: WeatherConfig,
    /// Occupancy schedule.
    pub occupancy: OccupancyConfig,
    /// Sensor model.
    pub sensors: SensorsConfig,
}

/// Loop timing, setpoints and strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Control interval (s, > 0).
    pub dt_s: f64,
    /// Number of ticks to run.
    pub ticks: usize,
    /// Master random seed.
    pub seed: u64,
    /// Strategy: `"pid"`, `"fuzzy"` or `"onoff"`.
    pub controller: String,
    /// Indoor temperature setpoint (°C).
    pub temperature_setpoint_c: f64,
    /// Indoor humidity setpoint (%RH).
    pub humidity_setpoint: f64,
    /// Half-width of the comfort band used in the KPI report (°C).
    pub comfort_band_c: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_s: 60.0,
            ticks: 1440,
            seed: 42,
            controller: "pid".to_string(),
            temperature_setpoint_c: 22.0,
            humidity_setpoint: 45.0,
            comfort_band_c: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            dt_s: self.dt_s,
            ticks: self.ticks,
            temperature_setpoint_c: self.temperature_setpoint_c,
            humidity_setpoint: self.humidity_setpoint,
            seed: self.seed,
        }
    }
}

/// Zone thermal constants and initial state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildingConfig {
    pub c_indoor_j_k: f64,
    pub c_wall_j_k: f64,
    pub ua_indoor_wall_w_k: f64,
    pub ua_wall_outdoor_w_k: f64,
    pub ua_infiltration_w_k: f64,
    pub ua_window_w_k: f64,
    pub solar_aperture_m2: f64,
    pub base_internal_gain_w: f64,
    pub gain_per_occupant_w: f64,
    pub volume_m3: f64,
    pub air_changes_per_hour: f64,
    pub moisture_per_occupant_kg_h: f64,
    /// Initial indoor air temperature (°C).
    pub initial_indoor_c: f64,
    /// Initial wall temperature (°C).
    pub initial_wall_c: f64,
    /// Initial indoor humidity (%RH).
    pub initial_rh: f64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        let p = BuildingParams::default();
        let init = InitialConditions::default();
        Self {
            c_indoor_j_k: p.c_indoor_j_k,
            c_wall_j_k: p.c_wall_j_k,
            ua_indoor_wall_w_k: p.ua_indoor_wall_w_k,
            ua_wall_outdoor_w_k: p.ua_wall_outdoor_w_k,
            ua_infiltration_w_k: p.ua_infiltration_w_k,
            ua_window_w_k: p.ua_window_w_k,
            solar_aperture_m2: p.solar_aperture_m2,
            base_internal_gain_w: p.base_internal_gain_w,
            gain_per_occupant_w: p.gain_per_occupant_w,
            volume_m3: p.volume_m3,
            air_changes_per_hour: p.air_changes_per_hour,
            moisture_per_occupant_kg_h: p.moisture_per_occupant_kg_h,
            initial_indoor_c: init.indoor_temp_c,
            initial_wall_c: init.wall_temp_c,
            initial_rh: init.indoor_rh,
        }
    }
}

impl BuildingConfig {
    pub fn params(&self) -> BuildingParams {
        BuildingParams {
            c_indoor_j_k: self.c_indoor_j_k,
            c_wall_j_k: self.c_wall_j_k,
            ua_indoor_wall_w_k: self.ua_indoor_wall_w_k,
            ua_wall_outdoor_w_k: self.ua_wall_outdoor_w_k,
            ua_infiltration_w_k: self.ua_infiltration_w_k,
            ua_window_w_k: self.ua_window_w_k,
            solar_aperture_m2: self.solar_aperture_m2,
            base_internal_gain_w: self.base_internal_gain_w,
            gain_per_occupant_w: self.gain_per_occupant_w,
            volume_m3: self.volume_m3,
            air_changes_per_hour: self.air_changes_per_hour,
            moisture_per_occupant_kg_h: self.moisture_per_occupant_kg_h,
        }
    }

    pub fn initial(&self) -> InitialConditions {
        InitialConditions {
            indoor_temp_c: self.initial_indoor_c,
            wall_temp_c: self.initial_wall_c,
            indoor_rh: self.initial_rh,
        }
    }
}

/// HVAC plant capacities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HvacConfig {
    pub heating_capacity_w: f64,
    pub cooling_capacity_w: f64,
    pub efficiency: f64,
    pub cooling_cop: f64,
    pub humidifier_kg_h: f64,
    pub dehumidifier_kg_h: f64,
    pub coil_condensation_kg_h: f64,
    pub humidity_treatment_w: f64,
    pub fan_active_w: f64,
    pub fan_idle_w: f64,
}

impl Default for HvacConfig {
    fn default() -> Self {
        let p = HvacParams::default();
        Self {
            heating_capacity_w: p.heating_capacity_w,
            cooling_capacity_w: p.cooling_capacity_w,
            efficiency: p.efficiency,
            cooling_cop: p.cooling_cop,
            humidifier_kg_h: p.humidifier_kg_h,
            dehumidifier_kg_h: p.dehumidifier_kg_h,
            coil_condensation_kg_h: p.coil_condensation_kg_h,
            humidity_treatment_w: p.humidity_treatment_w,
            fan_active_w: p.fan_active_w,
            fan_idle_w: p.fan_idle_w,
        }
    }
}

impl HvacConfig {
    pub fn params(&self) -> HvacParams {
        HvacParams {
            heating_capacity_w: self.heating_capacity_w,
            cooling_capacity_w: self.cooling_capacity_w,
            efficiency: self.efficiency,
            cooling_cop: self.cooling_cop,
            humidifier_kg_h: self.humidifier_kg_h,
            dehumidifier_kg_h: self.dehumidifier_kg_h,
            coil_condensation_kg_h: self.coil_condensation_kg_h,
            humidity_treatment_w: self.humidity_treatment_w,
            fan_active_w: self.fan_active_w,
            fan_idle_w: self.fan_idle_w,
        }
    }
}

/// PID tuning for both channels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PidConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub humidity_kp: f64,
    pub humidity_ki: f64,
    pub humidity_kd: f64,
    /// Lower output bound shared by both channels (%).
    pub output_min: f64,
    /// Upper output bound shared by both channels (%).
    pub output_max: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 2.0,
            ki: 0.1,
            kd: 0.05,
            humidity_kp: 1.5,
            humidity_ki: 0.01,
            humidity_kd: 0.0,
            output_min: -100.0,
            output_max: 100.0,
        }
    }
}

impl PidConfig {
    pub fn temperature(&self) -> PidParams {
        PidParams::new(self.kp, self.ki, self.kd).with_limits(self.output_min, self.output_max)
    }

    pub fn humidity(&self) -> PidParams {
        PidParams::new(self.humidity_kp, self.humidity_ki, self.humidity_kd)
            .with_limits(self.output_min, self.output_max)
    }
}

/// On-Off tuning for both channels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OnOffConfig {
    pub deadband_c: f64,
    pub hysteresis_c: f64,
    /// `"heat"` or `"cool"`.
    pub direction: String,
    pub humidity_deadband: f64,
    pub humidity_hysteresis: f64,
    /// `"humidify"` or `"dehumidify"`.
    pub humidity_direction: String,
    /// Command magnitude while on (%).
    pub max_output: f64,
}

impl Default for OnOffConfig {
    fn default() -> Self {
        Self {
            deadband_c: 0.5,
            hysteresis_c: 1.0,
            direction: "heat".to_string(),
            humidity_deadband: 2.0,
            humidity_hysteresis: 4.0,
            humidity_direction: "dehumidify".to_string(),
            max_output: 100.0,
        }
    }
}

impl OnOffConfig {
    /// Temperature-channel parameters; `None` if the direction is unknown.
    pub fn temperature(&self) -> Option<OnOffParams> {
        let direction = self.direction.parse::<Direction>().ok()?;
        Some(OnOffParams {
            max_output: self.max_output,
            ..OnOffParams::new(self.deadband_c, self.hysteresis_c, direction)
        })
    }

    /// Humidity-channel parameters; `None` if the direction is unknown.
    pub fn humidity(&self) -> Option<OnOffParams> {
        let direction = self.humidity_direction.parse::<Direction>().ok()?;
        Some(OnOffParams {
            max_output: self.max_output,
            ..OnOffParams::new(self.humidity_deadband, self.humidity_hysteresis, direction)
        })
    }
}

/// Fuzzy scaling for both channels.
///
/// Membership breakpoints are fixed fractions of the error span and rate span.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuzzyConfig {
    /// Error at which the temperature controller saturates (°C).
    pub error_span_c: f64,
    /// Error rate at which the temperature rate terms saturate (°C/s).
    pub rate_span_c_s: f64,
    /// Error at which the humidity controller saturates (%RH).
    pub humidity_error_span: f64,
    /// Error rate at which the humidity rate terms saturate (%RH/s).
    pub humidity_rate_span: f64,
    /// Crisp value of each action, from full lowering to full raising (%).
    pub action_values: [f64; 5],
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            error_span_c: 10.0,
            rate_span_c_s: 0.02,
            humidity_error_span: 20.0,
            humidity_rate_span: 0.05,
            action_values: [-100.0, -40.0, 0.0, 40.0, 100.0],
        }
    }
}

impl FuzzyConfig {
    pub fn temperature(&self) -> FuzzyParams {
        FuzzyParams {
            action_values: self.action_values,
            ..FuzzyParams::scaled(self.error_span_c, self.rate_span_c_s)
        }
    }

    pub fn humidity(&self) -> FuzzyParams {
        FuzzyParams {
            action_values: self.action_values,
            ..FuzzyParams::scaled(self.humidity_error_span, self.humidity_rate_span)
        }
    }
}

/// Outdoor climate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    pub mean_temp_c: f64,
    pub daily_amplitude_c: f64,
    pub daily_peak_hour: f64,
    pub seasonal_amplitude_c: f64,
    pub start_day_of_year: f64,
    pub start_hour: f64,
    pub peak_solar_w_m2: f64,
    pub sunrise_hour: f64,
    pub sunset_hour: f64,
    pub cloud_alpha: f64,
    pub cloud_noise_std: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let w = WeatherParams::default();
        Self {
            mean_temp_c: w.mean_temp_c,
            daily_amplitude_c: w.daily_amplitude_c,
            daily_peak_hour: w.daily_peak_hour,
            seasonal_amplitude_c: w.seasonal_amplitude_c,
            start_day_of_year: w.start_day_of_year,
            start_hour: w.start_hour,
            peak_solar_w_m2: w.peak_solar_w_m2,
            sunrise_hour: w.sunrise_hour,
            sunset_hour: w.sunset_hour,
            cloud_alpha: w.cloud_alpha,
            cloud_noise_std: w.cloud_noise_std,
        }
    }
}

impl WeatherConfig {
    pub fn params(&self) -> WeatherParams {
        WeatherParams {
            mean_temp_c: self.mean_temp_c,
            daily_amplitude_c: self.daily_amplitude_c,
            daily_peak_hour: self.daily_peak_hour,
            seasonal_amplitude_c: self.seasonal_amplitude_c,
            start_day_of_year: self.start_day_of_year,
            start_hour: self.start_hour,
            peak_solar_w_m2: self.peak_solar_w_m2,
            sunrise_hour: self.sunrise_hour,
            sunset_hour: self.sunset_hour,
            cloud_alpha: self.cloud_alpha,
            cloud_noise_std: self.cloud_noise_std,
        }
    }
}

/// Occupancy schedule.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OccupancyConfig {
    pub occupants: u32,
    pub start_hour: f64,
    pub end_hour: f64,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        let o = OccupancySchedule::default();
        Self {
            occupants: o.occupants,
            start_hour: o.start_hour,
            end_hour: o.end_hour,
        }
    }
}

impl OccupancyConfig {
    pub fn schedule(&self) -> OccupancySchedule {
        OccupancySchedule {
            occupants: self.occupants,
            start_hour: self.start_hour,
            end_hour: self.end_hour,
        }
    }
}

/// Sensor model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorsConfig {
    /// `"ideal"` or `"simulated"`.
    pub model: String,
    pub temp_std_c: f64,
    pub rh_std: f64,
    pub co2_std_ppm: f64,
    pub pressure_std_hpa: f64,
    pub temp_offset_c: f64,
    pub fault_probability: f64,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        let n = SensorNoise::default();
        Self {
            model: "simulated".to_string(),
            temp_std_c: n.temp_std_c,
            rh_std: n.rh_std,
            co2_std_ppm: n.co2_std_ppm,
            pressure_std_hpa: n.pressure_std_hpa,
            temp_offset_c: n.temp_offset_c,
            fault_probability: n.fault_probability,
        }
    }
}

impl SensorsConfig {
    pub fn noise(&self) -> SensorNoise {
        SensorNoise {
            temp_std_c: self.temp_std_c,
            rh_std: self.rh_std,
            co2_std_ppm: self.co2_std_ppm,
            pressure_std_hpa: self.pressure_std_hpa,
            temp_offset_c: self.temp_offset_c,
            fault_probability: self.fault_probability,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.dt_s"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Mild shoulder-season day with noisy sensors.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Cold mid-January day: heating dominated, dry outdoor air.
    pub fn winter() -> Self {
        Self {
            building: BuildingConfig {
                initial_indoor_c: 17.0,
                initial_wall_c: 15.0,
                initial_rh: 40.0,
                ..BuildingConfig::default()
            },
            weather: WeatherConfig {
                mean_temp_c: 12.0,
                start_day_of_year: 15.0,
                peak_solar_w_m2: 450.0,
                sunrise_hour: 8.0,
                sunset_hour: 16.5,
                cloud_noise_std: 0.2,
                ..WeatherConfig::default()
            },
            ..Self::default()
        }
    }

    /// Hot mid-July day: cooling dominated, on-off units cool.
    pub fn summer() -> Self {
        Self {
            simulation: SimulationConfig {
                temperature_setpoint_c: 24.0,
                ..SimulationConfig::default()
            },
            building: BuildingConfig {
                initial_indoor_c: 27.0,
                initial_wall_c: 28.0,
                initial_rh: 55.0,
                ..BuildingConfig::default()
            },
            onoff: OnOffConfig {
                direction: "cool".to_string(),
                ..OnOffConfig::default()
            },
            weather: WeatherConfig {
                mean_temp_c: 18.0,
                start_day_of_year: 196.0,
                peak_solar_w_m2: 900.0,
                sunrise_hour: 5.5,
                sunset_hour: 21.0,
                ..WeatherConfig::default()
            },
            occupancy: OccupancyConfig {
                occupants: 30,
                ..OccupancyConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "winter", "summer"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "winter" => Ok(Self::winter()),
            "summer" => Ok(Self::summer()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Configured strategy, if the name is known.
    pub fn controller_kind(&self) -> Option<ControllerKind> {
        self.simulation.controller.parse().ok()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid. Physical
    /// constants are checked again, with the same rules, when the model is built.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        let s = &self.simulation;
        check(s.dt_s.is_finite() && s.dt_s > 0.0, "simulation.dt_s", "must be > 0");
        check(
            s.dt_s <= MAX_DT_S,
            "simulation.dt_s",
            "must be at most 3600 (one hour per tick)",
        );
        check(
            self.controller_kind().is_some(),
            "simulation.controller",
            "must be \"pid\", \"fuzzy\" or \"onoff\"",
        );
        check(
            (0.0..=100.0).contains(&s.humidity_setpoint),
            "simulation.humidity_setpoint",
            "must be in [0, 100]",
        );
        check(
            s.temperature_setpoint_c.is_finite(),
            "simulation.temperature_setpoint_c",
            "must be finite",
        );
        check(s.comfort_band_c >= 0.0, "simulation.comfort_band_c", "must be >= 0");

        let b = &self.building;
        check(b.c_indoor_j_k > 0.0, "building.c_indoor_j_k", "must be > 0");
        check(b.c_wall_j_k > 0.0, "building.c_wall_j_k", "must be > 0");
        check(b.volume_m3 > 0.0, "building.volume_m3", "must be > 0");
        for (field, value) in [
            ("building.ua_indoor_wall_w_k", b.ua_indoor_wall_w_k),
            ("building.ua_wall_outdoor_w_k", b.ua_wall_outdoor_w_k),
            ("building.ua_infiltration_w_k", b.ua_infiltration_w_k),
            ("building.ua_window_w_k", b.ua_window_w_k),
            ("building.air_changes_per_hour", b.air_changes_per_hour),
        ] {
            check(value >= 0.0, field, "must be >= 0");
        }
        check(
            (0.0..=100.0).contains(&b.initial_rh),
            "building.initial_rh",
            "must be in [0, 100]",
        );

        let h = &self.hvac;
        check(h.heating_capacity_w > 0.0, "hvac.heating_capacity_w", "must be > 0");
        check(h.cooling_capacity_w > 0.0, "hvac.cooling_capacity_w", "must be > 0");
        check(
            h.efficiency > 0.0 && h.efficiency <= 1.0,
            "hvac.efficiency",
            "must be in (0, 1]",
        );
        check(h.cooling_cop > 0.0, "hvac.cooling_cop", "must be > 0");

        let p = &self.pid;
        for (field, value) in [
            ("pid.kp", p.kp),
            ("pid.ki", p.ki),
            ("pid.kd", p.kd),
            ("pid.humidity_kp", p.humidity_kp),
            ("pid.humidity_ki", p.humidity_ki),
            ("pid.humidity_kd", p.humidity_kd),
        ] {
            check(value >= 0.0, field, "must be >= 0");
        }
        check(p.output_min < p.output_max, "pid.output_min", "must be < pid.output_max");

        let o = &self.onoff;
        check(o.deadband_c >= 0.0, "onoff.deadband_c", "must be >= 0");
        check(o.hysteresis_c >= 0.0, "onoff.hysteresis_c", "must be >= 0");
        check(o.humidity_deadband >= 0.0, "onoff.humidity_deadband", "must be >= 0");
        check(o.humidity_hysteresis >= 0.0, "onoff.humidity_hysteresis", "must be >= 0");
        check(o.max_output > 0.0, "onoff.max_output", "must be > 0");
        check(
            o.temperature().is_some(),
            "onoff.direction",
            "must be \"heat\" or \"cool\"",
        );
        check(
            o.humidity().is_some(),
            "onoff.humidity_direction",
            "must be \"humidify\" or \"dehumidify\"",
        );

        let f = &self.fuzzy;
        check(f.error_span_c > 0.0, "fuzzy.error_span_c", "must be > 0");
        check(f.rate_span_c_s > 0.0, "fuzzy.rate_span_c_s", "must be > 0");
        check(f.humidity_error_span > 0.0, "fuzzy.humidity_error_span", "must be > 0");
        check(f.humidity_rate_span > 0.0, "fuzzy.humidity_rate_span", "must be > 0");

        let w = &self.weather;
        check(
            w.sunrise_hour < w.sunset_hour,
            "weather.sunrise_hour",
            "must be < weather.sunset_hour",
        );
        check(
            (0.0..=1.0).contains(&w.cloud_alpha),
            "weather.cloud_alpha",
            "must be in [0, 1]",
        );
        check(w.cloud_noise_std >= 0.0, "weather.cloud_noise_std", "must be >= 0");
        check(w.peak_solar_w_m2 >= 0.0, "weather.peak_solar_w_m2", "must be >= 0");

        let occ = &self.occupancy;
        check(
            (0.0..=24.0).contains(&occ.start_hour) && (0.0..=24.0).contains(&occ.end_hour),
            "occupancy.start_hour",
            "occupancy hours must be in [0, 24]",
        );

        let sn = &self.sensors;
        check(
            sn.model == "ideal" || sn.model == "simulated",
            "sensors.model",
            "must be \"ideal\" or \"simulated\"",
        );
        check(
            (0.0..=1.0).contains(&sn.fault_probability),
            "sensors.fault_probability",
            "must be in [0, 1]",
        );

        errors
    }
}
