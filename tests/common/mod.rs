//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use hvac_sim::sensors::IdealSensors;
use hvac_sim::sim::controller::{PidController, PidParams};
use hvac_sim::sim::engine::ControlLoop;
use hvac_sim::sim::thermal::{BuildingParams, HvacParams, InitialConditions, ThermalModel};
use hvac_sim::sim::types::SimConfig;
use hvac_sim::sim::weather::{Environment, OccupancySchedule, WeatherParams};

/// One-minute ticks, 22 °C / 45 %RH setpoints, seed 42.
pub fn config(ticks: usize) -> SimConfig {
    SimConfig::new(60.0, ticks, 42)
}

/// Default building at the given indoor and wall temperatures, 45 %RH.
pub fn zone(indoor_c: f64, wall_c: f64) -> ThermalModel {
    ThermalModel::new(
        BuildingParams::default(),
        HvacParams::default(),
        InitialConditions {
            indoor_temp_c: indoor_c,
            wall_temp_c: wall_c,
            indoor_rh: 45.0,
        },
    )
    .unwrap_or_else(|e| panic!("default building should be valid: {e}"))
}

/// Nobody in the building, ever.
pub fn empty_building() -> OccupancySchedule {
    OccupancySchedule {
        occupants: 0,
        ..OccupancySchedule::default()
    }
}

/// Constant outdoor temperature, no sun, no occupants.
pub fn still_weather(outdoor_c: f64) -> Environment {
    Environment::new(WeatherParams::constant(outdoor_c), empty_building(), 42)
}

/// Default diurnal weather with a noisy cloud process.
pub fn cloudy_weather(seed: u64) -> Environment {
    let weather = WeatherParams {
        cloud_noise_std: 0.3,
        ..WeatherParams::default()
    };
    Environment::new(weather, OccupancySchedule::default(), seed)
}

pub fn pid(kp: f64, ki: f64, kd: f64) -> PidController {
    PidController::new(PidParams::new(kp, ki, kd))
        .unwrap_or_else(|e| panic!("PID gains should be valid: {e}"))
}

/// PID (2, 0.1, 0.05) on temperature and (1.5, 0.01, 0) on humidity, ideal sensors.
pub fn pid_loop(
    config: SimConfig,
    model: ThermalModel,
    environment: Environment,
) -> ControlLoop<PidController, IdealSensors> {
    ControlLoop::new(
        config,
        pid(2.0, 0.1, 0.05),
        pid(1.5, 0.01, 0.0),
        model,
        environment,
        IdealSensors,
    )
}
