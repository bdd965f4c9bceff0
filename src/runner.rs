//! Assembles a control loop from a scenario and runs it to completion.

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, ScenarioConfig};
use crate::error::{ControlError, LoopError};
use crate::sensors::{AnySensors, IdealSensors, SimulatedSensors};
use crate::sim::controller::{AnyController, ControllerKind, ControllerParams};
use crate::sim::engine::ControlLoop;
use crate::sim::kpi::{KpiReport, KpiTargets};
use crate::sim::thermal::ThermalModel;
use crate::sim::types::StepResult;
use crate::sim::weather::Environment;

/// Loop type produced from a scenario.
pub type ScenarioLoop = ControlLoop<AnyController, AnySensors>;

/// Failure to build or complete a scenario run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The scenario failed validation.
    #[error("invalid scenario: {}", join(.0))]
    InvalidConfig(Vec<ConfigError>),
    /// A controller or the thermal model rejected its parameters.
    #[error("cannot build loop: {0}")]
    Build(#[from] ControlError),
    /// The loop halted during the run.
    #[error(transparent)]
    Loop(#[from] LoopError),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Output of one completed run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Strategy driving both channels.
    pub kind: ControllerKind,
    /// Per-tick records.
    pub results: Vec<StepResult>,
    /// Aggregate indicators.
    pub kpi: KpiReport,
}

/// KPI targets taken from the scenario's setpoints.
pub fn kpi_targets(config: &ScenarioConfig) -> KpiTargets {
    KpiTargets {
        temperature_c: config.simulation.temperature_setpoint_c,
        humidity: config.simulation.humidity_setpoint,
        comfort_band_c: config.simulation.comfort_band_c,
    }
}

/// Parameters of the temperature and humidity controllers for `kind`.
fn controller_params(
    config: &ScenarioConfig,
    kind: ControllerKind,
) -> Result<(ControllerParams, ControllerParams), RunError> {
    let params = match kind {
        ControllerKind::Pid => (
            ControllerParams::Pid(config.pid.temperature()),
            ControllerParams::Pid(config.pid.humidity()),
        ),
        ControllerKind::Fuzzy => (
            ControllerParams::Fuzzy(config.fuzzy.temperature()),
            ControllerParams::Fuzzy(config.fuzzy.humidity()),
        ),
        ControllerKind::OnOff => {
            let direction_error = |field: &str| {
                RunError::InvalidConfig(vec![ConfigError {
                    field: field.to_string(),
                    message: "unknown direction".to_string(),
                }])
            };
            let temperature = config
                .onoff
                .temperature()
                .ok_or_else(|| direction_error("onoff.direction"))?;
            let humidity = config
                .onoff
                .humidity()
                .ok_or_else(|| direction_error("onoff.humidity_direction"))?;
            (
                ControllerParams::OnOff(temperature),
                ControllerParams::OnOff(humidity),
            )
        }
    };
    Ok(params)
}

/// Builds a loop at tick 0 for `config`, driven by `kind` on both channels.
///
/// The environment is seeded with the scenario seed and the sensors with the
/// next seed, so every strategy sees identical weather and sensor noise.
///
/// # Errors
///
/// Returns [`RunError::InvalidConfig`] if validation fails and
/// [`RunError::Build`] if a component rejects its parameters.
pub fn build_loop(config: &ScenarioConfig, kind: ControllerKind) -> Result<ScenarioLoop, RunError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(RunError::InvalidConfig(errors));
    }

    let (temperature_params, humidity_params) = controller_params(config, kind)?;
    let temperature = AnyController::new(temperature_params)?;
    let humidity = AnyController::new(humidity_params)?;

    let model = ThermalModel::new(
        config.building.params(),
        config.hvac.params(),
        config.building.initial(),
    )?;

    let seed = config.simulation.seed;
    let environment = Environment::new(config.weather.params(), config.occupancy.schedule(), seed);
    let sensors = match config.sensors.model.as_str() {
        "ideal" => AnySensors::Ideal(IdealSensors),
        _ => AnySensors::Simulated(SimulatedSensors::new(
            config.sensors.noise(),
            seed.wrapping_add(1),
        )),
    };

    Ok(ControlLoop::new(
        config.simulation.sim_config(),
        temperature,
        humidity,
        model,
        environment,
        sensors,
    ))
}

/// Runs `config` for its configured number of ticks.
///
/// With `print_readable_log` set, one line per tick is printed to stdout.
///
/// # Errors
///
/// Returns any error from [`build_loop`] or from the loop itself.
pub fn run_scenario(
    config: &ScenarioConfig,
    kind: ControllerKind,
    print_readable_log: bool,
) -> Result<RunOutput, RunError> {
    let mut control_loop = build_loop(config, kind)?;
    let results = control_loop.run()?;
    if print_readable_log {
        for r in &results {
            println!("{r}");
        }
    }
    Ok(summarize(config, kind, results))
}

/// Runs the same scenario once per strategy, in the order pid, fuzzy, onoff.
///
/// # Errors
///
/// Returns the first error from any of the runs.
pub fn run_comparison(config: &ScenarioConfig) -> Result<Vec<RunOutput>, RunError> {
    [ControllerKind::Pid, ControllerKind::Fuzzy, ControllerKind::OnOff]
        .into_iter()
        .map(|kind| run_scenario(config, kind, false))
        .collect()
}

/// Computes the KPI report of a finished run.
pub fn summarize(
    config: &ScenarioConfig,
    kind: ControllerKind,
    results: Vec<StepResult>,
) -> RunOutput {
    let kpi = KpiReport::from_results(&results, &kpi_targets(config));
    info!(
        controller = %kind,
        ticks = results.len(),
        rmse_c = kpi.rmse_temp_c,
        energy_kwh = kpi.total_energy_kwh,
        "scenario complete"
    );
    RunOutput { kind, results, kpi }
}
