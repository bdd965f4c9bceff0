//! Control loop that ties sensors, controllers and the thermal model together.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{SyncSender, TrySendError};

use tracing::{debug, error, info, warn};

use crate::error::{Component, ControlError, LoopError};
use crate::sensors::{SensorReading, SensorSource};

use super::clock::Clock;
use super::controller::Controller;
use super::energy::{EnergyMeter, EnergyRecord};
use super::thermal::{PhysicalState, ThermalModel};
use super::types::{ActuationCommand, SimConfig, StepResult};
use super::weather::Environment;

/// Cooperative stop flag shared with a running [`ControlLoop`].
///
/// The loop checks the flag between ticks, so a tick in progress always
/// completes.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop before its next tick.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fixed-interval control loop.
///
/// Generic over `C: Controller` for static dispatch; the temperature and
/// humidity channels each own a separate instance of the same strategy.
/// Sensors are generic over `S: SensorSource` so tests can script faults.
pub struct ControlLoop<C: Controller, S: SensorSource> {
    config: SimConfig,
    temperature: C,
    humidity: C,
    model: ThermalModel,
    environment: Environment,
    sensors: S,
    last_good: SensorReading,
    sensor_faults: usize,
    tick: usize,
    meter: EnergyMeter,
    stop: StopHandle,
    publisher: Option<SyncSender<StepResult>>,
    realtime_factor: Option<f64>,
}

impl<C: Controller, S: SensorSource> ControlLoop<C, S> {
    /// Creates a loop at tick 0.
    ///
    /// The fallback reading used on a sensor fault starts as the exact
    /// initial state of `model`.
    pub fn new(
        config: SimConfig,
        temperature: C,
        humidity: C,
        model: ThermalModel,
        environment: Environment,
        sensors: S,
    ) -> Self {
        let last_good = SensorReading::exact(&model.state(), environment.occupants(0.0));
        Self {
            config,
            temperature,
            humidity,
            model,
            environment,
            sensors,
            last_good,
            sensor_faults: 0,
            tick: 0,
            meter: EnergyMeter::new(),
            stop: StopHandle::new(),
            publisher: None,
            realtime_factor: None,
        }
    }

    /// Publishes every step result on `sender` without blocking.
    ///
    /// Records that do not fit in the channel are dropped.
    pub fn with_publisher(mut self, sender: SyncSender<StepResult>) -> Self {
        self.publisher = Some(sender);
        self
    }

    /// Paces ticks against wall-clock time, `factor` simulated seconds per real second.
    pub fn with_realtime(mut self, factor: f64) -> Self {
        self.realtime_factor = Some(factor);
        self
    }

    /// Handle that stops the loop between ticks.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Executes one tick and returns its record.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::TickFailed`] naming the failing component. The
    /// tick counter does not advance in that case.
    pub fn step(&mut self) -> Result<StepResult, LoopError> {
        let tick = self.tick;
        let dt = self.config.dt_s;
        let elapsed = self.model.state().elapsed_s;

        // 1. Disturbances for this interval
        let disturbances = self.environment.disturbances(elapsed);

        // 2. Sense, falling back to the last good reading
        let (measured, sensor_fault) = self.sense(tick, disturbances.occupants);

        // 3. Control
        let u_temp = self
            .temperature
            .compute(self.config.temperature_setpoint_c, measured.indoor_temp_c, dt)
            .map_err(|e| self.halt(tick, Component::TemperatureController, e))?;
        let u_rh = self
            .humidity
            .compute(self.config.humidity_setpoint, measured.indoor_rh, dt)
            .map_err(|e| self.halt(tick, Component::HumidityController, e))?;
        let actuation = ActuationCommand::new(u_temp, u_rh);

        // 4. Physics
        let state = self
            .model
            .step(actuation, &disturbances, dt)
            .map_err(|e| self.halt(tick, Component::ThermalModel, e))?;
        if !state.is_plausible() {
            warn!(
                tick,
                indoor_c = state.indoor_temp_c,
                wall_c = state.wall_temp_c,
                "implausible zone temperature"
            );
        }

        // 5. Energy
        let energy = EnergyRecord::from_command(self.model.hvac(), actuation, dt);
        self.meter.record(&energy, dt);

        let result = StepResult {
            tick,
            time_s: state.elapsed_s,
            measured,
            state,
            actuation,
            energy,
            sensor_fault,
        };
        debug!(
            tick,
            indoor_c = state.indoor_temp_c,
            rh = state.indoor_rh,
            u_temp,
            u_rh,
            power_w = energy.total_w(),
            "tick complete"
        );

        self.publish(&result);
        self.tick += 1;
        Ok(result)
    }

    /// Runs the configured number of ticks, or fewer if stopped.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoopError`]; results up to that tick are discarded.
    pub fn run(&mut self) -> Result<Vec<StepResult>, LoopError> {
        let mut clock = self.clock(Clock::bounded(self.config.ticks));
        let mut results = Vec::with_capacity(self.config.ticks);
        while !self.stop.is_stopped() && clock.tick().is_some() {
            results.push(self.step()?);
        }
        self.log_finish(results.len());
        Ok(results)
    }

    /// Runs until the [`StopHandle`] is triggered, handing each result to `on_step`.
    ///
    /// Returns the number of ticks executed.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoopError`].
    pub fn run_until_stopped(
        &mut self,
        mut on_step: impl FnMut(&StepResult),
    ) -> Result<usize, LoopError> {
        let mut clock = self.clock(Clock::unbounded());
        let mut count = 0;
        while !self.stop.is_stopped() && clock.tick().is_some() {
            let result = self.step()?;
            on_step(&result);
            count += 1;
        }
        self.log_finish(count);
        Ok(count)
    }

    /// Current true zone state.
    pub fn state(&self) -> PhysicalState {
        self.model.state()
    }

    /// Next tick index.
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Sensor faults seen so far.
    pub fn sensor_faults(&self) -> usize {
        self.sensor_faults
    }

    /// Energy totals so far.
    pub fn meter(&self) -> &EnergyMeter {
        &self.meter
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Temperature controller, e.g. for `reconfigure` between ticks.
    pub fn temperature_controller_mut(&mut self) -> &mut C {
        &mut self.temperature
    }

    /// Humidity controller, e.g. for `reconfigure` between ticks.
    pub fn humidity_controller_mut(&mut self) -> &mut C {
        &mut self.humidity
    }

    fn clock(&self, clock: Clock) -> Clock {
        match self.realtime_factor {
            Some(factor) => clock.paced(self.config.dt_s, factor),
            None => clock,
        }
    }

    fn sense(&mut self, tick: usize, occupants: u32) -> (SensorReading, bool) {
        let outcome = self
            .sensors
            .read(&self.model.state(), occupants)
            .map_err(|fault| fault.to_string())
            .and_then(|reading| match reading.non_finite_field() {
                Some(field) => Err(format!("non-finite {field}")),
                None => Ok(reading),
            });

        match outcome {
            Ok(reading) => {
                self.last_good = reading;
                (reading, false)
            }
            Err(reason) => {
                self.sensor_faults += 1;
                warn!(
                    tick,
                    reason = %reason,
                    faults = self.sensor_faults,
                    "sensor fault, holding last good reading"
                );
                (self.last_good, true)
            }
        }
    }

    fn halt(&self, tick: usize, component: Component, source: ControlError) -> LoopError {
        error!(tick, %component, error = %source, "control loop halted");
        LoopError::TickFailed {
            tick,
            component,
            source,
        }
    }

    fn publish(&mut self, result: &StepResult) {
        let Some(sender) = &self.publisher else {
            return;
        };
        match sender.try_send(result.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(tick = result.tick, "publisher full, record dropped");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(tick = result.tick, "publisher disconnected");
                self.publisher = None;
            }
        }
    }

    fn log_finish(&self, ticks: usize) {
        info!(
            ticks,
            controller = %self.temperature.kind(),
            sensor_faults = self.sensor_faults,
            energy_kwh = self.meter.total_kwh(),
            stopped = self.stop.is_stopped(),
            "control loop finished"
        );
    }
}

/// Re-applies a recorded actuation sequence to a fresh model and environment.
///
/// Given the same initial model, environment seed and `dt_s`, the returned
/// state equals the final state of the run that produced `commands`.
///
/// # Errors
///
/// Returns the first error raised by the thermal model.
pub fn replay(
    model: &mut ThermalModel,
    environment: &mut Environment,
    commands: &[ActuationCommand],
    dt_s: f64,
) -> Result<PhysicalState, ControlError> {
    for &cmd in commands {
        let disturbances = environment.disturbances(model.state().elapsed_s);
        model.step(cmd, &disturbances, dt_s)?;
    }
    Ok(model.state())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::sync_channel;

    use super::*;
    use crate::sensors::IdealSensors;
    use crate::sim::controller::{PidController, PidParams};
    use crate::sim::thermal::{BuildingParams, HvacParams, InitialConditions};
    use crate::sim::weather::{OccupancySchedule, WeatherParams};

    fn pid_loop(ticks: usize) -> ControlLoop<PidController, IdealSensors> {
        let pid = |kp, ki, kd| {
            PidController::new(PidParams::new(kp, ki, kd)).unwrap_or_else(|e| panic!("{e}"))
        };
        let model = ThermalModel::new(
            BuildingParams::default(),
            HvacParams::default(),
            InitialConditions {
                indoor_temp_c: 18.0,
                wall_temp_c: 18.0,
                indoor_rh: 45.0,
            },
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let environment =
            Environment::new(WeatherParams::constant(5.0), OccupancySchedule::default(), 1);
        ControlLoop::new(
            SimConfig::new(60.0, ticks, 1),
            pid(2.0, 0.1, 0.05),
            pid(2.0, 0.05, 0.0),
            model,
            environment,
            IdealSensors,
        )
    }

    #[test]
    fn run_produces_one_result_per_tick() {
        let mut l = pid_loop(10);
        let results = l.run().unwrap();
        assert_eq!(results.len(), 10);
        assert_eq!(l.tick(), 10);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.tick, i);
            assert_eq!(r.time_s, (i + 1) as f64 * 60.0);
        }
        assert_eq!(l.meter().samples(), 10);
    }

    #[test]
    fn stop_before_run_executes_nothing() {
        let mut l = pid_loop(10);
        l.stop_handle().stop();
        assert_eq!(l.run().map(|r| r.len()), Ok(0));
    }

    #[test]
    fn run_until_stopped_honours_stop_between_ticks() {
        let mut l = pid_loop(0);
        let stop = l.stop_handle();
        let mut seen = 0;
        let count = l.run_until_stopped(|r| {
            seen += 1;
            if r.tick == 4 {
                stop.stop();
            }
        });
        assert_eq!(count, Ok(5));
        assert_eq!(seen, 5);
    }

    #[test]
    fn full_publisher_drops_records_without_blocking() {
        let (tx, rx) = sync_channel(2);
        let mut l = pid_loop(5).with_publisher(tx);
        assert_eq!(l.run().unwrap().len(), 5);
        let received: Vec<StepResult> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].tick, 0);
    }

    #[test]
    fn disconnected_publisher_is_ignored() {
        let (tx, rx) = sync_channel(1);
        drop(rx);
        let mut l = pid_loop(3).with_publisher(tx);
        assert_eq!(l.run().unwrap().len(), 3);
    }

    #[test]
    fn replay_reproduces_final_state() {
        let mut l = pid_loop(30);
        let results = l.run().unwrap();
        assert_eq!(results.len(), 30);
        let commands: Vec<ActuationCommand> = results.iter().map(|r| r.actuation).collect();

        let mut model = ThermalModel::new(
            BuildingParams::default(),
            HvacParams::default(),
            InitialConditions {
                indoor_temp_c: 18.0,
                wall_temp_c: 18.0,
                indoor_rh: 45.0,
            },
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let mut env =
            Environment::new(WeatherParams::constant(5.0), OccupancySchedule::default(), 1);
        let replayed = replay(&mut model, &mut env, &commands, 60.0).unwrap();
        assert_eq!(replayed, l.state());
        assert_eq!(replayed.tick, 30);
    }
}
