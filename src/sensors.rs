//! Sensor seam between the physical model and the controllers.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::SensorFault;
use crate::sim::thermal::PhysicalState;

/// Standard sea-level pressure (hPa).
const BASE_PRESSURE_HPA: f64 = 1013.25;
/// Outdoor background CO2 (ppm).
const BASE_CO2_PPM: f64 = 400.0;
/// Steady-state CO2 rise per occupant (ppm).
const CO2_PER_OCCUPANT_PPM: f64 = 30.0;

/// One sample of every sensed quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Indoor air temperature (°C).
    pub indoor_temp_c: f64,
    /// Indoor relative humidity (%).
    pub indoor_rh: f64,
    /// Outdoor air temperature (°C).
    pub outdoor_temp_c: f64,
    /// Indoor CO2 concentration (ppm).
    pub co2_ppm: f64,
    /// Barometric pressure (hPa).
    pub pressure_hpa: f64,
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            indoor_temp_c: 22.0,
            indoor_rh: 45.0,
            outdoor_temp_c: 15.0,
            co2_ppm: BASE_CO2_PPM,
            pressure_hpa: BASE_PRESSURE_HPA,
        }
    }
}

impl SensorReading {
    /// Exact reading of a physical state.
    pub fn exact(state: &PhysicalState, occupants: u32) -> Self {
        Self {
            indoor_temp_c: state.indoor_temp_c,
            indoor_rh: state.indoor_rh,
            outdoor_temp_c: state.outdoor_temp_c,
            co2_ppm: co2_ppm(occupants),
            pressure_hpa: BASE_PRESSURE_HPA,
        }
    }

    /// Name of the first non-finite field, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("indoor_temp_c", self.indoor_temp_c),
            ("indoor_rh", self.indoor_rh),
            ("outdoor_temp_c", self.outdoor_temp_c),
            ("co2_ppm", self.co2_ppm),
            ("pressure_hpa", self.pressure_hpa),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Steady-state indoor CO2 for a number of occupants (ppm).
pub fn co2_ppm(occupants: u32) -> f64 {
    BASE_CO2_PPM + f64::from(occupants) * CO2_PER_OCCUPANT_PPM
}

/// Gaussian noise via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    z0 * std_dev
}

/// Source of sensed state for the control loop.
pub trait SensorSource {
    /// Samples the sensors given the true zone state and current occupancy.
    ///
    /// # Errors
    ///
    /// Returns a [`SensorFault`] when the reading is unavailable. The loop
    /// treats this as non-fatal.
    fn read(&mut self, truth: &PhysicalState, occupants: u32) -> Result<SensorReading, SensorFault>;
}

/// Noise-free sensors that report the true state.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealSensors;

impl SensorSource for IdealSensors {
    fn read(&mut self, truth: &PhysicalState, occupants: u32) -> Result<SensorReading, SensorFault> {
        Ok(SensorReading::exact(truth, occupants))
    }
}

/// Noise and fault characteristics of [`SimulatedSensors`].
#[derive(Debug, Clone, PartialEq)]
pub struct SensorNoise {
    pub temp_std_c: f64,
    pub rh_std: f64,
    pub co2_std_ppm: f64,
    pub pressure_std_hpa: f64,
    /// Constant bias added to the indoor temperature (°C).
    pub temp_offset_c: f64,
    /// Probability that a read faults, in [0, 1].
    pub fault_probability: f64,
}

impl Default for SensorNoise {
    fn default() -> Self {
        Self {
            temp_std_c: 0.1,
            rh_std: 1.0,
            co2_std_ppm: 10.0,
            pressure_std_hpa: 0.5,
            temp_offset_c: 0.0,
            fault_probability: 0.001,
        }
    }
}

/// Sensors with seeded Gaussian noise and random dropouts.
#[derive(Debug, Clone)]
pub struct SimulatedSensors {
    noise: SensorNoise,
    rng: StdRng,
    faults: usize,
}

impl SimulatedSensors {
    pub fn new(noise: SensorNoise, seed: u64) -> Self {
        Self {
            noise,
            rng: StdRng::seed_from_u64(seed),
            faults: 0,
        }
    }

    /// Faults injected so far.
    pub fn injected_faults(&self) -> usize {
        self.faults
    }
}

impl SensorSource for SimulatedSensors {
    fn read(&mut self, truth: &PhysicalState, occupants: u32) -> Result<SensorReading, SensorFault> {
        let n = &self.noise;
        if self.rng.random::<f64>() < n.fault_probability {
            self.faults += 1;
            return Err(SensorFault {
                sensor: "zone",
                reason: "no response".to_string(),
            });
        }

        let exact = SensorReading::exact(truth, occupants);
        Ok(SensorReading {
            indoor_temp_c: exact.indoor_temp_c
                + n.temp_offset_c
                + gaussian_noise(&mut self.rng, n.temp_std_c),
            indoor_rh: (exact.indoor_rh + gaussian_noise(&mut self.rng, n.rh_std)).clamp(0.0, 100.0),
            outdoor_temp_c: exact.outdoor_temp_c + gaussian_noise(&mut self.rng, n.temp_std_c),
            co2_ppm: (exact.co2_ppm + gaussian_noise(&mut self.rng, n.co2_std_ppm)).max(300.0),
            pressure_hpa: exact.pressure_hpa + gaussian_noise(&mut self.rng, n.pressure_std_hpa),
        })
    }
}

/// Sensor model selected at runtime from configuration.
#[derive(Debug, Clone)]
pub enum AnySensors {
    Ideal(IdealSensors),
    Simulated(SimulatedSensors),
}

impl SensorSource for AnySensors {
    fn read(&mut self, truth: &PhysicalState, occupants: u32) -> Result<SensorReading, SensorFault> {
        match self {
            Self::Ideal(s) => s.read(truth, occupants),
            Self::Simulated(s) => s.read(truth, occupants),
        }
    }
}
