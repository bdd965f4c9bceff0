//! Error types shared by the controllers, the thermal model and the control loop.

use std::fmt;

use thiserror::Error;

/// Failure raised by a controller or the thermal model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// A constructor or step argument is outside its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Violated constraint.
        reason: String,
    },
    /// A computation produced NaN or infinity.
    #[error("numeric anomaly: {quantity} = {value}")]
    NumericAnomaly {
        /// Quantity that became non-finite.
        quantity: &'static str,
        /// Offending value.
        value: f64,
    },
}

impl ControlError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Returns `Err(NumericAnomaly)` unless `value` is finite.
    pub(crate) fn check_finite(quantity: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NumericAnomaly { quantity, value })
        }
    }
}

/// Non-fatal fault reported by the sensor collaborator for one reading.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("sensor `{sensor}` fault: {reason}")]
pub struct SensorFault {
    /// Sensor identifier.
    pub sensor: &'static str,
    /// Fault description.
    pub reason: String,
}

/// Component of the control loop that can fail a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    TemperatureController,
    HumidityController,
    ThermalModel,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TemperatureController => "temperature controller",
            Self::HumidityController => "humidity controller",
            Self::ThermalModel => "thermal model",
        };
        f.write_str(name)
    }
}

/// Error surfaced by the control loop when it halts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoopError {
    /// A component failed during the given tick; the loop stopped there.
    #[error("tick {tick}: {component} failed: {source}")]
    TickFailed {
        /// Tick index at which the failure happened.
        tick: usize,
        /// Failing component.
        component: Component,
        /// Underlying error.
        #[source]
        source: ControlError,
    },
}

impl LoopError {
    /// Tick index at which the loop halted.
    pub fn tick(&self) -> usize {
        match self {
            Self::TickFailed { tick, .. } => *tick,
        }
    }

    /// Component that failed.
    pub fn component(&self) -> Component {
        match self {
            Self::TickFailed { component, .. } => *component,
        }
    }
}
