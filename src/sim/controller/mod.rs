//! Feedback controllers that turn a setpoint error into a bounded actuation command.
//!
//! Commands are signed percentages of actuator capacity: positive values raise
//! the controlled quantity (heat, humidify), negative values lower it (cool,
//! dehumidify).

/// Rule-based fuzzy inference controller.
pub mod fuzzy;
/// Bang-bang controller with deadband and hysteresis.
pub mod onoff;
/// Proportional-integral-derivative controller with anti-windup.
pub mod pid;

use std::fmt;
use std::str::FromStr;

use crate::error::ControlError;

pub use fuzzy::{FuzzyController, FuzzyParams};
pub use onoff::{OnOffController, OnOffParams, SwitchState};
pub use pid::{PidController, PidParams};

/// Common interface of every control strategy.
///
/// Implementations own their transient memory (integral, previous error,
/// switch state), so one instance must only be driven by one loop.
pub trait Controller {
    /// Tunable parameters of the strategy.
    type Params: Clone;

    /// Computes the actuation command for one tick.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a negative or non-finite `dt_s` and
    /// `NumericAnomaly` when the inputs make the command non-finite.
    fn compute(&mut self, setpoint: f64, measured: f64, dt_s: f64) -> Result<f64, ControlError>;

    /// Clears all transient state, as if freshly constructed.
    fn reset(&mut self);

    /// Returns a copy of the current parameters.
    fn params(&self) -> Self::Params;

    /// Replaces the parameters and resets transient state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `params` fail validation; the controller
    /// is left unchanged in that case.
    fn reconfigure(&mut self, params: Self::Params) -> Result<(), ControlError>;

    /// Short strategy name used in logs and reports.
    fn kind(&self) -> ControllerKind;
}

/// Which way a single-direction actuator pushes the controlled quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Heating or humidifying.
    Raise,
    /// Cooling or dehumidifying.
    Lower,
}

impl Direction {
    /// How far the measurement is from the setpoint in the direction this
    /// actuator can correct. Positive means the actuator is needed.
    pub fn demand(self, setpoint: f64, measured: f64) -> f64 {
        match self {
            Self::Raise => setpoint - measured,
            Self::Lower => measured - setpoint,
        }
    }

    /// Sign of the command this actuator produces.
    pub fn sign(self) -> f64 {
        match self {
            Self::Raise => 1.0,
            Self::Lower => -1.0,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raise" | "heat" | "humidify" => Ok(Self::Raise),
            "lower" | "cool" | "dehumidify" => Ok(Self::Lower),
            other => Err(format!(
                "unknown direction \"{other}\", expected \"heat\" or \"cool\""
            )),
        }
    }
}

/// Identifies a control strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    Pid,
    Fuzzy,
    OnOff,
}

impl ControllerKind {
    /// All strategies, in report order.
    pub const ALL: [Self; 3] = [Self::Pid, Self::Fuzzy, Self::OnOff];

    /// Configuration name of the strategy.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pid => "pid",
            Self::Fuzzy => "fuzzy",
            Self::OnOff => "onoff",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControllerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pid" => Ok(Self::Pid),
            "fuzzy" => Ok(Self::Fuzzy),
            "onoff" | "on-off" => Ok(Self::OnOff),
            other => Err(format!(
                "unknown controller \"{other}\", expected \"pid\", \"fuzzy\" or \"onoff\""
            )),
        }
    }
}

/// Parameters for any strategy, tagged by variant.
#[derive(Debug, Clone)]
pub enum ControllerParams {
    Pid(PidParams),
    Fuzzy(FuzzyParams),
    OnOff(OnOffParams),
}

/// A controller of any strategy, selected at runtime.
///
/// Dispatches statically to the wrapped variant, the same way the loop would
/// if it were generic over a single strategy.
#[derive(Debug, Clone)]
pub enum AnyController {
    Pid(PidController),
    Fuzzy(FuzzyController),
    OnOff(OnOffController),
}

impl AnyController {
    /// Builds the controller variant matching `params`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the parameters fail validation.
    pub fn new(params: ControllerParams) -> Result<Self, ControlError> {
        Ok(match params {
            ControllerParams::Pid(p) => Self::Pid(PidController::new(p)?),
            ControllerParams::Fuzzy(p) => Self::Fuzzy(FuzzyController::new(p)?),
            ControllerParams::OnOff(p) => Self::OnOff(OnOffController::new(p)?),
        })
    }
}

impl Controller for AnyController {
    type Params = ControllerParams;

    fn compute(&mut self, setpoint: f64, measured: f64, dt_s: f64) -> Result<f64, ControlError> {
        match self {
            Self::Pid(c) => c.compute(setpoint, measured, dt_s),
            Self::Fuzzy(c) => c.compute(setpoint, measured, dt_s),
            Self::OnOff(c) => c.compute(setpoint, measured, dt_s),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Pid(c) => c.reset(),
            Self::Fuzzy(c) => c.reset(),
            Self::OnOff(c) => c.reset(),
        }
    }

    fn params(&self) -> ControllerParams {
        match self {
            Self::Pid(c) => ControllerParams::Pid(c.params()),
            Self::Fuzzy(c) => ControllerParams::Fuzzy(c.params()),
            Self::OnOff(c) => ControllerParams::OnOff(c.params()),
        }
    }

    /// Re-tunes the current strategy, or switches strategy when `params`
    /// belong to a different variant.
    fn reconfigure(&mut self, params: ControllerParams) -> Result<(), ControlError> {
        match (self, params) {
            (Self::Pid(c), ControllerParams::Pid(p)) => c.reconfigure(p),
            (Self::Fuzzy(c), ControllerParams::Fuzzy(p)) => c.reconfigure(p),
            (Self::OnOff(c), ControllerParams::OnOff(p)) => c.reconfigure(p),
            (this, other) => {
                *this = Self::new(other)?;
                Ok(())
            }
        }
    }

    fn kind(&self) -> ControllerKind {
        match self {
            Self::Pid(_) => ControllerKind::Pid,
            Self::Fuzzy(_) => ControllerKind::Fuzzy,
            Self::OnOff(_) => ControllerKind::OnOff,
        }
    }
}

/// Rejects negative or non-finite tick durations.
pub(crate) fn check_dt(dt_s: f64) -> Result<(), ControlError> {
    if dt_s.is_finite() && dt_s >= 0.0 {
        Ok(())
    } else {
        Err(ControlError::invalid(
            "dt",
            format!("must be finite and >= 0, got {dt_s}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_params() -> Vec<ControllerParams> {
        vec![
            ControllerParams::Pid(PidParams::new(2.0, 0.1, 0.05)),
            ControllerParams::Fuzzy(FuzzyParams::temperature()),
            ControllerParams::OnOff(OnOffParams::new(1.0, 2.0, Direction::Raise)),
        ]
    }

    #[test]
    fn reset_matches_fresh_controller_for_every_variant() {
        for params in all_params() {
            let mut used = AnyController::new(params.clone()).unwrap();
            let mut fresh = AnyController::new(params).unwrap();

            for measured in [15.0, 16.5, 19.0, 25.0, 23.0] {
                used.compute(22.0, measured, 60.0).unwrap();
            }
            used.reset();

            let a = used.compute(22.0, 18.0, 60.0);
            let b = fresh.compute(22.0, 18.0, 60.0);
            assert_eq!(a, b, "{} should forget its history on reset", used.kind());
        }
    }

    #[test]
    fn negative_dt_is_rejected_by_every_variant() {
        for params in all_params() {
            let mut c = AnyController::new(params).unwrap();
            assert!(matches!(
                c.compute(22.0, 20.0, -1.0),
                Err(ControlError::InvalidParameter { name: "dt", .. })
            ));
        }
    }

    #[test]
    fn reconfigure_with_other_variant_switches_strategy() {
        let mut c =
            AnyController::new(ControllerParams::Pid(PidParams::new(1.0, 0.0, 0.0))).unwrap();
        c.reconfigure(ControllerParams::Fuzzy(FuzzyParams::temperature()))
            .unwrap();
        assert_eq!(c.kind(), ControllerKind::Fuzzy);
    }

    #[test]
    fn invalid_reconfigure_leaves_controller_unchanged() {
        let mut c =
            AnyController::new(ControllerParams::Pid(PidParams::new(1.0, 0.0, 0.0))).unwrap();
        let bad = PidParams::new(-1.0, 0.0, 0.0);
        assert!(c.reconfigure(ControllerParams::Pid(bad)).is_err());
        match c.params() {
            ControllerParams::Pid(p) => assert_eq!(p.kp, 1.0),
            other => panic!("expected pid params, got {other:?}"),
        }
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in ControllerKind::ALL {
            assert_eq!(kind.as_str().parse::<ControllerKind>(), Ok(kind));
        }
        assert!("bogus".parse::<ControllerKind>().is_err());
    }

    #[test]
    fn direction_demand_sign() {
        assert_eq!(Direction::Raise.demand(22.0, 20.0), 2.0);
        assert_eq!(Direction::Lower.demand(22.0, 25.0), 3.0);
        assert_eq!(Direction::Lower.sign(), -1.0);
    }
}
