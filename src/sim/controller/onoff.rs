use super::{Controller, ControllerKind, Direction, check_dt};
use crate::error::ControlError;

/// On-Off controller tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct OnOffParams {
    /// Half-width of the band around the setpoint where nothing switches.
    pub deadband: f64,
    /// Extra margin beyond each deadband edge before switching.
    pub hysteresis: f64,
    /// Command magnitude while on (%).
    pub max_output: f64,
    /// Which way the actuator pushes when on.
    pub direction: Direction,
}

impl OnOffParams {
    /// Creates parameters with a full-power (100%) actuator.
    pub fn new(deadband: f64, hysteresis: f64, direction: Direction) -> Self {
        Self {
            deadband,
            hysteresis,
            max_output: 100.0,
            direction,
        }
    }

    /// Demand above which the actuator switches on; its negation switches it off.
    pub fn switch_threshold(&self) -> f64 {
        self.deadband + self.hysteresis / 2.0
    }

    fn validate(&self) -> Result<(), ControlError> {
        if !self.deadband.is_finite() || self.deadband < 0.0 {
            return Err(ControlError::invalid(
                "deadband",
                format!("must be finite and >= 0, got {}", self.deadband),
            ));
        }
        if !self.hysteresis.is_finite() || self.hysteresis < 0.0 {
            return Err(ControlError::invalid(
                "hysteresis",
                format!("must be finite and >= 0, got {}", self.hysteresis),
            ));
        }
        if !self.max_output.is_finite() || self.max_output <= 0.0 {
            return Err(ControlError::invalid(
                "max_output",
                format!("must be finite and > 0, got {}", self.max_output),
            ));
        }
        Ok(())
    }
}

/// Actuator state of an [`OnOffController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchState {
    #[default]
    Off,
    On,
}

/// Bang-bang controller with deadband and hysteresis.
///
/// Switches on once the demand exceeds `deadband + hysteresis/2` and back off
/// only after it falls below `-(deadband + hysteresis/2)`; in between the
/// previous state is held.
#[derive(Debug, Clone)]
pub struct OnOffController {
    params: OnOffParams,
    state: SwitchState,
}

impl OnOffController {
    /// Creates a controller in the `Off` state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a negative deadband or hysteresis, or a
    /// non-positive output magnitude.
    pub fn new(params: OnOffParams) -> Result<Self, ControlError> {
        params.validate()?;
        Ok(Self {
            params,
            state: SwitchState::Off,
        })
    }

    /// Current actuator state.
    pub fn state(&self) -> SwitchState {
        self.state
    }
}

impl Controller for OnOffController {
    type Params = OnOffParams;

    fn compute(&mut self, setpoint: f64, measured: f64, dt_s: f64) -> Result<f64, ControlError> {
        check_dt(dt_s)?;
        let demand = ControlError::check_finite(
            "on-off demand",
            self.params.direction.demand(setpoint, measured),
        )?;
        let threshold = self.params.switch_threshold();

        self.state = match self.state {
            SwitchState::Off if demand > threshold => SwitchState::On,
            SwitchState::On if demand < -threshold => SwitchState::Off,
            held => held,
        };

        Ok(match self.state {
            SwitchState::On => self.params.direction.sign() * self.params.max_output,
            SwitchState::Off => 0.0,
        })
    }

    fn reset(&mut self) {
        self.state = SwitchState::Off;
    }

    fn params(&self) -> OnOffParams {
        self.params.clone()
    }

    fn reconfigure(&mut self, params: OnOffParams) -> Result<(), ControlError> {
        params.validate()?;
        self.params = params;
        self.reset();
        Ok(())
    }

    fn kind(&self) -> ControllerKind {
        ControllerKind::OnOff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooler() -> OnOffController {
        OnOffController::new(OnOffParams::new(1.0, 2.0, Direction::Lower))
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn starts_off() {
        assert_eq!(cooler().state(), SwitchState::Off);
    }

    #[test]
    fn hysteresis_cycle_around_22c() {
        let mut c = cooler();

        assert_eq!(c.compute(22.0, 25.0, 60.0), Ok(-100.0));
        assert_eq!(c.state(), SwitchState::On);

        // inside the band: holds
        assert_eq!(c.compute(22.0, 21.0, 60.0), Ok(-100.0));
        assert_eq!(c.state(), SwitchState::On);

        // exactly at the lower edge: still holds
        assert_eq!(c.compute(22.0, 20.0, 60.0), Ok(-100.0));
        assert_eq!(c.state(), SwitchState::On);

        assert_eq!(c.compute(22.0, 19.9, 60.0), Ok(0.0));
        assert_eq!(c.state(), SwitchState::Off);
    }

    #[test]
    fn stays_off_inside_band() {
        let mut c = cooler();
        for measured in [22.0, 23.0, 24.0, 20.5] {
            assert_eq!(c.compute(22.0, measured, 60.0), Ok(0.0));
        }
        assert_eq!(c.state(), SwitchState::Off);
    }

    #[test]
    fn heater_switches_on_below_band() {
        let mut c = OnOffController::new(OnOffParams::new(1.0, 2.0, Direction::Raise))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(c.compute(22.0, 21.0, 60.0), Ok(0.0));
        assert_eq!(c.compute(22.0, 19.5, 60.0), Ok(100.0));
        assert_eq!(c.compute(22.0, 23.5, 60.0), Ok(100.0));
        assert_eq!(c.compute(22.0, 24.5, 60.0), Ok(0.0));
    }

    #[test]
    fn reset_returns_to_off() {
        let mut c = cooler();
        c.compute(22.0, 30.0, 60.0).unwrap();
        c.reset();
        assert_eq!(c.state(), SwitchState::Off);
    }

    #[test]
    fn rejects_negative_deadband() {
        assert!(OnOffController::new(OnOffParams::new(-0.5, 1.0, Direction::Raise)).is_err());
        let mut p = OnOffParams::new(0.5, 1.0, Direction::Raise);
        p.max_output = 0.0;
        assert!(OnOffController::new(p).is_err());
    }
}
