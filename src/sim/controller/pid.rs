use super::{Controller, ControllerKind, check_dt};
use crate::error::ControlError;

/// PID gains and output bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct PidParams {
    /// Proportional gain (% per unit of error).
    pub kp: f64,
    /// Integral gain (% per unit of error-second).
    pub ki: f64,
    /// Derivative gain (% per unit of error per second).
    pub kd: f64,
    /// Lower output bound (%).
    pub output_min: f64,
    /// Upper output bound (%).
    pub output_max: f64,
}

impl PidParams {
    /// Creates gains with the default ±100% output range.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            output_min: -100.0,
            output_max: 100.0,
        }
    }

    /// Replaces the output bounds.
    pub fn with_limits(mut self, output_min: f64, output_max: f64) -> Self {
        self.output_min = output_min;
        self.output_max = output_max;
        self
    }

    fn validate(&self) -> Result<(), ControlError> {
        for (name, gain) in [("kp", self.kp), ("ki", self.ki), ("kd", self.kd)] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(ControlError::invalid(
                    name,
                    format!("must be finite and >= 0, got {gain}"),
                ));
            }
        }
        if !(self.output_min.is_finite() && self.output_max.is_finite()) {
            return Err(ControlError::invalid("output_limits", "must be finite"));
        }
        if self.output_min >= self.output_max {
            return Err(ControlError::invalid(
                "output_limits",
                format!(
                    "min ({}) must be < max ({})",
                    self.output_min, self.output_max
                ),
            ));
        }
        Ok(())
    }
}

/// PID controller with a clamped integral accumulator.
///
/// The accumulator holds the integral *term* (`Σ ki·e·dt`) and is clamped to
/// the output bounds every tick, so a long saturation cannot wind it up past
/// what the actuator can deliver. The derivative acts on the error and is
/// skipped on the first tick after construction or [`reset`](Controller::reset),
/// which avoids a kick from stale history.
///
/// # Examples
///
/// ```
/// use hvac_sim::sim::controller::{Controller, PidController, PidParams};
///
/// let mut pid = PidController::new(PidParams::new(2.0, 0.1, 0.05)).unwrap();
/// let u = pid.compute(22.0, 18.0, 60.0).unwrap();
/// assert!(u > 0.0 && u <= 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct PidController {
    params: PidParams,
    integral: f64,
    previous_error: Option<f64>,
}

impl PidController {
    /// Creates a controller with zeroed transient state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative or non-finite gains, or
    /// output bounds with `min >= max`.
    pub fn new(params: PidParams) -> Result<Self, ControlError> {
        params.validate()?;
        Ok(Self {
            params,
            integral: 0.0,
            previous_error: None,
        })
    }

    /// Current integral term.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Error seen on the previous tick, if any.
    pub fn previous_error(&self) -> Option<f64> {
        self.previous_error
    }
}

impl Controller for PidController {
    type Params = PidParams;

    fn compute(&mut self, setpoint: f64, measured: f64, dt_s: f64) -> Result<f64, ControlError> {
        check_dt(dt_s)?;
        let p = &self.params;
        let error = ControlError::check_finite("pid error", setpoint - measured)?;

        let proportional = p.kp * error;

        self.integral = (self.integral + p.ki * error * dt_s).clamp(p.output_min, p.output_max);

        let derivative = match self.previous_error {
            Some(prev) if dt_s > 0.0 => p.kd * (error - prev) / dt_s,
            _ => 0.0,
        };

        let output =
            ControlError::check_finite("pid output", proportional + self.integral + derivative)?;
        self.previous_error = Some(error);

        Ok(output.clamp(p.output_min, p.output_max))
    }

    fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = None;
    }

    fn params(&self) -> PidParams {
        self.params.clone()
    }

    fn reconfigure(&mut self, params: PidParams) -> Result<(), ControlError> {
        params.validate()?;
        self.params = params;
        self.reset();
        Ok(())
    }

    fn kind(&self) -> ControllerKind {
        ControllerKind::Pid
    }
}
