use super::{Controller, ControllerKind, check_dt};
use crate::error::ControlError;

/// Membership function of a linguistic term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Membership {
    /// Triangle with feet `a`, `c` and peak `b`. `a == b` or `b == c` gives a shoulder.
    Triangle(f64, f64, f64),
    /// Trapezoid with feet `a`, `d` and plateau `[b, c]`.
    Trapezoid(f64, f64, f64, f64),
}

impl Membership {
    /// Degree of membership of `x`, in `[0, 1]`.
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            Self::Triangle(a, b, c) => {
                if x < a || x > c {
                    0.0
                } else if x == b {
                    1.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            }
            Self::Trapezoid(a, b, c, d) => {
                if x < a || x > d {
                    0.0
                } else if x >= b && x <= c {
                    1.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (d - x) / (d - c)
                }
            }
        }
    }

    /// Distance from `x` to the region where membership is 1.
    fn core_distance(&self, x: f64) -> f64 {
        let (lo, hi) = match *self {
            Self::Triangle(_, b, _) => (b, b),
            Self::Trapezoid(_, b, c, _) => (b, c),
        };
        if x < lo {
            lo - x
        } else if x > hi {
            x - hi
        } else {
            0.0
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ControlError> {
        let points: &[f64] = match self {
            Self::Triangle(a, b, c) => &[*a, *b, *c],
            Self::Trapezoid(a, b, c, d) => &[*a, *b, *c, *d],
        };
        let ordered = points.windows(2).all(|w| w[0] <= w[1]);
        let finite = points.iter().all(|p| p.is_finite());
        let width = points[points.len() - 1] - points[0];
        if !finite || !ordered || width <= 0.0 {
            return Err(ControlError::invalid(
                name,
                format!("breakpoints must be finite, ascending and span a width > 0: {self:?}"),
            ));
        }
        Ok(())
    }
}

/// Linguistic terms of the error input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTerm {
    NegativeLarge,
    NegativeSmall,
    Zero,
    PositiveSmall,
    PositiveLarge,
}

impl ErrorTerm {
    pub const ALL: [Self; 5] = [
        Self::NegativeLarge,
        Self::NegativeSmall,
        Self::Zero,
        Self::PositiveSmall,
        Self::PositiveLarge,
    ];
}

/// Linguistic terms of the error-rate input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTerm {
    Negative,
    Zero,
    Positive,
}

impl RateTerm {
    pub const ALL: [Self; 3] = [Self::Negative, Self::Zero, Self::Positive];
}

/// Output action categories, from strongest lowering to strongest raising.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FullLower,
    MildLower,
    Hold,
    MildRaise,
    FullRaise,
}

/// One entry of the rule base: `IF error IS e AND rate IS r THEN action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyRule {
    pub error: ErrorTerm,
    pub rate: RateTerm,
    pub action: Action,
}

impl FuzzyRule {
    pub const fn new(error: ErrorTerm, rate: RateTerm, action: Action) -> Self {
        Self {
            error,
            rate,
            action,
        }
    }
}

/// Fuzzy controller configuration.
///
/// Membership functions are indexed in the order of [`ErrorTerm::ALL`] and
/// [`RateTerm::ALL`]; action values in the order of the [`Action`] variants.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyParams {
    /// Membership functions of the error input.
    pub error_sets: [Membership; 5],
    /// Membership functions of the error-rate input (units per second).
    pub rate_sets: [Membership; 3],
    /// Representative crisp value of each action (%).
    pub action_values: [f64; 5],
    /// Rule base; must cover every (error, rate) pair exactly once.
    pub rules: Vec<FuzzyRule>,
    /// Lower output bound (%).
    pub output_min: f64,
    /// Upper output bound (%).
    pub output_max: f64,
}

impl FuzzyParams {
    /// Tuning whose outer error terms saturate at `±error_span` and whose
    /// outer rate terms saturate at `±rate_span` (units per second).
    pub fn scaled(error_span: f64, rate_span: f64) -> Self {
        let e = error_span;
        let r = rate_span;
        Self {
            error_sets: [
                Membership::Triangle(-e, -e, -0.5 * e),
                Membership::Triangle(-0.7 * e, -0.3 * e, 0.0),
                Membership::Triangle(-0.2 * e, 0.0, 0.2 * e),
                Membership::Triangle(0.0, 0.3 * e, 0.7 * e),
                Membership::Triangle(0.5 * e, e, e),
            ],
            rate_sets: [
                Membership::Trapezoid(-50.0 * r, -50.0 * r, -r, 0.0),
                Membership::Triangle(-0.5 * r, 0.0, 0.5 * r),
                Membership::Trapezoid(0.0, r, 50.0 * r, 50.0 * r),
            ],
            action_values: [-100.0, -40.0, 0.0, 40.0, 100.0],
            rules: Self::default_rules(),
            output_min: -100.0,
            output_max: 100.0,
        }
    }

    /// Temperature tuning: error in °C, rate in °C/s.
    pub fn temperature() -> Self {
        Self::scaled(10.0, 0.02)
    }

    /// Humidity tuning: error in %RH, rate in %RH/s.
    pub fn humidity() -> Self {
        Self::scaled(20.0, 0.05)
    }

    /// Rule base shared by both tunings.
    ///
    /// A positive error asks for raising; a positive rate means the error is
    /// growing, so the action is strengthened, and a negative rate means the
    /// error is already shrinking, so it is eased off.
    pub fn default_rules() -> Vec<FuzzyRule> {
        use Action::*;
        use ErrorTerm::*;
        use RateTerm::{Negative, Positive};

        vec![
            FuzzyRule::new(NegativeLarge, Negative, FullLower),
            FuzzyRule::new(NegativeLarge, RateTerm::Zero, FullLower),
            FuzzyRule::new(NegativeLarge, Positive, MildLower),
            FuzzyRule::new(NegativeSmall, Negative, MildLower),
            FuzzyRule::new(NegativeSmall, RateTerm::Zero, MildLower),
            FuzzyRule::new(NegativeSmall, Positive, Hold),
            FuzzyRule::new(ErrorTerm::Zero, Negative, MildLower),
            FuzzyRule::new(ErrorTerm::Zero, RateTerm::Zero, Hold),
            FuzzyRule::new(ErrorTerm::Zero, Positive, MildRaise),
            FuzzyRule::new(PositiveSmall, Negative, Hold),
            FuzzyRule::new(PositiveSmall, RateTerm::Zero, MildRaise),
            FuzzyRule::new(PositiveSmall, Positive, MildRaise),
            FuzzyRule::new(PositiveLarge, Negative, MildRaise),
            FuzzyRule::new(PositiveLarge, RateTerm::Zero, FullRaise),
            FuzzyRule::new(PositiveLarge, Positive, FullRaise),
        ]
    }

    fn validate(&self) -> Result<(), ControlError> {
        for set in &self.error_sets {
            set.validate("error_sets")?;
        }
        for set in &self.rate_sets {
            set.validate("rate_sets")?;
        }
        if self.action_values.iter().any(|v| !v.is_finite()) {
            return Err(ControlError::invalid("action_values", "must be finite"));
        }
        if !(self.output_min.is_finite() && self.output_max.is_finite())
            || self.output_min >= self.output_max
        {
            return Err(ControlError::invalid(
                "output_limits",
                format!(
                    "must be finite with min < max, got [{}, {}]",
                    self.output_min, self.output_max
                ),
            ));
        }
        Ok(())
    }
}

/// Dense rule table indexed by `[error term][rate term]`.
#[derive(Debug, Clone)]
struct RuleTable([[Action; 3]; 5]);

impl RuleTable {
    fn build(rules: &[FuzzyRule]) -> Result<Self, ControlError> {
        let mut cells: [[Option<Action>; 3]; 5] = [[None; 3]; 5];
        for rule in rules {
            let cell = &mut cells[rule.error as usize][rule.rate as usize];
            if let Some(existing) = cell {
                return Err(ControlError::invalid(
                    "rules",
                    format!(
                        "({:?}, {:?}) mapped twice: {existing:?} and {:?}",
                        rule.error, rule.rate, rule.action
                    ),
                ));
            }
            *cell = Some(rule.action);
        }

        let mut table = [[Action::Hold; 3]; 5];
        for (e, error) in ErrorTerm::ALL.iter().enumerate() {
            for (r, rate) in RateTerm::ALL.iter().enumerate() {
                table[e][r] = cells[e][r].ok_or_else(|| {
                    ControlError::invalid("rules", format!("no rule for ({error:?}, {rate:?})"))
                })?;
            }
        }
        Ok(Self(table))
    }

    fn action(&self, error: usize, rate: usize) -> Action {
        self.0[error][rate]
    }
}

/// Mamdani-style fuzzy controller over error and error rate.
///
/// Rule strength is the minimum of the two input memberships and the crisp
/// output is the strength-weighted mean of the action values. When no rule
/// fires at all, each input falls back to the term whose core is nearest, so
/// an error beyond the outermost term still drives the outermost action.
#[derive(Debug, Clone)]
pub struct FuzzyController {
    params: FuzzyParams,
    table: RuleTable,
    previous_error: Option<f64>,
}

impl FuzzyController {
    /// Builds the rule table and validates every membership function.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for malformed breakpoints, non-finite
    /// values, or a rule base that leaves a pair unmapped or maps it twice.
    pub fn new(params: FuzzyParams) -> Result<Self, ControlError> {
        params.validate()?;
        let table = RuleTable::build(&params.rules)?;
        Ok(Self {
            params,
            table,
            previous_error: None,
        })
    }

    /// Crisp output for the given error and error rate, before clamping.
    pub fn infer(&self, error: f64, rate: f64) -> f64 {
        let p = &self.params;
        let mut weighted = 0.0;
        let mut total = 0.0;

        for (e, error_set) in p.error_sets.iter().enumerate() {
            let mu_error = error_set.degree(error);
            if mu_error <= 0.0 {
                continue;
            }
            for (r, rate_set) in p.rate_sets.iter().enumerate() {
                let strength = mu_error.min(rate_set.degree(rate));
                if strength > 0.0 {
                    weighted += strength * self.action_value(e, r);
                    total += strength;
                }
            }
        }

        if total > 0.0 {
            weighted / total
        } else {
            let e = nearest(&p.error_sets, error);
            let r = nearest(&p.rate_sets, rate);
            self.action_value(e, r)
        }
    }

    fn action_value(&self, error: usize, rate: usize) -> f64 {
        self.params.action_values[self.table.action(error, rate) as usize]
    }
}

fn nearest(sets: &[Membership], x: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, set) in sets.iter().enumerate() {
        let d = set.core_distance(x);
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}

impl Controller for FuzzyController {
    type Params = FuzzyParams;

    fn compute(&mut self, setpoint: f64, measured: f64, dt_s: f64) -> Result<f64, ControlError> {
        check_dt(dt_s)?;
        let error = ControlError::check_finite("fuzzy error", setpoint - measured)?;
        let rate = match self.previous_error {
            Some(prev) if dt_s > 0.0 => (error - prev) / dt_s,
            _ => 0.0,
        };
        self.previous_error = Some(error);

        let output = ControlError::check_finite("fuzzy output", self.infer(error, rate))?;
        Ok(output.clamp(self.params.output_min, self.params.output_max))
    }

    fn reset(&mut self) {
        self.previous_error = None;
    }

    fn params(&self) -> FuzzyParams {
        self.params.clone()
    }

    fn reconfigure(&mut self, params: FuzzyParams) -> Result<(), ControlError> {
        params.validate()?;
        let table = RuleTable::build(&params.rules)?;
        self.params = params;
        self.table = table;
        self.reset();
        Ok(())
    }

    fn kind(&self) -> ControllerKind {
        ControllerKind::Fuzzy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> FuzzyController {
        FuzzyController::new(FuzzyParams::temperature()).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn triangle_and_trapezoid_degrees() {
        let t = Membership::Triangle(0.0, 3.0, 7.0);
        assert_eq!(t.degree(-1.0), 0.0);
        assert_eq!(t.degree(3.0), 1.0);
        assert!((t.degree(1.5) - 0.5).abs() < 1e-12);
        assert!((t.degree(5.0) - 0.5).abs() < 1e-12);

        let shoulder = Membership::Triangle(-10.0, -10.0, -5.0);
        assert_eq!(shoulder.degree(-10.0), 1.0);
        assert_eq!(shoulder.degree(-11.0), 0.0);

        let z = Membership::Trapezoid(0.0, 1.0, 2.0, 4.0);
        assert_eq!(z.degree(1.5), 1.0);
        assert_eq!(z.degree(3.0), 0.5);
    }

    #[test]
    fn zero_error_and_rate_gives_hold_value_exactly() {
        let c = controller();
        assert_eq!(c.infer(0.0, 0.0), 0.0);

        let mut params = FuzzyParams::temperature();
        params.action_values[Action::Hold as usize] = 7.25;
        let c = FuzzyController::new(params).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(c.infer(0.0, 0.0), 7.25);
    }

    #[test]
    fn first_compute_at_setpoint_is_hold() {
        let mut c = controller();
        assert_eq!(c.compute(22.0, 22.0, 60.0), Ok(0.0));
    }

    #[test]
    fn cold_room_heats_and_warm_room_cools() {
        let mut c = controller();
        assert!(c.compute(22.0, 18.0, 60.0).unwrap_or(0.0) > 0.0);
        c.reset();
        assert!(c.compute(22.0, 26.0, 60.0).unwrap_or(0.0) < 0.0);
    }

    #[test]
    fn output_is_monotone_in_error_at_zero_rate() {
        let c = controller();
        let mut last = f64::NEG_INFINITY;
        for i in -40..=40 {
            let u = c.infer(f64::from(i) * 0.25, 0.0);
            assert!(u >= last - 1e-9, "output dropped at error {}", f64::from(i) * 0.25);
            last = u;
        }
    }

    #[test]
    fn error_outside_every_term_uses_nearest_boundary_action() {
        let c = controller();
        // beyond the positive-large foot: no membership anywhere
        assert_eq!(c.infer(15.0, 0.0), 100.0);
        assert_eq!(c.infer(-15.0, 0.0), -100.0);
        // rate beyond every rate term picks the outer rate column
        assert_eq!(c.infer(15.0, -3.0), 40.0);
    }

    #[test]
    fn falling_error_eases_off_heating() {
        let c = controller();
        let steady = c.infer(3.0, 0.0);
        let recovering = c.infer(3.0, -0.02);
        assert!(recovering < steady);
    }

    #[test]
    fn missing_rule_is_rejected() {
        let mut params = FuzzyParams::temperature();
        params.rules.pop();
        let err = FuzzyController::new(params).err();
        assert!(matches!(
            err,
            Some(ControlError::InvalidParameter { name: "rules", .. })
        ));
    }

    #[test]
    fn duplicate_rule_is_rejected() {
        let mut params = FuzzyParams::temperature();
        params.rules.push(FuzzyRule::new(
            ErrorTerm::Zero,
            RateTerm::Zero,
            Action::FullRaise,
        ));
        assert!(FuzzyController::new(params).is_err());
    }

    #[test]
    fn malformed_membership_is_rejected() {
        let mut params = FuzzyParams::temperature();
        params.error_sets[2] = Membership::Triangle(2.0, 0.0, -2.0);
        assert!(FuzzyController::new(params).is_err());
    }

    #[test]
    fn humidity_tuning_is_valid() {
        let mut c = FuzzyController::new(FuzzyParams::humidity()).unwrap_or_else(|e| panic!("{e}"));
        assert!(c.compute(45.0, 35.0, 60.0).unwrap_or(0.0) > 0.0);
    }
}
