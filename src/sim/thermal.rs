//! Two-node lumped-capacitance model of a single building zone.
//!
//! The indoor-air node exchanges heat with the wall mass and, through
//! infiltration and glazing, directly with outdoor air. The wall node
//! exchanges heat with indoor air and with outdoor air through the envelope.
//! Humidity is a separate first-order balance driven by air exchange and
//! moisture sources.

use crate::error::ControlError;

use super::types::ActuationCommand;

/// Saturation vapour density of air near room temperature (kg/m³).
const SATURATION_DENSITY_KG_M3: f64 = 0.0194;

/// Thermal and moisture constants of the zone.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingParams {
    /// Heat capacity of the indoor air and furnishings (J/K).
    pub c_indoor_j_k: f64,
    /// Heat capacity of the wall mass (J/K).
    pub c_wall_j_k: f64,
    /// Conductance between indoor air and wall mass (W/K).
    pub ua_indoor_wall_w_k: f64,
    /// Envelope conductance between wall mass and outdoor air (W/K).
    pub ua_wall_outdoor_w_k: f64,
    /// Infiltration conductance between indoor and outdoor air (W/K).
    pub ua_infiltration_w_k: f64,
    /// Glazing conductance between indoor and outdoor air (W/K).
    pub ua_window_w_k: f64,
    /// Effective solar aperture (m²): solar gain = irradiance × aperture.
    pub solar_aperture_m2: f64,
    /// Internal gains independent of occupancy (W).
    pub base_internal_gain_w: f64,
    /// Sensible gain per occupant (W).
    pub gain_per_occupant_w: f64,
    /// Air volume of the zone (m³).
    pub volume_m3: f64,
    /// Air changes per hour driving humidity exchange with outdoors.
    pub air_changes_per_hour: f64,
    /// Moisture released per occupant (kg/h).
    pub moisture_per_occupant_kg_h: f64,
}

impl Default for BuildingParams {
    fn default() -> Self {
        Self {
            c_indoor_j_k: 3.5e6,
            c_wall_j_k: 1.5e6,
            ua_indoor_wall_w_k: 416.7,
            ua_wall_outdoor_w_k: 500.0,
            ua_infiltration_w_k: 200.0,
            ua_window_w_k: 50.0,
            solar_aperture_m2: 1.25,
            base_internal_gain_w: 800.0,
            gain_per_occupant_w: 100.0,
            volume_m3: 3000.0,
            air_changes_per_hour: 0.5,
            moisture_per_occupant_kg_h: 0.07,
        }
    }
}

impl BuildingParams {
    /// Water mass that moves indoor RH by one percentage point (kg).
    pub fn moisture_kg_per_percent(&self) -> f64 {
        self.volume_m3 * SATURATION_DENSITY_KG_M3 / 100.0
    }

    /// Longest explicit Euler step that keeps both node updates monotone (s).
    pub fn stable_step_s(&self) -> f64 {
        let indoor = self.c_indoor_j_k
            / (self.ua_indoor_wall_w_k + self.ua_infiltration_w_k + self.ua_window_w_k);
        let wall = self.c_wall_j_k / (self.ua_indoor_wall_w_k + self.ua_wall_outdoor_w_k);
        indoor.min(wall)
    }

    pub(crate) fn validate(&self) -> Result<(), ControlError> {
        for (name, value) in [
            ("c_indoor_j_k", self.c_indoor_j_k),
            ("c_wall_j_k", self.c_wall_j_k),
            ("volume_m3", self.volume_m3),
        ] {
            positive(name, value)?;
        }
        for (name, value) in [
            ("ua_indoor_wall_w_k", self.ua_indoor_wall_w_k),
            ("ua_wall_outdoor_w_k", self.ua_wall_outdoor_w_k),
            ("ua_infiltration_w_k", self.ua_infiltration_w_k),
            ("ua_window_w_k", self.ua_window_w_k),
            ("solar_aperture_m2", self.solar_aperture_m2),
            ("base_internal_gain_w", self.base_internal_gain_w),
            ("gain_per_occupant_w", self.gain_per_occupant_w),
            ("air_changes_per_hour", self.air_changes_per_hour),
            ("moisture_per_occupant_kg_h", self.moisture_per_occupant_kg_h),
        ] {
            non_negative(name, value)?;
        }
        Ok(())
    }
}

/// Capacities and efficiencies of the HVAC plant.
#[derive(Debug, Clone, PartialEq)]
pub struct HvacParams {
    /// Thermal heating capacity at 100% command (W).
    pub heating_capacity_w: f64,
    /// Thermal cooling capacity at -100% command (W).
    pub cooling_capacity_w: f64,
    /// Fraction of the nominal heat flow that reaches the zone.
    pub efficiency: f64,
    /// Coefficient of performance of the cooling plant.
    pub cooling_cop: f64,
    /// Humidifier output at 100% command (kg/h).
    pub humidifier_kg_h: f64,
    /// Dehumidifier extraction at -100% command (kg/h).
    pub dehumidifier_kg_h: f64,
    /// Moisture condensed on the cooling coil at full cooling (kg/h).
    pub coil_condensation_kg_h: f64,
    /// Electrical draw of the humidity equipment at full command (W).
    pub humidity_treatment_w: f64,
    /// Fan draw while any actuator is active (W).
    pub fan_active_w: f64,
    /// Fan draw while idle (W).
    pub fan_idle_w: f64,
}

impl Default for HvacParams {
    fn default() -> Self {
        Self {
            heating_capacity_w: 20_000.0,
            cooling_capacity_w: 15_000.0,
            efficiency: 0.9,
            cooling_cop: 2.5,
            humidifier_kg_h: 5.0,
            dehumidifier_kg_h: 3.0,
            coil_condensation_kg_h: 1.0,
            humidity_treatment_w: 1_500.0,
            fan_active_w: 500.0,
            fan_idle_w: 100.0,
        }
    }
}

impl HvacParams {
    /// Thermal heating and cooling power for a temperature command (W).
    pub fn thermal_power_w(&self, temperature_command: f64) -> (f64, f64) {
        let u = temperature_command.clamp(-100.0, 100.0);
        let heating = u.max(0.0) / 100.0 * self.heating_capacity_w;
        let cooling = (-u).max(0.0) / 100.0 * self.cooling_capacity_w;
        (heating, cooling)
    }

    pub(crate) fn validate(&self) -> Result<(), ControlError> {
        for (name, value) in [
            ("heating_capacity_w", self.heating_capacity_w),
            ("cooling_capacity_w", self.cooling_capacity_w),
            ("efficiency", self.efficiency),
            ("cooling_cop", self.cooling_cop),
        ] {
            positive(name, value)?;
        }
        if self.efficiency > 1.0 {
            return Err(ControlError::invalid(
                "efficiency",
                format!("must be <= 1, got {}", self.efficiency),
            ));
        }
        for (name, value) in [
            ("humidifier_kg_h", self.humidifier_kg_h),
            ("dehumidifier_kg_h", self.dehumidifier_kg_h),
            ("coil_condensation_kg_h", self.coil_condensation_kg_h),
            ("humidity_treatment_w", self.humidity_treatment_w),
            ("fan_active_w", self.fan_active_w),
            ("fan_idle_w", self.fan_idle_w),
        ] {
            non_negative(name, value)?;
        }
        Ok(())
    }
}

/// Starting conditions of the zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialConditions {
    pub indoor_temp_c: f64,
    pub wall_temp_c: f64,
    pub indoor_rh: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            indoor_temp_c: 22.0,
            wall_temp_c: 20.0,
            indoor_rh: 45.0,
        }
    }
}

/// External inputs acting on the zone during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disturbances {
    /// Outdoor dry-bulb temperature (°C).
    pub outdoor_temp_c: f64,
    /// Outdoor relative humidity (%).
    pub outdoor_rh: f64,
    /// Global horizontal irradiance (W/m²).
    pub solar_w_m2: f64,
    /// People in the zone.
    pub occupants: u32,
}

impl Disturbances {
    /// Constant outdoor conditions with no sun and nobody inside.
    pub fn still(outdoor_temp_c: f64, outdoor_rh: f64) -> Self {
        Self {
            outdoor_temp_c,
            outdoor_rh,
            solar_w_m2: 0.0,
            occupants: 0,
        }
    }

    fn validate(&self) -> Result<(), ControlError> {
        for (name, value) in [
            ("outdoor_temp_c", self.outdoor_temp_c),
            ("outdoor_rh", self.outdoor_rh),
            ("solar_w_m2", self.solar_w_m2),
        ] {
            if !value.is_finite() {
                return Err(ControlError::invalid(name, format!("must be finite, got {value}")));
            }
        }
        Ok(())
    }
}

/// Snapshot of the zone after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalState {
    /// Indoor air temperature (°C).
    pub indoor_temp_c: f64,
    /// Wall mass temperature (°C).
    pub wall_temp_c: f64,
    /// Indoor relative humidity (%), always within [0, 100].
    pub indoor_rh: f64,
    /// Outdoor temperature used for the step (°C).
    pub outdoor_temp_c: f64,
    /// Outdoor relative humidity used for the step (%).
    pub outdoor_rh: f64,
    /// Number of steps taken so far.
    pub tick: usize,
    /// Simulated seconds since the start.
    pub elapsed_s: f64,
}

impl PhysicalState {
    /// Lowest temperature considered physically plausible for the zone (°C).
    pub const MIN_PLAUSIBLE_C: f64 = -40.0;
    /// Highest temperature considered physically plausible for the zone (°C).
    pub const MAX_PLAUSIBLE_C: f64 = 60.0;

    /// Whether both node temperatures fall inside the plausible range.
    pub fn is_plausible(&self) -> bool {
        let range = Self::MIN_PLAUSIBLE_C..=Self::MAX_PLAUSIBLE_C;
        range.contains(&self.indoor_temp_c) && range.contains(&self.wall_temp_c)
    }
}

/// Zone thermal model owning the physical state.
#[derive(Debug, Clone)]
pub struct ThermalModel {
    building: BuildingParams,
    hvac: HvacParams,
    state: PhysicalState,
}

impl ThermalModel {
    /// Creates a model at the given initial conditions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-positive capacitances, capacities
    /// or efficiencies, negative conductances, or initial conditions that are
    /// not finite.
    pub fn new(
        building: BuildingParams,
        hvac: HvacParams,
        initial: InitialConditions,
    ) -> Result<Self, ControlError> {
        building.validate()?;
        hvac.validate()?;
        for (name, value) in [
            ("indoor_temp_c", initial.indoor_temp_c),
            ("wall_temp_c", initial.wall_temp_c),
            ("indoor_rh", initial.indoor_rh),
        ] {
            if !value.is_finite() {
                return Err(ControlError::invalid(name, format!("must be finite, got {value}")));
            }
        }

        Ok(Self {
            building,
            hvac,
            state: PhysicalState {
                indoor_temp_c: initial.indoor_temp_c,
                wall_temp_c: initial.wall_temp_c,
                indoor_rh: initial.indoor_rh.clamp(0.0, 100.0),
                outdoor_temp_c: initial.indoor_temp_c,
                outdoor_rh: initial.indoor_rh.clamp(0.0, 100.0),
                tick: 0,
                elapsed_s: 0.0,
            },
        })
    }

    /// Current state.
    pub fn state(&self) -> PhysicalState {
        self.state
    }

    pub fn building(&self) -> &BuildingParams {
        &self.building
    }

    pub fn hvac(&self) -> &HvacParams {
        &self.hvac
    }

    /// Advances the zone by `dt_s` seconds under the given command and
    /// disturbances, returning the new state.
    ///
    /// Steps longer than [`BuildingParams::stable_step_s`] are split into
    /// equal sub-steps. Commands are clamped to ±100%.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a negative or non-finite `dt_s` or non-finite
    /// disturbances; `NumericAnomaly` if the command or the resulting state is
    /// not finite. The state is left untouched on error.
    pub fn step(
        &mut self,
        actuation: ActuationCommand,
        disturbances: &Disturbances,
        dt_s: f64,
    ) -> Result<PhysicalState, ControlError> {
        if !dt_s.is_finite() || dt_s < 0.0 {
            return Err(ControlError::invalid(
                "dt",
                format!("must be finite and >= 0, got {dt_s}"),
            ));
        }
        disturbances.validate()?;
        let u_temp = ControlError::check_finite("temperature command", actuation.temperature)?
            .clamp(-100.0, 100.0);
        let u_rh =
            ControlError::check_finite("humidity command", actuation.humidity)?.clamp(-100.0, 100.0);

        let (indoor, wall) = self.integrate_heat(u_temp, disturbances, dt_s);
        let rh = self.integrate_moisture(u_temp, u_rh, disturbances, dt_s);

        let next = PhysicalState {
            indoor_temp_c: ControlError::check_finite("indoor temperature", indoor)?,
            wall_temp_c: ControlError::check_finite("wall temperature", wall)?,
            indoor_rh: ControlError::check_finite("indoor humidity", rh)?.clamp(0.0, 100.0),
            outdoor_temp_c: disturbances.outdoor_temp_c,
            outdoor_rh: disturbances.outdoor_rh.clamp(0.0, 100.0),
            tick: self.state.tick + 1,
            elapsed_s: self.state.elapsed_s + dt_s,
        };
        self.state = next;
        Ok(next)
    }

    fn integrate_heat(&self, u_temp: f64, d: &Disturbances, dt_s: f64) -> (f64, f64) {
        let b = &self.building;
        let (heating, cooling) = self.hvac.thermal_power_w(u_temp);
        let q_fixed = (heating - cooling) * self.hvac.efficiency
            + d.solar_w_m2.max(0.0) * b.solar_aperture_m2
            + b.base_internal_gain_w
            + f64::from(d.occupants) * b.gain_per_occupant_w;
        let ua_direct = b.ua_infiltration_w_k + b.ua_window_w_k;

        let substeps = (dt_s / b.stable_step_s()).ceil().max(1.0);
        let h = dt_s / substeps;

        let mut indoor = self.state.indoor_temp_c;
        let mut wall = self.state.wall_temp_c;
        for _ in 0..substeps as usize {
            let q_wall = b.ua_indoor_wall_w_k * (wall - indoor);
            let q_direct = ua_direct * (d.outdoor_temp_c - indoor);
            let q_envelope = b.ua_wall_outdoor_w_k * (d.outdoor_temp_c - wall);

            let d_indoor = (q_fixed + q_wall + q_direct) / b.c_indoor_j_k;
            let d_wall = (-q_wall + q_envelope) / b.c_wall_j_k;
            indoor += h * d_indoor;
            wall += h * d_wall;
        }
        (indoor, wall)
    }

    /// Exact solution of `dRH/dt = -k (RH - RH_out) + s` over the step.
    fn integrate_moisture(&self, u_temp: f64, u_rh: f64, d: &Disturbances, dt_s: f64) -> f64 {
        let b = &self.building;
        let hvac = &self.hvac;

        let equipment_kg_h = if u_rh >= 0.0 {
            u_rh / 100.0 * hvac.humidifier_kg_h
        } else {
            u_rh / 100.0 * hvac.dehumidifier_kg_h
        };
        let coil_kg_h = (-u_temp).max(0.0) / 100.0 * hvac.coil_condensation_kg_h;
        let occupant_kg_h = f64::from(d.occupants) * b.moisture_per_occupant_kg_h;

        let source = (occupant_kg_h + equipment_kg_h - coil_kg_h)
            / 3600.0
            / b.moisture_kg_per_percent();
        let k = b.air_changes_per_hour / 3600.0;
        let rh = self.state.indoor_rh;

        if k > 0.0 {
            let equilibrium = d.outdoor_rh + source / k;
            equilibrium + (rh - equilibrium) * (-k * dt_s).exp()
        } else {
            rh + source * dt_s
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ControlError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ControlError::invalid(name, format!("must be finite and > 0, got {value}")))
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ControlError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ControlError::invalid(name, format!("must be finite and >= 0, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passive_building() -> BuildingParams {
        BuildingParams {
            base_internal_gain_w: 0.0,
            ..BuildingParams::default()
        }
    }

    fn model(building: BuildingParams) -> ThermalModel {
        ThermalModel::new(building, HvacParams::default(), InitialConditions::default())
            .unwrap_or_else(|e| panic!("{e}"))
    }

    fn free_float_decay(dt_s: f64, ticks: usize) {
        let mut m = model(passive_building());
        let outdoor = Disturbances::still(10.0, 60.0);
        let mut last = m.state().indoor_temp_c;

        for _ in 0..ticks {
            let s = m
                .step(ActuationCommand::IDLE, &outdoor, dt_s)
                .unwrap_or_else(|e| panic!("{e}"));
            assert!(s.indoor_temp_c <= last, "indoor rose at tick {}", s.tick);
            assert!(s.indoor_temp_c >= 10.0, "indoor overshot outdoor at tick {}", s.tick);
            assert!(s.wall_temp_c >= 10.0, "wall overshot outdoor at tick {}", s.tick);
            last = s.indoor_temp_c;
        }
        assert!(last < 22.0);
    }

    #[test]
    fn free_floating_zone_decays_monotonically_without_overshoot() {
        free_float_decay(60.0, 2_000);
    }

    #[test]
    fn long_steps_are_substepped_and_stay_monotone() {
        free_float_decay(3_600.0, 48);
        free_float_decay(86_400.0, 2);
    }

    #[test]
    fn full_heating_warms_the_zone() {
        let mut m = model(BuildingParams::default());
        let cold = Disturbances::still(0.0, 50.0);
        let s = m
            .step(ActuationCommand::new(100.0, 0.0), &cold, 600.0)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(s.indoor_temp_c > 22.0);
    }

    #[test]
    fn full_cooling_cools_and_dries_the_zone() {
        let mut m = model(BuildingParams::default());
        let hot = Disturbances::still(35.0, 45.0);
        let s = m
            .step(ActuationCommand::new(-100.0, 0.0), &hot, 600.0)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(s.indoor_temp_c < 22.0);
        assert!(s.indoor_rh < 45.0);
    }

    #[test]
    fn humidity_relaxes_toward_outdoor_and_stays_bounded() {
        let mut m = model(passive_building());
        let humid = Disturbances::still(22.0, 80.0);
        let mut last = m.state().indoor_rh;
        for _ in 0..200 {
            let s = m
                .step(ActuationCommand::IDLE, &humid, 300.0)
                .unwrap_or_else(|e| panic!("{e}"));
            assert!(s.indoor_rh >= last);
            assert!(s.indoor_rh <= 80.0 + 1e-9);
            last = s.indoor_rh;
        }
        assert!((last - 80.0).abs() < 0.5);

        let mut m = model(passive_building());
        let s = m
            .step(ActuationCommand::new(0.0, 100.0), &Disturbances::still(22.0, 99.0), 1e7)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!((0.0..=100.0).contains(&s.indoor_rh));
    }

    #[test]
    fn zero_dt_changes_nothing_but_the_tick() {
        let mut m = model(BuildingParams::default());
        let before = m.state();
        let s = m
            .step(ActuationCommand::new(100.0, 100.0), &Disturbances::still(0.0, 10.0), 0.0)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(s.indoor_temp_c, before.indoor_temp_c);
        assert_eq!(s.wall_temp_c, before.wall_temp_c);
        assert_eq!(s.indoor_rh, before.indoor_rh);
        assert_eq!(s.tick, 1);
    }

    #[test]
    fn negative_dt_is_rejected_and_state_kept() {
        let mut m = model(BuildingParams::default());
        let before = m.state();
        let err = m.step(ActuationCommand::IDLE, &Disturbances::still(10.0, 50.0), -1.0);
        assert!(matches!(
            err,
            Err(ControlError::InvalidParameter { name: "dt", .. })
        ));
        assert_eq!(m.state(), before);
    }

    #[test]
    fn nan_command_is_a_numeric_anomaly() {
        let mut m = model(BuildingParams::default());
        let err = m.step(
            ActuationCommand::new(f64::NAN, 0.0),
            &Disturbances::still(10.0, 50.0),
            60.0,
        );
        assert!(matches!(err, Err(ControlError::NumericAnomaly { .. })));
    }

    #[test]
    fn invalid_constants_fail_construction() {
        let building = BuildingParams {
            c_indoor_j_k: 0.0,
            ..BuildingParams::default()
        };
        assert!(
            ThermalModel::new(building, HvacParams::default(), InitialConditions::default())
                .is_err()
        );

        let building = BuildingParams {
            ua_window_w_k: -1.0,
            ..BuildingParams::default()
        };
        assert!(
            ThermalModel::new(building, HvacParams::default(), InitialConditions::default())
                .is_err()
        );

        let hvac = HvacParams {
            cooling_cop: 0.0,
            ..HvacParams::default()
        };
        assert!(
            ThermalModel::new(BuildingParams::default(), hvac, InitialConditions::default())
                .is_err()
        );
    }

    #[test]
    fn identical_inputs_give_identical_states() {
        let mut a = model(BuildingParams::default());
        let mut b = model(BuildingParams::default());
        let d = Disturbances {
            outdoor_temp_c: 3.0,
            outdoor_rh: 70.0,
            solar_w_m2: 400.0,
            occupants: 12,
        };
        for i in 0..100 {
            let cmd = ActuationCommand::new(f64::from(i % 7) * 10.0, -5.0);
            let sa = a.step(cmd, &d, 60.0);
            let sb = b.step(cmd, &d, 60.0);
            assert_eq!(sa, sb);
        }
    }

    #[test]
    fn plausibility_bounds() {
        let mut s = model(BuildingParams::default()).state();
        assert!(s.is_plausible());
        s.indoor_temp_c = 75.0;
        assert!(!s.is_plausible());
    }
}
