//! Outdoor weather and occupancy profiles that drive the thermal model.

use rand::{SeedableRng, rngs::StdRng};

use crate::sensors::gaussian_noise;

use super::thermal::Disturbances;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_YEAR: f64 = 365.0;
/// Day of year at which the seasonal sinusoid crosses the annual mean upward.
const SPRING_EQUINOX_DAY: f64 = 80.0;

/// Minimum cloud multiplier (heavy overcast).
const CLOUD_MIN: f64 = 0.2;
/// Maximum cloud multiplier (cloud-edge enhancement).
const CLOUD_MAX: f64 = 1.2;

/// Shape of the synthetic outdoor climate.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherParams {
    /// Annual mean outdoor temperature (°C).
    pub mean_temp_c: f64,
    /// Half the peak-to-trough daily swing (°C).
    pub daily_amplitude_c: f64,
    /// Hour of the daily temperature maximum.
    pub daily_peak_hour: f64,
    /// Half the peak-to-trough seasonal swing (°C).
    pub seasonal_amplitude_c: f64,
    /// Day of year at simulation start (0-based).
    pub start_day_of_year: f64,
    /// Local hour at simulation start.
    pub start_hour: f64,
    /// Clear-sky irradiance at solar noon (W/m²).
    pub peak_solar_w_m2: f64,
    /// Sunrise hour.
    pub sunrise_hour: f64,
    /// Sunset hour.
    pub sunset_hour: f64,
    /// AR(1) persistence of the cloud multiplier, in [0, 1].
    pub cloud_alpha: f64,
    /// Innovation noise of the cloud multiplier; 0 gives clear skies.
    pub cloud_noise_std: f64,
}

impl Default for WeatherParams {
    fn default() -> Self {
        Self {
            mean_temp_c: 15.0,
            daily_amplitude_c: 8.0,
            daily_peak_hour: 15.0,
            seasonal_amplitude_c: 10.0,
            start_day_of_year: 0.0,
            start_hour: 0.0,
            peak_solar_w_m2: 800.0,
            sunrise_hour: 6.0,
            sunset_hour: 18.0,
            cloud_alpha: 0.9,
            cloud_noise_std: 0.0,
        }
    }
}

impl WeatherParams {
    /// Constant outdoor temperature, no sun.
    pub fn constant(temp_c: f64) -> Self {
        Self {
            mean_temp_c: temp_c,
            daily_amplitude_c: 0.0,
            seasonal_amplitude_c: 0.0,
            peak_solar_w_m2: 0.0,
            ..Self::default()
        }
    }
}

/// Outdoor conditions at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    pub temp_c: f64,
    pub rh: f64,
    pub solar_w_m2: f64,
}

/// Outdoor relative humidity as a function of temperature, in [20, 90] %.
pub fn outdoor_rh(temp_c: f64) -> f64 {
    (70.0 - 0.5 * (temp_c - 15.0)).clamp(20.0, 90.0)
}

/// Fraction of clear-sky irradiance at `hour` on a half-sine daylight arc.
pub fn daylight_frac(hour: f64, sunrise: f64, sunset: f64) -> f64 {
    if sunset <= sunrise || hour < sunrise || hour > sunset {
        return 0.0;
    }
    (std::f64::consts::PI * (hour - sunrise) / (sunset - sunrise)).sin().max(0.0)
}

/// When the zone is occupied and by how many people.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySchedule {
    /// Occupants during occupied hours.
    pub occupants: u32,
    /// First occupied hour (inclusive).
    pub start_hour: f64,
    /// Last occupied hour (exclusive).
    pub end_hour: f64,
}

impl Default for OccupancySchedule {
    fn default() -> Self {
        Self {
            occupants: 20,
            start_hour: 8.0,
            end_hour: 18.0,
        }
    }
}

impl OccupancySchedule {
    /// Occupants present at local `hour`. A window with `end < start` wraps midnight.
    pub fn occupants_at(&self, hour: f64) -> u32 {
        let occupied = if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        };
        if occupied { self.occupants } else { 0 }
    }
}

/// Combined weather and occupancy source producing per-tick disturbances.
///
/// Temperature follows a daily sinusoid peaking at `daily_peak_hour` on top of
/// a seasonal sinusoid. Irradiance is a half-sine between sunrise and sunset
/// scaled by an AR(1) cloud multiplier that persists across ticks.
#[derive(Debug, Clone)]
pub struct Environment {
    weather: WeatherParams,
    occupancy: OccupancySchedule,
    cloud: f64,
    rng: StdRng,
}

impl Environment {
    pub fn new(weather: WeatherParams, occupancy: OccupancySchedule, seed: u64) -> Self {
        Self {
            weather,
            occupancy,
            cloud: 1.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn weather(&self) -> &WeatherParams {
        &self.weather
    }

    /// Local (day of year, hour of day) `elapsed_s` seconds after the start.
    pub fn local_time(&self, elapsed_s: f64) -> (f64, f64) {
        let w = &self.weather;
        let absolute = w.start_day_of_year * SECONDS_PER_DAY + w.start_hour * 3600.0 + elapsed_s;
        let day = (absolute / SECONDS_PER_DAY).floor().rem_euclid(DAYS_PER_YEAR);
        let hour = absolute.rem_euclid(SECONDS_PER_DAY) / 3600.0;
        (day, hour)
    }

    /// Clear-sky weather at `elapsed_s`, without advancing the cloud process.
    pub fn clear_sky(&self, elapsed_s: f64) -> WeatherSample {
        let w = &self.weather;
        let (day, hour) = self.local_time(elapsed_s);
        let tau = std::f64::consts::TAU;

        let daily = w.daily_amplitude_c * (tau * (hour - w.daily_peak_hour + 6.0) / 24.0).sin();
        let seasonal = w.seasonal_amplitude_c
            * (tau * (day + hour / 24.0 - SPRING_EQUINOX_DAY) / DAYS_PER_YEAR).sin();
        let temp_c = w.mean_temp_c + daily + seasonal;

        WeatherSample {
            temp_c,
            rh: outdoor_rh(temp_c),
            solar_w_m2: w.peak_solar_w_m2 * daylight_frac(hour, w.sunrise_hour, w.sunset_hour),
        }
    }

    /// Disturbances for the tick starting at `elapsed_s`. Advances the cloud process.
    pub fn disturbances(&mut self, elapsed_s: f64) -> Disturbances {
        let clear = self.clear_sky(elapsed_s);
        let cloud = self.advance_cloud();
        let (_, hour) = self.local_time(elapsed_s);

        Disturbances {
            outdoor_temp_c: clear.temp_c,
            outdoor_rh: clear.rh,
            solar_w_m2: clear.solar_w_m2 * cloud,
            occupants: self.occupancy.occupants_at(hour),
        }
    }

    /// Occupants present at `elapsed_s`.
    pub fn occupants(&self, elapsed_s: f64) -> u32 {
        let (_, hour) = self.local_time(elapsed_s);
        self.occupancy.occupants_at(hour)
    }

    fn advance_cloud(&mut self) -> f64 {
        let w = &self.weather;
        if w.cloud_noise_std <= 0.0 {
            return 1.0;
        }
        let alpha = w.cloud_alpha.clamp(0.0, 1.0);
        let innovation = 1.0 + gaussian_noise(&mut self.rng, w.cloud_noise_std);
        self.cloud = (alpha * self.cloud + (1.0 - alpha) * innovation).clamp(CLOUD_MIN, CLOUD_MAX);
        self.cloud
    }
}
