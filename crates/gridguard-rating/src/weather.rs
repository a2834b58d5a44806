//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Adapter from provider observations to rating snapshots.
//!
//! Observations arrive from the (external) weather service already converted to
//! feet per second. The site supplies everything the provider does not: latitude,
//! elevation and atmosphere.

use chrono::{Duration, NaiveDateTime, Timelike};
use gridguard_thermal::{params::DEFAULT_WIND_ANGLE_DEG, Atmosphere, WeatherSnapshot};
use serde::{Deserialize, Serialize};

pub const FEET_PER_METER: f64 = 3.28084;
pub const DEFAULT_LATITUDE_DEG: f64 = 21.3099;
pub const DEFAULT_AMBIENT_C: f64 = 25.0;
/// 2 m/s.
pub const DEFAULT_WIND_FTS: f64 = 6.56;
pub const DEFAULT_WIND_DIRECTION_DEG: f64 = 180.0;
pub const FORECAST_STEP_HOURS: u32 = 3;

/// Solar noon on the summer solstice; the worst case for solar gain.
pub const WORST_CASE_SUN_TIME_H: f64 = 12.0;
pub const WORST_CASE_DATE: &str = "21 Jun";

pub fn mps_to_fps(meters_per_second: f64) -> f64 {
    meters_per_second * FEET_PER_METER
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
    pub wind_speed_fts: f64,
    #[serde(default)]
    pub wind_direction_deg: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SiteConditions {
    pub latitude_deg: f64,
    pub elevation_ft: f64,
    pub atmosphere: Atmosphere,
}

impl Default for SiteConditions {
    fn default() -> Self {
        Self {
            latitude_deg: DEFAULT_LATITUDE_DEG,
            elevation_ft: gridguard_thermal::params::DEFAULT_ELEVATION_FT,
            atmosphere: Atmosphere::Clear,
        }
    }
}

impl SiteConditions {
    /// Snapshot at this site; wind is assumed perpendicular to the conductor.
    pub fn snapshot_at(
        &self,
        ambient_c: f64,
        wind_velocity_fts: f64,
        sun_time_h: f64,
        date: &str,
    ) -> gridguard_thermal::Result<WeatherSnapshot> {
        WeatherSnapshot::builder()
            .ambient_c(ambient_c)
            .wind_velocity_fts(wind_velocity_fts)
            .wind_angle_deg(DEFAULT_WIND_ANGLE_DEG)
            .sun_time_h(sun_time_h)
            .date(date)
            .atmosphere(self.atmosphere)
            .elevation_ft(self.elevation_ft)
            .latitude_deg(self.latitude_deg)
            .build()
    }

    /// Worst-case solar conditions (noon, solstice) at the given ambient and wind.
    pub fn worst_case_snapshot(
        &self,
        ambient_c: f64,
        wind_velocity_fts: f64,
    ) -> gridguard_thermal::Result<WeatherSnapshot> {
        self.snapshot_at(
            ambient_c,
            wind_velocity_fts,
            WORST_CASE_SUN_TIME_H,
            WORST_CASE_DATE,
        )
    }

    /// Solar time is the whole hour of the observation; the date renders as `"%d %b"`.
    pub fn snapshot_for(
        &self,
        observation: &WeatherObservation,
    ) -> gridguard_thermal::Result<WeatherSnapshot> {
        let date = observation.timestamp.format("%d %b").to_string();
        self.snapshot_at(
            observation.temperature_c,
            observation.wind_speed_fts,
            f64::from(observation.timestamp.hour()),
            &date,
        )
    }
}

/// Fallback when the weather provider is unavailable.
pub fn default_observation(at: NaiveDateTime) -> WeatherObservation {
    WeatherObservation {
        timestamp: at,
        temperature_c: DEFAULT_AMBIENT_C,
        wind_speed_fts: DEFAULT_WIND_FTS,
        wind_direction_deg: DEFAULT_WIND_DIRECTION_DEG,
        description: Some("default conditions (provider unavailable)".to_owned()),
    }
}

/// Fallback forecast: one point every three hours, warming 0.5 °C per step.
pub fn default_forecast(start: NaiveDateTime, hours: u32) -> Vec<WeatherObservation> {
    (0..hours / FORECAST_STEP_HOURS)
        .map(|step| WeatherObservation {
            timestamp: start + Duration::hours(i64::from(step * FORECAST_STEP_HOURS)),
            temperature_c: DEFAULT_AMBIENT_C + f64::from(step) * 0.5,
            wind_speed_fts: DEFAULT_WIND_FTS,
            wind_direction_deg: DEFAULT_WIND_DIRECTION_DEG,
            description: None,
        })
        .collect()
}
