//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Conductor thermal model and ampacity solver."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Validated input value types for the heat balance.
//!
//! Both [`WeatherSnapshot`] and [`ConductorSpec`] are built through builders that
//! check every field once; after construction the values are read-only.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::errors::{Result, ThermalError};

pub const DEFAULT_WIND_ANGLE_DEG: f64 = 90.0;
pub const DEFAULT_ELEVATION_FT: f64 = 1000.0;
pub const DEFAULT_EMISSIVITY: f64 = 0.8;
pub const DEFAULT_ABSORPTIVITY: f64 = 0.8;

const ABSOLUTE_ZERO_C: f64 = -273.15;
const MONTHS: [(&str, u32); 12] = [
    ("jan", 31),
    ("feb", 29),
    ("mar", 31),
    ("apr", 30),
    ("may", 31),
    ("jun", 30),
    ("jul", 31),
    ("aug", 31),
    ("sep", 30),
    ("oct", 31),
    ("nov", 30),
    ("dec", 31),
];

/// Atmospheric clarity used to pick the base solar irradiance.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Atmosphere {
    #[default]
    Clear,
    Industrial,
}

/// Line orientation. Carried for completeness; the simplified solar model ignores it.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Direction {
    #[default]
    EastWest,
    NorthSouth,
}

/// Ambient conditions for a single rating calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    ambient_c: f64,
    wind_velocity_fts: f64,
    wind_angle_deg: f64,
    sun_time_h: f64,
    date: String,
    atmosphere: Atmosphere,
    elevation_ft: f64,
    latitude_deg: f64,
}

impl WeatherSnapshot {
    pub fn builder() -> WeatherSnapshotBuilder {
        WeatherSnapshotBuilder::default()
    }

    /// Start a builder pre-populated with this snapshot, for deriving variants.
    pub fn to_builder(&self) -> WeatherSnapshotBuilder {
        WeatherSnapshotBuilder {
            ambient_c: Some(self.ambient_c),
            wind_velocity_fts: Some(self.wind_velocity_fts),
            wind_angle_deg: self.wind_angle_deg,
            sun_time_h: Some(self.sun_time_h),
            date: Some(self.date.clone()),
            atmosphere: self.atmosphere,
            elevation_ft: self.elevation_ft,
            latitude_deg: Some(self.latitude_deg),
        }
    }

    pub fn ambient_c(&self) -> f64 {
        self.ambient_c
    }

    pub fn wind_velocity_fts(&self) -> f64 {
        self.wind_velocity_fts
    }

    pub fn wind_angle_deg(&self) -> f64 {
        self.wind_angle_deg
    }

    pub fn sun_time_h(&self) -> f64 {
        self.sun_time_h
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn atmosphere(&self) -> Atmosphere {
        self.atmosphere
    }

    pub fn elevation_ft(&self) -> f64 {
        self.elevation_ft
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }
}

#[derive(Debug, Clone)]
pub struct WeatherSnapshotBuilder {
    ambient_c: Option<f64>,
    wind_velocity_fts: Option<f64>,
    wind_angle_deg: f64,
    sun_time_h: Option<f64>,
    date: Option<String>,
    atmosphere: Atmosphere,
    elevation_ft: f64,
    latitude_deg: Option<f64>,
}

impl Default for WeatherSnapshotBuilder {
    fn default() -> Self {
        Self {
            ambient_c: None,
            wind_velocity_fts: None,
            wind_angle_deg: DEFAULT_WIND_ANGLE_DEG,
            sun_time_h: None,
            date: None,
            atmosphere: Atmosphere::default(),
            elevation_ft: DEFAULT_ELEVATION_FT,
            latitude_deg: None,
        }
    }
}

impl WeatherSnapshotBuilder {
    pub fn ambient_c(mut self, value: f64) -> Self {
        self.ambient_c = Some(value);
        self
    }

    pub fn wind_velocity_fts(mut self, value: f64) -> Self {
        self.wind_velocity_fts = Some(value);
        self
    }

    pub fn wind_angle_deg(mut self, value: f64) -> Self {
        self.wind_angle_deg = value;
        self
    }

    pub fn sun_time_h(mut self, value: f64) -> Self {
        self.sun_time_h = Some(value);
        self
    }

    pub fn date(mut self, value: impl Into<String>) -> Self {
        self.date = Some(value.into());
        self
    }

    pub fn atmosphere(mut self, value: Atmosphere) -> Self {
        self.atmosphere = value;
        self
    }

    pub fn elevation_ft(mut self, value: f64) -> Self {
        self.elevation_ft = value;
        self
    }

    pub fn latitude_deg(mut self, value: f64) -> Self {
        self.latitude_deg = Some(value);
        self
    }

    pub fn build(self) -> Result<WeatherSnapshot> {
        let ambient_c = self
            .ambient_c
            .ok_or(ThermalError::MissingParameter("ambient_c"))?;
        let wind_velocity_fts = self
            .wind_velocity_fts
            .ok_or(ThermalError::MissingParameter("wind_velocity_fts"))?;
        let sun_time_h = self
            .sun_time_h
            .ok_or(ThermalError::MissingParameter("sun_time_h"))?;
        let date = self.date.ok_or(ThermalError::MissingParameter("date"))?;
        let latitude_deg = self
            .latitude_deg
            .ok_or(ThermalError::MissingParameter("latitude_deg"))?;

        if !ambient_c.is_finite() || ambient_c <= ABSOLUTE_ZERO_C {
            return Err(ThermalError::invalid(
                "ambient_c",
                format!("{ambient_c} is not a physical temperature"),
            ));
        }
        if !wind_velocity_fts.is_finite() || wind_velocity_fts < 0.0 {
            return Err(ThermalError::invalid(
                "wind_velocity_fts",
                format!("{wind_velocity_fts} must be finite and non-negative"),
            ));
        }
        if !(0.0..=360.0).contains(&self.wind_angle_deg) {
            return Err(ThermalError::invalid(
                "wind_angle_deg",
                format!("{} outside [0, 360]", self.wind_angle_deg),
            ));
        }
        if !(0.0..24.0).contains(&sun_time_h) {
            return Err(ThermalError::invalid(
                "sun_time_h",
                format!("{sun_time_h} outside [0, 24)"),
            ));
        }
        if !self.elevation_ft.is_finite() {
            return Err(ThermalError::invalid("elevation_ft", "must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(ThermalError::invalid(
                "latitude_deg",
                format!("{latitude_deg} outside [-90, 90]"),
            ));
        }
        validate_date(&date)?;

        Ok(WeatherSnapshot {
            ambient_c,
            wind_velocity_fts,
            wind_angle_deg: self.wind_angle_deg,
            sun_time_h,
            date,
            atmosphere: self.atmosphere,
            elevation_ft: self.elevation_ft,
            latitude_deg,
        })
    }
}

/// Accepts `"<day> <Mon>"`, e.g. `"21 Jun"`, with the month matched case-insensitively.
fn validate_date(date: &str) -> Result<()> {
    let mut parts = date.split_whitespace();
    let (Some(day), Some(month), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ThermalError::invalid(
            "date",
            format!("'{date}' is not of the form '<day> <Mon>'"),
        ));
    };
    let day: u32 = day
        .parse()
        .map_err(|_| ThermalError::invalid("date", format!("'{day}' is not a day of month")))?;
    let month = month.to_ascii_lowercase();
    let max_day = MONTHS
        .iter()
        .find(|(name, _)| *name == month)
        .map(|(_, days)| *days)
        .ok_or_else(|| ThermalError::invalid("date", format!("unknown month '{month}'")))?;
    if day == 0 || day > max_day {
        return Err(ThermalError::invalid(
            "date",
            format!("day {day} out of range for '{month}'"),
        ));
    }
    Ok(())
}

/// Physical and electrical description of a conductor at its thermal limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConductorSpec {
    diameter_in: f64,
    emissivity: f64,
    absorptivity: f64,
    t_lo_c: f64,
    t_hi_c: f64,
    r_lo_ohm_per_ft: f64,
    r_hi_ohm_per_ft: f64,
    max_temp_c: f64,
    direction: Direction,
}

impl ConductorSpec {
    pub fn builder() -> ConductorSpecBuilder {
        ConductorSpecBuilder::default()
    }

    pub fn diameter_in(&self) -> f64 {
        self.diameter_in
    }

    pub fn emissivity(&self) -> f64 {
        self.emissivity
    }

    pub fn absorptivity(&self) -> f64 {
        self.absorptivity
    }

    pub fn t_lo_c(&self) -> f64 {
        self.t_lo_c
    }

    pub fn t_hi_c(&self) -> f64 {
        self.t_hi_c
    }

    pub fn r_lo_ohm_per_ft(&self) -> f64 {
        self.r_lo_ohm_per_ft
    }

    pub fn r_hi_ohm_per_ft(&self) -> f64 {
        self.r_hi_ohm_per_ft
    }

    pub fn max_temp_c(&self) -> f64 {
        self.max_temp_c
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

#[derive(Debug, Clone)]
pub struct ConductorSpecBuilder {
    diameter_in: Option<f64>,
    emissivity: f64,
    absorptivity: f64,
    reference_low: Option<(f64, f64)>,
    reference_high: Option<(f64, f64)>,
    max_temp_c: Option<f64>,
    direction: Direction,
}

impl Default for ConductorSpecBuilder {
    fn default() -> Self {
        Self {
            diameter_in: None,
            emissivity: DEFAULT_EMISSIVITY,
            absorptivity: DEFAULT_ABSORPTIVITY,
            reference_low: None,
            reference_high: None,
            max_temp_c: None,
            direction: Direction::default(),
        }
    }
}

impl ConductorSpecBuilder {
    pub fn diameter_in(mut self, value: f64) -> Self {
        self.diameter_in = Some(value);
        self
    }

    pub fn emissivity(mut self, value: f64) -> Self {
        self.emissivity = value;
        self
    }

    pub fn absorptivity(mut self, value: f64) -> Self {
        self.absorptivity = value;
        self
    }

    /// Resistance (ohm/ft) at the low reference temperature (°C).
    pub fn low_reference(mut self, temp_c: f64, resistance_ohm_per_ft: f64) -> Self {
        self.reference_low = Some((temp_c, resistance_ohm_per_ft));
        self
    }

    /// Resistance (ohm/ft) at the high reference temperature (°C).
    pub fn high_reference(mut self, temp_c: f64, resistance_ohm_per_ft: f64) -> Self {
        self.reference_high = Some((temp_c, resistance_ohm_per_ft));
        self
    }

    pub fn max_temp_c(mut self, value: f64) -> Self {
        self.max_temp_c = Some(value);
        self
    }

    pub fn direction(mut self, value: Direction) -> Self {
        self.direction = value;
        self
    }

    pub fn build(self) -> Result<ConductorSpec> {
        let diameter_in = self
            .diameter_in
            .ok_or(ThermalError::MissingParameter("diameter_in"))?;
        let (t_lo_c, r_lo_ohm_per_ft) = self
            .reference_low
            .ok_or(ThermalError::MissingParameter("low_reference"))?;
        let (t_hi_c, r_hi_ohm_per_ft) = self
            .reference_high
            .ok_or(ThermalError::MissingParameter("high_reference"))?;
        let max_temp_c = self
            .max_temp_c
            .ok_or(ThermalError::MissingParameter("max_temp_c"))?;

        if !diameter_in.is_finite() || diameter_in <= 0.0 {
            return Err(ThermalError::invalid(
                "diameter_in",
                format!("{diameter_in} must be positive"),
            ));
        }
        ensure_unit_interval("emissivity", self.emissivity)?;
        ensure_unit_interval("absorptivity", self.absorptivity)?;
        for (field, value) in [
            ("t_lo_c", t_lo_c),
            ("t_hi_c", t_hi_c),
            ("r_lo_ohm_per_ft", r_lo_ohm_per_ft),
            ("r_hi_ohm_per_ft", r_hi_ohm_per_ft),
        ] {
            if !value.is_finite() {
                return Err(ThermalError::invalid(field, "must be finite"));
            }
        }
        if t_hi_c < t_lo_c {
            return Err(ThermalError::invalid(
                "t_hi_c",
                format!("{t_hi_c} is below the low reference {t_lo_c}"),
            ));
        }
        if !max_temp_c.is_finite() || max_temp_c <= ABSOLUTE_ZERO_C {
            return Err(ThermalError::invalid(
                "max_temp_c",
                format!("{max_temp_c} is not a physical temperature"),
            ));
        }

        Ok(ConductorSpec {
            diameter_in,
            emissivity: self.emissivity,
            absorptivity: self.absorptivity,
            t_lo_c,
            t_hi_c,
            r_lo_ohm_per_ft,
            r_hi_ohm_per_ft,
            max_temp_c,
            direction: self.direction,
        })
    }
}

fn ensure_unit_interval(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ThermalError::invalid(field, format!("{value} outside [0, 1]")))
    }
}
