//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Conductor thermal model and ampacity solver."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Heat gain and loss terms per unit length of conductor, all in W/ft.
//!
//! Each term is evaluated with the conductor at its maximum operating temperature,
//! which is the condition the steady-state rating is solved for. Every term is
//! floored at zero.

use std::f64::consts::PI;

use serde::Serialize;

use crate::air::{
    air_density, air_thermal_conductivity, air_viscosity, film_temperature, KELVIN_OFFSET,
};
use crate::params::{Atmosphere, ConductorSpec, WeatherSnapshot};
use crate::resistance::resistance_at;

pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;
pub const CLEAR_IRRADIANCE_W_M2: f64 = 1000.0;
pub const INDUSTRIAL_IRRADIANCE_W_M2: f64 = 850.0;
/// Fixed seasonal scaling; the snapshot date is not consulted.
pub const SEASON_FACTOR: f64 = 0.9;

const NATURAL_NUSSELT: f64 = 0.65;
const FORCED_REYNOLDS_THRESHOLD: f64 = 1.0;
const INCHES_PER_FOOT: f64 = 12.0;
const METERS_PER_INCH: f64 = 0.0254;
const METERS_PER_FOOT: f64 = 0.3048;
const DEGREES_PER_HOUR: f64 = 15.0;
const SOLAR_NOON_H: f64 = 12.0;

/// Reynolds number of the cross flow at the film temperature.
pub fn reynolds_number(weather: &WeatherSnapshot, conductor: &ConductorSpec) -> f64 {
    let t_film = film_temperature(conductor.max_temp_c(), weather.ambient_c());
    let density = air_density(t_film, weather.elevation_ft());
    let viscosity = air_viscosity(t_film);
    let diameter_ft = conductor.diameter_in() / INCHES_PER_FOOT;
    density * weather.wind_velocity_fts() * diameter_ft / viscosity
}

/// Nusselt number; natural convection below `Re = 1`, forced correlation at and above it.
pub fn nusselt_number(reynolds: f64) -> f64 {
    if reynolds < FORCED_REYNOLDS_THRESHOLD {
        NATURAL_NUSSELT
    } else {
        NATURAL_NUSSELT + 0.2 * reynolds.powf(0.6)
    }
}

pub fn convective_heat_loss(weather: &WeatherSnapshot, conductor: &ConductorSpec) -> f64 {
    let t_film = film_temperature(conductor.max_temp_c(), weather.ambient_c());
    let conductivity = air_thermal_conductivity(t_film);
    let diameter_ft = conductor.diameter_in() / INCHES_PER_FOOT;

    let nusselt = nusselt_number(reynolds_number(weather, conductor));
    let h_c = nusselt * conductivity / diameter_ft;
    let q_c = h_c * PI * diameter_ft * (conductor.max_temp_c() - weather.ambient_c());
    q_c.max(0.0)
}

pub fn radiative_heat_loss(weather: &WeatherSnapshot, conductor: &ConductorSpec) -> f64 {
    let tc_k = conductor.max_temp_c() + KELVIN_OFFSET;
    let ta_k = weather.ambient_c() + KELVIN_OFFSET;
    let diameter_m = conductor.diameter_in() * METERS_PER_INCH;

    let q_r_per_m = conductor.emissivity()
        * STEFAN_BOLTZMANN
        * PI
        * diameter_m
        * (tc_k.powi(4) - ta_k.powi(4));
    (q_r_per_m * METERS_PER_FOOT).max(0.0)
}

/// `cos(15°·|hour − 12|)`, zero beyond six hours from solar noon.
pub fn time_of_day_factor(sun_time_h: f64) -> f64 {
    let hour_angle = (sun_time_h - SOLAR_NOON_H).abs();
    (hour_angle * DEGREES_PER_HOUR).to_radians().cos().max(0.0)
}

pub fn base_irradiance(atmosphere: Atmosphere) -> f64 {
    match atmosphere {
        Atmosphere::Clear => CLEAR_IRRADIANCE_W_M2,
        Atmosphere::Industrial => INDUSTRIAL_IRRADIANCE_W_M2,
    }
}

/// Solar gain on the projected area. Line direction, latitude and date do not enter.
pub fn solar_heat_gain(weather: &WeatherSnapshot, conductor: &ConductorSpec) -> f64 {
    let irradiance = base_irradiance(weather.atmosphere())
        * time_of_day_factor(weather.sun_time_h())
        * SEASON_FACTOR;
    let projected_area_per_m = conductor.diameter_in() * METERS_PER_INCH;
    let q_s_per_m = conductor.absorptivity() * irradiance * projected_area_per_m;
    (q_s_per_m * METERS_PER_FOOT).max(0.0)
}

/// Every term of the balance `q_c + q_r = q_s + I²·R(Tc)` for one weather/conductor pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatBalance {
    pub convective_w_per_ft: f64,
    pub radiative_w_per_ft: f64,
    pub solar_w_per_ft: f64,
    pub resistance_ohm_per_ft: f64,
}

impl HeatBalance {
    pub fn evaluate(weather: &WeatherSnapshot, conductor: &ConductorSpec) -> Self {
        Self {
            convective_w_per_ft: convective_heat_loss(weather, conductor),
            radiative_w_per_ft: radiative_heat_loss(weather, conductor),
            solar_w_per_ft: solar_heat_gain(weather, conductor),
            resistance_ohm_per_ft: resistance_at(conductor, conductor.max_temp_c()),
        }
    }

    /// Cooling left over for Joule heating once solar gain is covered.
    pub fn net_cooling_w_per_ft(&self) -> f64 {
        (self.convective_w_per_ft + self.radiative_w_per_ft) - self.solar_w_per_ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(ambient: f64, wind: f64, hour: f64) -> WeatherSnapshot {
        WeatherSnapshot::builder()
            .ambient_c(ambient)
            .wind_velocity_fts(wind)
            .sun_time_h(hour)
            .date("12 Jun")
            .latitude_deg(27.0)
            .build()
            .unwrap()
    }

    fn oriole(max_temp: f64) -> ConductorSpec {
        ConductorSpec::builder()
            .diameter_in(0.3705)
            .low_reference(25.0, 0.2708 / 5280.0)
            .high_reference(50.0, 0.2974 / 5280.0)
            .max_temp_c(max_temp)
            .build()
            .unwrap()
    }

    #[test]
    fn no_losses_without_temperature_differential() {
        for temp in [-20.0, 0.0, 25.0, 75.0, 120.0] {
            let w = weather(temp, 6.56, 12.0);
            let c = oriole(temp);
            assert_eq!(convective_heat_loss(&w, &c), 0.0);
            assert_eq!(radiative_heat_loss(&w, &c), 0.0);
        }
    }

    #[test]
    fn losses_floor_at_zero_when_ambient_is_hotter() {
        let w = weather(90.0, 6.56, 12.0);
        let c = oriole(75.0);
        assert_eq!(convective_heat_loss(&w, &c), 0.0);
        assert_eq!(radiative_heat_loss(&w, &c), 0.0);
    }

    #[test]
    fn nusselt_switches_at_reynolds_one() {
        assert_eq!(nusselt_number(0.999), 0.65);
        assert!((nusselt_number(1.0) - 0.85).abs() < 1e-12);
        assert_eq!(nusselt_number(0.0), 0.65);
    }

    #[test]
    fn still_air_uses_natural_convection() {
        let w = weather(25.0, 0.0, 12.0);
        assert_eq!(reynolds_number(&w, &oriole(75.0)), 0.0);
        let q_c = convective_heat_loss(&w, &oriole(75.0));
        assert!((q_c - 0.8246963459012).abs() < 1e-9);
    }

    #[test]
    fn solar_gain_follows_time_of_day() {
        let c = oriole(75.0);
        let noon = solar_heat_gain(&weather(25.0, 6.56, 12.0), &c);
        let afternoon = solar_heat_gain(&weather(25.0, 6.56, 15.0), &c);
        assert!((noon - 2.0652345792).abs() < 1e-9);
        assert!((afternoon - noon * (45.0f64).to_radians().cos()).abs() < 1e-12);
        assert_eq!(solar_heat_gain(&weather(25.0, 6.56, 18.5), &c), 0.0);
        assert_eq!(solar_heat_gain(&weather(25.0, 6.56, 3.0), &c), 0.0);
    }

    #[test]
    fn industrial_atmosphere_reduces_gain() {
        let c = oriole(75.0);
        let clear = weather(25.0, 6.56, 12.0);
        let industrial = clear
            .to_builder()
            .atmosphere(Atmosphere::Industrial)
            .build()
            .unwrap();
        let ratio = solar_heat_gain(&industrial, &c) / solar_heat_gain(&clear, &c);
        assert!((ratio - 0.85).abs() < 1e-12);
    }

    #[test]
    fn balance_breakdown_matches_individual_terms() {
        let w = weather(25.0, 6.56, 12.0);
        let c = oriole(75.0);
        let balance = HeatBalance::evaluate(&w, &c);
        assert_eq!(balance.convective_w_per_ft, convective_heat_loss(&w, &c));
        assert_eq!(balance.radiative_w_per_ft, radiative_heat_loss(&w, &c));
        assert_eq!(balance.solar_w_per_ft, solar_heat_gain(&w, &c));
        assert!((balance.resistance_ohm_per_ft - 0.324 / 5280.0).abs() < 1e-15);
    }
}
