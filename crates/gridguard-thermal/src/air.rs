//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Conductor thermal model and ampacity solver."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Properties of air evaluated at the film temperature.

pub const KELVIN_OFFSET: f64 = 273.15;

const SEA_LEVEL_DENSITY_LB_FT3: f64 = 0.0765;
const REFERENCE_DENSITY_TEMP_K: f64 = 15.0 + KELVIN_OFFSET;
const ELEVATION_SCALE_FT: f64 = 30_000.0;

const SUTHERLAND_MU_REF_PA_S: f64 = 1.716e-5;
const SUTHERLAND_T_REF_K: f64 = KELVIN_OFFSET;
const SUTHERLAND_CONSTANT_K: f64 = 110.4;
const PA_S_TO_LB_FT_S: f64 = 0.0208854;

const METERS_PER_FOOT: f64 = 0.3048;

/// Average of conductor and ambient temperature (°C).
pub fn film_temperature(conductor_c: f64, ambient_c: f64) -> f64 {
    (conductor_c + ambient_c) / 2.0
}

/// Air density in lb/ft³, ideal gas scaling from 15 °C with an exponential elevation factor.
pub fn air_density(temp_c: f64, elevation_ft: f64) -> f64 {
    let temp_k = temp_c + KELVIN_OFFSET;
    let elevation_factor = (-elevation_ft / ELEVATION_SCALE_FT).exp();
    SEA_LEVEL_DENSITY_LB_FT3 * (REFERENCE_DENSITY_TEMP_K / temp_k) * elevation_factor
}

/// Dynamic viscosity in lb/(ft·s) from Sutherland's law.
pub fn air_viscosity(temp_c: f64) -> f64 {
    let temp_k = temp_c + KELVIN_OFFSET;
    let mu_si = SUTHERLAND_MU_REF_PA_S
        * (temp_k / SUTHERLAND_T_REF_K).powf(1.5)
        * ((SUTHERLAND_T_REF_K + SUTHERLAND_CONSTANT_K) / (temp_k + SUTHERLAND_CONSTANT_K));
    mu_si * PA_S_TO_LB_FT_S
}

/// Thermal conductivity in W/(ft·°C), linear in temperature.
pub fn air_thermal_conductivity(temp_c: f64) -> f64 {
    let k_si = 0.023 + 0.00007 * temp_c;
    k_si * METERS_PER_FOOT
}
