//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Conductor thermal model and ampacity solver."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use crate::params::ConductorSpec;

/// Lower bound applied to interpolated resistance so the solver never divides by zero.
pub const MIN_RESISTANCE_OHM_PER_FT: f64 = 1e-10;

/// AC resistance (ohm/ft) at `temp_c`, linear through the two reference points.
///
/// Extrapolates outside `[t_lo, t_hi]` without complaint; the rating path evaluates at
/// the conductor limit, which usually sits above the high reference.
pub fn resistance_at(conductor: &ConductorSpec, temp_c: f64) -> f64 {
    let (t_lo, t_hi) = (conductor.t_lo_c(), conductor.t_hi_c());
    let (r_lo, r_hi) = (conductor.r_lo_ohm_per_ft(), conductor.r_hi_ohm_per_ft());

    if t_hi == t_lo {
        return r_lo;
    }

    // slope * (t_hi - t_lo) can miss r_hi by an ulp; pin the reference point.
    if temp_c == t_hi {
        return r_hi.max(MIN_RESISTANCE_OHM_PER_FT);
    }

    let slope = (r_hi - r_lo) / (t_hi - t_lo);
    let resistance = r_lo + slope * (temp_c - t_lo);
    resistance.max(MIN_RESISTANCE_OHM_PER_FT)
}
