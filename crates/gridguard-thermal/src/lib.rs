//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Conductor thermal model and ampacity solver."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Steady-state thermal rating of bare overhead conductors.
//!
//! The solver balances convective and radiative cooling against solar gain and Joule
//! heating with the conductor held at its maximum operating temperature, in the style
//! of IEEE-738. Units follow the conductor library: inches, feet, ohm/ft and W/ft,
//! with metric intermediates where the correlations are defined that way.
//!
//! The solar term is simplified to a time-of-day cosine and a fixed
//! seasonal factor. Line orientation, latitude and calendar date are validated and
//! carried but do not influence the result.

pub mod air;
pub mod errors;
pub mod heat_balance;
pub mod params;
pub mod resistance;
pub mod solver;

pub use errors::{Result, ThermalError};
pub use heat_balance::HeatBalance;
pub use params::{
    Atmosphere, ConductorSpec, ConductorSpecBuilder, Direction, WeatherSnapshot,
    WeatherSnapshotBuilder,
};
pub use resistance::resistance_at;
pub use solver::{solve_steady_state, steady_state_thermal_rating, SteadyStateRating};
