//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Conductor thermal model and ampacity solver."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::Serialize;
use tracing::trace;

use crate::heat_balance::HeatBalance;
use crate::params::{ConductorSpec, WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteadyStateRating {
    pub ampacity_a: f64,
    pub balance: HeatBalance,
}

impl SteadyStateRating {
    /// True when no current can be carried without exceeding the conductor limit.
    pub fn is_degenerate(&self) -> bool {
        self.ampacity_a == 0.0
    }
}

/// Solve `q_c + q_r = q_s + I²·R(Tc)` for `I`.
///
/// Never fails for finite inputs. When convection and radiation cannot even carry away
/// the solar gain, or the resistance is not positive, the rating is 0 A.
pub fn solve_steady_state(weather: &WeatherSnapshot, conductor: &ConductorSpec) -> SteadyStateRating {
    let balance = HeatBalance::evaluate(weather, conductor);
    let net_cooling = balance.net_cooling_w_per_ft();

    let ampacity_a = if net_cooling <= 0.0 || balance.resistance_ohm_per_ft <= 0.0 {
        0.0
    } else {
        (net_cooling / balance.resistance_ohm_per_ft).max(0.0).sqrt()
    };

    trace!(
        q_c = balance.convective_w_per_ft,
        q_r = balance.radiative_w_per_ft,
        q_s = balance.solar_w_per_ft,
        r_tc = balance.resistance_ohm_per_ft,
        ampacity_a,
        "steady-state rating solved"
    );

    SteadyStateRating {
        ampacity_a,
        balance,
    }
}

/// Ampacity in amps; shorthand for [`solve_steady_state`].
pub fn steady_state_thermal_rating(weather: &WeatherSnapshot, conductor: &ConductorSpec) -> f64 {
    solve_steady_state(weather, conductor).ampacity_a
}
