//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gridguard_thermal::{solve_steady_state, WeatherSnapshot};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use crate::{
    errors::{RatingError, Result},
    model::{ConductorDefaults, ConductorLibrary, LineLibrary, LineRecord},
};

/// Loading at which a line exceeds its solved thermal rating. Not configurable.
pub const OVERLOAD_PCT: f64 = 100.0;
pub const DEFAULT_CRITICAL_PCT: f64 = 95.0;
pub const DEFAULT_WARNING_PCT: f64 = 80.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LineStatus {
    Ok,
    Warning,
    Critical,
    Overload,
}

/// Warning/critical bands for per-line status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StatusThresholds {
    pub warning_pct: f64,
    pub critical_pct: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            warning_pct: DEFAULT_WARNING_PCT,
            critical_pct: DEFAULT_CRITICAL_PCT,
        }
    }
}

impl StatusThresholds {
    pub fn new(warning_pct: f64, critical_pct: f64) -> Result<Self> {
        let thresholds = Self {
            warning_pct,
            critical_pct,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.warning_pct > 0.0
            && self.warning_pct <= self.critical_pct
            && self.critical_pct <= OVERLOAD_PCT)
        {
            return Err(RatingError::InvalidThresholds(format!(
                "expected 0 < warning ({}) <= critical ({}) <= {}",
                self.warning_pct, self.critical_pct, OVERLOAD_PCT
            )));
        }
        Ok(())
    }

    /// Overload first, then critical, then warning; boundaries are inclusive.
    pub fn classify(&self, loading_pct: f64) -> LineStatus {
        if loading_pct >= OVERLOAD_PCT {
            LineStatus::Overload
        } else if loading_pct >= self.critical_pct {
            LineStatus::Critical
        } else if loading_pct >= self.warning_pct {
            LineStatus::Warning
        } else {
            LineStatus::Ok
        }
    }
}

/// Three-phase apparent power carried by `amps` at `voltage_kv`.
pub fn rating_mva(amps: f64, voltage_kv: f64) -> f64 {
    3f64.sqrt() * amps * (voltage_kv * 1000.0) * 1e-6
}

/// `100 · flow / rating`. A zero rating reports infinite loading.
pub fn loading_percent(flow_mva: f64, rating_mva: f64) -> f64 {
    if rating_mva > 0.0 {
        100.0 * flow_mva / rating_mva
    } else {
        f64::INFINITY
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingResult {
    pub line_id: String,
    pub branch_name: String,
    pub rating_amps: f64,
    pub rating_mva: f64,
    pub flow_mva: f64,
    /// `+inf` when the conductor cannot carry any current under the given weather.
    #[serde(with = "crate::loading")]
    pub loading_pct: f64,
    pub voltage_kv: f64,
    pub conductor: String,
    pub status: LineStatus,
    pub bus0: String,
    pub bus1: String,
}

impl RatingResult {
    pub fn has_finite_loading(&self) -> bool {
        self.loading_pct.is_finite()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingOptions {
    pub thresholds: StatusThresholds,
    pub conductor: ConductorDefaults,
}

/// Joins a line with its conductor and solves its rating under one weather snapshot.
#[derive(Debug, Clone, Default)]
pub struct LineRatingEvaluator {
    options: RatingOptions,
}

impl LineRatingEvaluator {
    pub fn new(options: RatingOptions) -> Result<Self> {
        options.thresholds.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &RatingOptions {
        &self.options
    }

    pub fn evaluate(
        &self,
        line: &LineRecord,
        conductors: &ConductorLibrary,
        weather: &WeatherSnapshot,
    ) -> Result<RatingResult> {
        let properties =
            conductors
                .get(&line.conductor)
                .ok_or_else(|| RatingError::ConductorNotFound {
                    line: line.id.clone(),
                    conductor: line.conductor.clone(),
                })?;
        let spec = properties
            .to_spec(line.max_temp_c, &self.options.conductor)
            .map_err(|source| RatingError::InvalidConductor {
                line: line.id.clone(),
                source,
            })?;

        let solved = solve_steady_state(weather, &spec);
        let rating_mva = rating_mva(solved.ampacity_a, line.voltage_kv);
        let loading_pct = loading_percent(line.flow_mva, rating_mva);
        let status = self.options.thresholds.classify(loading_pct);

        debug!(
            line = %line.id,
            rating_amps = solved.ampacity_a,
            rating_mva,
            loading_pct,
            status = %status,
            "line rating evaluated"
        );

        Ok(RatingResult {
            line_id: line.id.clone(),
            branch_name: line.branch_name.clone(),
            rating_amps: solved.ampacity_a,
            rating_mva,
            flow_mva: line.flow_mva,
            loading_pct,
            voltage_kv: line.voltage_kv,
            conductor: line.conductor.clone(),
            status,
            bus0: line.bus0.clone(),
            bus1: line.bus1.clone(),
        })
    }

    pub fn evaluate_by_id(
        &self,
        line_id: &str,
        conductors: &ConductorLibrary,
        lines: &LineLibrary,
        weather: &WeatherSnapshot,
    ) -> Result<RatingResult> {
        let line = lines
            .get(line_id)
            .ok_or_else(|| RatingError::LineNotFound(line_id.to_owned()))?;
        self.evaluate(line, conductors, weather)
    }
}

/// Rate a single line with the default thresholds and surface coefficients.
pub fn evaluate_line(
    line_id: &str,
    conductors: &ConductorLibrary,
    lines: &LineLibrary,
    weather: &WeatherSnapshot,
) -> Result<RatingResult> {
    LineRatingEvaluator::default().evaluate_by_id(line_id, conductors, lines, weather)
}
