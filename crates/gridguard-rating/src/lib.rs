//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
pub mod aggregator;
pub mod errors;
pub mod evaluator;
pub mod forecast;
pub mod io;
pub mod loading;
pub mod model;
pub mod reports;
pub mod weather;

use std::path::Path;

use chrono::{DateTime, Utc};
use gridguard_thermal::WeatherSnapshot;
use tracing::info;

use crate::{
    aggregator::{GridAggregator, GridEvaluation},
    forecast::ForecastAlerts,
    reports::ReportExporter,
};

pub use aggregator::{evaluate_grid, FailureScan, SystemHealth, NO_FAILURE};
pub use errors::{RatingError, Result};
pub use evaluator::{
    evaluate_line, LineRatingEvaluator, LineStatus, RatingOptions, RatingResult, StatusThresholds,
};
pub use forecast::{analyze_forecast, prioritize_alerts, AlertThresholds, ForecastStep};
pub use model::{ConductorDefaults, ConductorLibrary, GridData, LineLibrary, LineRecord};
pub use weather::{SiteConditions, WeatherObservation};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RatingSummary {
    pub timestamp: DateTime<Utc>,
    pub data_source: Option<String>,
    pub evaluation: GridEvaluation,
    pub alerts: Option<ForecastAlerts>,
}

impl RatingSummary {
    pub fn exporter(&self) -> ReportExporter<'_> {
        ReportExporter::new(self)
    }
}

/// Evaluates the grid under `weather` and writes the rating reports.
/// When `output_dir` is `None`, the default `reports/` directory is used.
pub fn analyze_grid_with_options(
    grid: &GridAggregator,
    weather: &WeatherSnapshot,
    data_source: Option<String>,
    alerts: Option<ForecastAlerts>,
    output_dir: Option<&Path>,
) -> Result<RatingSummary> {
    info!("Evaluating line ratings...");
    let evaluation = grid.evaluate_grid(weather);

    let summary = RatingSummary {
        timestamp: Utc::now(),
        data_source,
        evaluation,
        alerts,
    };

    let default_dir = Path::new("reports");
    let output_dir = output_dir.unwrap_or(default_dir);
    summary.exporter().export_all(output_dir)?;

    Ok(summary)
}
