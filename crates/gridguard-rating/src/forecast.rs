//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Forecast stress analysis: grid evaluation per forecast point and the alerts it raises.

use std::cmp::Ordering;

use chrono::{NaiveDateTime, TimeZone, Utc};
use gridguard_thermal::WeatherSnapshot;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::info;

use crate::{
    aggregator::{rate_lines, GridAggregator, SystemHealth},
    errors::{RatingError, Result},
    evaluator::{RatingResult, DEFAULT_CRITICAL_PCT, DEFAULT_WARNING_PCT},
    weather::{SiteConditions, WeatherObservation},
};

const TIME_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub weather: WeatherSnapshot,
}

/// Convert provider observations into rating inputs at `site`.
pub fn forecast_points(
    site: &SiteConditions,
    observations: &[WeatherObservation],
) -> Result<Vec<ForecastPoint>> {
    observations
        .iter()
        .map(|observation| {
            Ok(ForecastPoint {
                timestamp: observation.timestamp,
                weather: site.snapshot_for(observation)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastStep {
    pub timestamp: NaiveDateTime,
    pub ambient_c: f64,
    pub wind_fts: f64,
    pub health: SystemHealth,
    /// Most loaded first.
    pub lines: Vec<RatingResult>,
}

impl GridAggregator {
    /// Evaluate the grid at every point; steps come back in input order.
    pub fn evaluate_forecast(&self, points: &[ForecastPoint]) -> Vec<ForecastStep> {
        let data = self.snapshot();
        points
            .par_iter()
            .map(|point| {
                let lines = rate_lines(
                    self.evaluator(),
                    &data.lines,
                    &data.conductors,
                    &point.weather,
                );
                let health =
                    SystemHealth::from_results(&lines, Utc.from_utc_datetime(&point.timestamp));
                ForecastStep {
                    timestamp: point.timestamp,
                    ambient_c: point.weather.ambient_c(),
                    wind_fts: point.weather.wind_velocity_fts(),
                    health,
                    lines,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertThresholds {
    pub warning_pct: f64,
    pub critical_pct: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning_pct: DEFAULT_WARNING_PCT,
            critical_pct: DEFAULT_CRITICAL_PCT,
        }
    }
}

impl AlertThresholds {
    pub fn new(warning_pct: f64, critical_pct: f64) -> Result<Self> {
        if !(warning_pct > 0.0 && warning_pct <= critical_pct) {
            return Err(RatingError::InvalidThresholds(format!(
                "expected 0 < alert warning ({warning_pct}) <= alert critical ({critical_pct})"
            )));
        }
        Ok(Self {
            warning_pct,
            critical_pct,
        })
    }

    pub fn severity(&self, loading_pct: f64) -> Option<Severity> {
        if loading_pct >= self.critical_pct {
            Some(Severity::Critical)
        } else if loading_pct >= self.warning_pct {
            Some(Severity::Warning)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineAlert {
    pub severity: Severity,
    pub line_id: String,
    pub branch_name: String,
    #[serde(with = "crate::loading")]
    pub loading_pct: f64,
    pub timestamp: NaiveDateTime,
    pub time_str: String,
    pub rating_mva: f64,
    pub flow_mva: f64,
    pub voltage_kv: f64,
}

impl LineAlert {
    fn from_result(severity: Severity, result: &RatingResult, timestamp: NaiveDateTime) -> Self {
        Self {
            severity,
            line_id: result.line_id.clone(),
            branch_name: result.branch_name.clone(),
            loading_pct: result.loading_pct,
            timestamp,
            time_str: timestamp.format(TIME_FORMAT).to_string(),
            rating_mva: result.rating_mva,
            flow_mva: result.flow_mva,
            voltage_kv: result.voltage_kv,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastAlerts {
    pub critical: Vec<LineAlert>,
    pub warning: Vec<LineAlert>,
    pub peak_stress_time: Option<NaiveDateTime>,
    #[serde(with = "crate::loading")]
    pub peak_loading_pct: f64,
    pub summary: String,
    pub alert_count: usize,
}

impl ForecastAlerts {
    /// All alerts, highest priority first.
    pub fn prioritized(&self) -> Vec<LineAlert> {
        let mut all: Vec<LineAlert> = self
            .critical
            .iter()
            .chain(&self.warning)
            .cloned()
            .collect();
        prioritize_alerts(&mut all);
        all
    }
}

/// Raise alerts for every line crossing the alert bands at any forecast step.
pub fn analyze_forecast(steps: &[ForecastStep], thresholds: &AlertThresholds) -> ForecastAlerts {
    let mut critical = Vec::new();
    let mut warning = Vec::new();
    let mut peak_stress_time = None;
    let mut peak_loading_pct = 0.0;

    for step in steps {
        if step.health.max_loading_pct > peak_loading_pct {
            peak_loading_pct = step.health.max_loading_pct;
            peak_stress_time = Some(step.timestamp);
        }
        for result in &step.lines {
            match thresholds.severity(result.loading_pct) {
                Some(Severity::Critical) => critical.push(LineAlert::from_result(
                    Severity::Critical,
                    result,
                    step.timestamp,
                )),
                Some(Severity::Warning) => warning.push(LineAlert::from_result(
                    Severity::Warning,
                    result,
                    step.timestamp,
                )),
                None => {}
            }
        }
    }

    let summary = summarize(critical.len(), warning.len(), peak_stress_time);
    let alert_count = critical.len() + warning.len();
    info!(
        steps = steps.len(),
        critical = critical.len(),
        warning = warning.len(),
        peak_loading_pct,
        "forecast analyzed"
    );

    ForecastAlerts {
        critical,
        warning,
        peak_stress_time,
        peak_loading_pct,
        summary,
        alert_count,
    }
}

fn summarize(critical: usize, warning: usize, peak: Option<NaiveDateTime>) -> String {
    if critical + warning == 0 {
        return "No alerts for the forecast period. System operating normally.".to_owned();
    }
    let mut parts = Vec::with_capacity(2);
    if critical > 0 {
        parts.push(format!("{critical} CRITICAL alert(s)"));
    }
    if warning > 0 {
        parts.push(format!("{warning} WARNING alert(s)"));
    }
    let mut summary = format!("{} detected.", parts.join(" and "));
    if let Some(peak) = peak {
        summary.push_str(&format!(" Peak stress expected at {}.", peak.format(TIME_FORMAT)));
    }
    summary
}

/// Loading descending, then earliest first, then higher voltage first.
pub fn prioritize_alerts(alerts: &mut [LineAlert]) {
    alerts.sort_by(|a, b| {
        b.loading_pct
            .total_cmp(&a.loading_pct)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
            .then_with(|| {
                b.voltage_kv
                    .partial_cmp(&a.voltage_kv)
                    .unwrap_or(Ordering::Equal)
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        evaluator::{LineRatingEvaluator, LineStatus},
        model::{ConductorLibrary, ConductorProperties, GridData, LineLibrary, LineRecord},
        weather::default_forecast,
    };
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 21)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn result(id: &str, loading_pct: f64, voltage_kv: f64) -> RatingResult {
        RatingResult {
            line_id: id.into(),
            branch_name: format!("{id} branch"),
            rating_amps: 500.0,
            rating_mva: 100.0,
            flow_mva: loading_pct,
            loading_pct,
            voltage_kv,
            conductor: "Oriole".into(),
            status: LineStatus::Ok,
            bus0: "B1".into(),
            bus1: "B2".into(),
        }
    }

    fn step(hour: u32, mut lines: Vec<RatingResult>) -> ForecastStep {
        crate::aggregator::rank_by_loading(&mut lines);
        ForecastStep {
            timestamp: at(hour),
            ambient_c: 30.0,
            wind_fts: 2.0,
            health: SystemHealth::from_results(&lines, Utc.from_utc_datetime(&at(hour))),
            lines,
        }
    }

    #[test]
    fn alert_bands_partition_lines() {
        let steps = vec![step(
            14,
            vec![
                result("L0", 79.9, 138.0),
                result("L1", 80.0, 138.0),
                result("L2", 94.9, 69.0),
                result("L3", 95.0, 69.0),
                result("L4", 130.0, 69.0),
            ],
        )];
        let alerts = analyze_forecast(&steps, &AlertThresholds::default());
        fn ids(alerts: &[LineAlert]) -> Vec<String> {
            alerts.iter().map(|a| a.line_id.clone()).collect()
        }
        assert_eq!(ids(&alerts.critical), ["L4", "L3"]);
        assert_eq!(ids(&alerts.warning), ["L2", "L1"]);
        assert_eq!(alerts.alert_count, 4);
        assert_eq!(alerts.critical[0].time_str, "02:00 PM");
    }

    #[test]
    fn first_peak_wins_on_ties() {
        let steps = vec![
            step(9, vec![result("L0", 50.0, 138.0)]),
            step(12, vec![result("L0", 90.0, 138.0)]),
            step(15, vec![result("L0", 90.0, 138.0)]),
        ];
        let alerts = analyze_forecast(&steps, &AlertThresholds::default());
        assert_eq!(alerts.peak_stress_time, Some(at(12)));
        assert_eq!(alerts.peak_loading_pct, 90.0);
        assert_eq!(
            alerts.summary,
            "2 WARNING alert(s) detected. Peak stress expected at 12:00 PM."
        );
    }

    #[test]
    fn quiet_forecast_has_no_alerts() {
        let steps = vec![step(3, vec![result("L0", 20.0, 138.0)])];
        let alerts = analyze_forecast(&steps, &AlertThresholds::default());
        assert_eq!(alerts.alert_count, 0);
        assert_eq!(
            alerts.summary,
            "No alerts for the forecast period. System operating normally."
        );
        let empty = analyze_forecast(&[], &AlertThresholds::default());
        assert!(empty.peak_stress_time.is_none());
        assert_eq!(empty.peak_loading_pct, 0.0);
    }

    #[test]
    fn summary_names_both_severities() {
        let steps = vec![step(17, vec![result("L0", 99.0, 69.0), result("L1", 85.0, 138.0)])];
        let alerts = analyze_forecast(&steps, &AlertThresholds::default());
        assert_eq!(
            alerts.summary,
            "1 CRITICAL alert(s) and 1 WARNING alert(s) detected. Peak stress expected at 05:00 PM."
        );
    }

    #[test]
    fn prioritization_orders_by_loading_time_then_voltage() {
        let steps = vec![
            step(15, vec![result("L5", 96.0, 69.0), result("L0", 96.0, 138.0)]),
            step(12, vec![result("L7", 96.0, 69.0), result("L9", 99.0, 69.0)]),
        ];
        let ordered: Vec<_> = analyze_forecast(&steps, &AlertThresholds::default())
            .prioritized()
            .into_iter()
            .map(|a| a.line_id)
            .collect();
        assert_eq!(ordered, ["L9", "L7", "L0", "L5"]);
    }

    #[test]
    fn invalid_alert_thresholds_are_rejected() {
        assert!(AlertThresholds::new(96.0, 95.0).is_err());
        assert!(AlertThresholds::new(0.0, 95.0).is_err());
        assert!(AlertThresholds::new(70.0, 90.0).is_ok());
    }

    #[test]
    fn forecast_steps_keep_input_order() {
        let conductors = ConductorLibrary::new(vec![ConductorProperties {
            name: "Oriole".into(),
            resistance_25c_ohm_per_mile: 0.2708,
            resistance_50c_ohm_per_mile: 0.2974,
            radius_in: 0.18525,
        }])
        .unwrap();
        let lines = LineLibrary::new(vec![LineRecord {
            id: "L0".into(),
            branch_name: "L0 branch".into(),
            bus0: "B1".into(),
            bus1: "B2".into(),
            voltage_kv: 69.0,
            conductor: "Oriole".into(),
            max_temp_c: 75.0,
            flow_mva: 120.0,
        }])
        .unwrap();
        let site = SiteConditions::default();
        let grid = GridAggregator::new(
            GridData::new(lines, conductors),
            LineRatingEvaluator::default(),
            site,
        );
        let observations = default_forecast(at(0), 24);
        let points = forecast_points(&site, &observations).unwrap();
        let steps = grid.evaluate_forecast(&points);

        assert_eq!(steps.len(), 8);
        for (step, observation) in steps.iter().zip(&observations) {
            assert_eq!(step.timestamp, observation.timestamp);
            assert_eq!(step.ambient_c, observation.temperature_c);
            assert_eq!(step.health.total_lines, 1);
        }
        // Warmer steps rate lower, so loading climbs through the day.
        assert!(steps[7].lines[0].loading_pct > steps[0].lines[0].loading_pct);
    }
}
