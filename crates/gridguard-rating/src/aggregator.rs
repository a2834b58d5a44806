//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Grid-wide evaluation: every line under one weather snapshot, ranked by loading.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use gridguard_thermal::WeatherSnapshot;
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use tracing::{info, warn};

use crate::{
    errors::{RatingError, Result},
    evaluator::{LineRatingEvaluator, LineStatus, RatingResult},
    model::{ConductorLibrary, GridData, LineLibrary},
    weather::SiteConditions,
};

pub const NO_FAILURE: &str = "no failure";
/// Widest ambient range `find_first_failure_temperature` will step through.
pub const MAX_SCAN_SPAN_C: f64 = 200.0;

/// Counts and loading statistics for one grid evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemHealth {
    pub total_lines: usize,
    pub overloaded_lines: usize,
    pub critical_lines: usize,
    pub warning_lines: usize,
    pub normal_lines: usize,
    #[serde(with = "crate::loading")]
    pub avg_loading_pct: f64,
    #[serde(with = "crate::loading")]
    pub max_loading_pct: f64,
    pub most_stressed_line: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::loading::optional"
    )]
    pub most_stressed_loading_pct: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl SystemHealth {
    /// `results` must already be ordered by descending loading.
    pub fn from_results(results: &[RatingResult], timestamp: DateTime<Utc>) -> Self {
        let count = |status: LineStatus| results.iter().filter(|r| r.status == status).count();
        let (avg_loading_pct, max_loading_pct) = if results.is_empty() {
            (0.0, 0.0)
        } else {
            let sum: f64 = results.iter().map(|r| r.loading_pct).sum();
            let max = results
                .iter()
                .map(|r| r.loading_pct)
                .fold(f64::NEG_INFINITY, f64::max);
            (sum / results.len() as f64, max)
        };
        let most_stressed = results.first();

        Self {
            total_lines: results.len(),
            overloaded_lines: count(LineStatus::Overload),
            critical_lines: count(LineStatus::Critical),
            warning_lines: count(LineStatus::Warning),
            normal_lines: count(LineStatus::Ok),
            avg_loading_pct,
            max_loading_pct,
            most_stressed_line: most_stressed.map(|r| r.line_id.clone()),
            most_stressed_loading_pct: most_stressed.map(|r| r.loading_pct),
            timestamp,
        }
    }

    pub fn lines_at_risk(&self) -> usize {
        self.overloaded_lines + self.critical_lines
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridEvaluation {
    pub results: Vec<RatingResult>,
    pub health: SystemHealth,
}

/// Outcome of the ambient temperature scan. Serializes with an extra `line`
/// field holding [`FailureScan::line_label`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FailureScan {
    /// First overloading temperature, or the last temperature scanned when none fails.
    pub temperature_c: f64,
    pub line_id: Option<String>,
}

impl FailureScan {
    pub fn is_failure(&self) -> bool {
        self.line_id.is_some()
    }

    pub fn line_label(&self) -> &str {
        self.line_id.as_deref().unwrap_or(NO_FAILURE)
    }
}

impl Serialize for FailureScan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FailureScan", 3)?;
        state.serialize_field("temperature_c", &self.temperature_c)?;
        state.serialize_field("line_id", &self.line_id)?;
        state.serialize_field("line", self.line_label())?;
        state.end()
    }
}

/// Stable sort, most loaded first. Ties keep network order.
pub fn rank_by_loading(results: &mut [RatingResult]) {
    results.sort_by(|a, b| b.loading_pct.total_cmp(&a.loading_pct));
}

pub(crate) fn rate_lines(
    evaluator: &LineRatingEvaluator,
    lines: &LineLibrary,
    conductors: &ConductorLibrary,
    weather: &WeatherSnapshot,
) -> Vec<RatingResult> {
    let mut results: Vec<RatingResult> = lines
        .records()
        .par_iter()
        .filter_map(|line| match evaluator.evaluate(line, conductors, weather) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(line = %line.id, error = %err, "skipping line");
                None
            }
        })
        .collect();
    rank_by_loading(&mut results);
    results
}

/// Rate every line with the default options and summarize the grid.
pub fn evaluate_grid(
    lines: &LineLibrary,
    conductors: &ConductorLibrary,
    weather: &WeatherSnapshot,
) -> (Vec<RatingResult>, SystemHealth) {
    let results = rate_lines(&LineRatingEvaluator::default(), lines, conductors, weather);
    let health = SystemHealth::from_results(&results, Utc::now());
    (results, health)
}

/// Owns the current grid data and evaluates against consistent snapshots of it.
///
/// Replacing the data swaps an `Arc`; evaluations already running keep the snapshot
/// they started with.
#[derive(Debug)]
pub struct GridAggregator {
    data: RwLock<Arc<GridData>>,
    evaluator: LineRatingEvaluator,
    site: SiteConditions,
}

impl GridAggregator {
    pub fn new(data: GridData, evaluator: LineRatingEvaluator, site: SiteConditions) -> Self {
        Self {
            data: RwLock::new(Arc::new(data)),
            evaluator,
            site,
        }
    }

    pub fn site(&self) -> &SiteConditions {
        &self.site
    }

    pub fn evaluator(&self) -> &LineRatingEvaluator {
        &self.evaluator
    }

    pub fn snapshot(&self) -> Arc<GridData> {
        Arc::clone(&self.data.read())
    }

    /// Install new reference data, returning the previous snapshot.
    pub fn replace_data(&self, data: GridData) -> Arc<GridData> {
        let next = Arc::new(data);
        info!(
            lines = next.lines.len(),
            conductors = next.conductors.len(),
            "grid data replaced"
        );
        std::mem::replace(&mut *self.data.write(), next)
    }

    /// Refresh line flows; lines missing from `flows` keep their previous value.
    pub fn update_flows(&self, flows: &HashMap<String, f64>) {
        let mut guard = self.data.write();
        let next = GridData::new(guard.lines.with_flows(flows), guard.conductors.clone());
        *guard = Arc::new(next);
    }

    pub fn evaluate_line(&self, line_id: &str, weather: &WeatherSnapshot) -> Result<RatingResult> {
        let data = self.snapshot();
        self.evaluator
            .evaluate_by_id(line_id, &data.conductors, &data.lines, weather)
    }

    pub fn calculate_all_lines(&self, weather: &WeatherSnapshot) -> Vec<RatingResult> {
        let data = self.snapshot();
        rate_lines(&self.evaluator, &data.lines, &data.conductors, weather)
    }

    pub fn system_health(&self, weather: &WeatherSnapshot) -> SystemHealth {
        SystemHealth::from_results(&self.calculate_all_lines(weather), Utc::now())
    }

    pub fn evaluate_grid(&self, weather: &WeatherSnapshot) -> GridEvaluation {
        let results = self.calculate_all_lines(weather);
        let health = SystemHealth::from_results(&results, Utc::now());
        info!(
            total = health.total_lines,
            overloaded = health.overloaded_lines,
            critical = health.critical_lines,
            max_loading_pct = health.max_loading_pct,
            "grid evaluated"
        );
        GridEvaluation { results, health }
    }

    /// Lines in `CRITICAL` or `OVERLOAD`, most loaded first.
    pub fn critical_lines(&self, weather: &WeatherSnapshot) -> Vec<RatingResult> {
        self.calculate_all_lines(weather)
            .into_iter()
            .filter(|r| matches!(r.status, LineStatus::Critical | LineStatus::Overload))
            .collect()
    }

    /// Scan whole-degree ambient temperatures from `start_c` to `max_c` under
    /// worst-case sun and report the first one that overloads any line. When
    /// none does, the scan reports `max_c` as given.
    pub fn find_first_failure_temperature(
        &self,
        start_c: f64,
        max_c: f64,
        wind_velocity_fts: f64,
    ) -> Result<FailureScan> {
        validate_scan_range(start_c, max_c)?;
        let data = self.snapshot();
        let first = start_c.trunc() as i64;
        let last = max_c.trunc() as i64;

        for degree in first..=last {
            let ambient_c = degree as f64;
            let weather = self.site.worst_case_snapshot(ambient_c, wind_velocity_fts)?;
            let results = rate_lines(&self.evaluator, &data.lines, &data.conductors, &weather);
            if let Some(top) = results.first() {
                if top.loading_pct >= crate::evaluator::OVERLOAD_PCT {
                    info!(
                        temperature_c = ambient_c,
                        line = %top.line_id,
                        loading_pct = top.loading_pct,
                        "first failure found"
                    );
                    return Ok(FailureScan {
                        temperature_c: ambient_c,
                        line_id: Some(top.line_id.clone()),
                    });
                }
            }
        }

        Ok(FailureScan {
            temperature_c: max_c,
            line_id: None,
        })
    }
}

/// Scan bounds must be finite and at most [`MAX_SCAN_SPAN_C`] apart.
pub fn validate_scan_range(start_c: f64, max_c: f64) -> Result<()> {
    if !start_c.is_finite() || !max_c.is_finite() {
        return Err(RatingError::InvalidScan(format!(
            "bounds must be finite (start {start_c}, max {max_c})"
        )));
    }
    if max_c - start_c > MAX_SCAN_SPAN_C {
        return Err(RatingError::InvalidScan(format!(
            "{start_c}..{max_c} spans more than {MAX_SCAN_SPAN_C} °C"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        evaluator::RatingOptions,
        model::{ConductorProperties, LineRecord},
    };

    fn weather() -> WeatherSnapshot {
        SiteConditions::default().worst_case_snapshot(25.0, 6.56).unwrap()
    }

    fn conductors() -> ConductorLibrary {
        ConductorLibrary::new(vec![ConductorProperties {
            name: "Oriole".into(),
            resistance_25c_ohm_per_mile: 0.2708,
            resistance_50c_ohm_per_mile: 0.2974,
            radius_in: 0.18525,
        }])
        .unwrap()
    }

    fn line(id: &str, conductor: &str, flow: f64) -> LineRecord {
        LineRecord {
            id: id.into(),
            branch_name: format!("{id} branch"),
            bus0: "B1".into(),
            bus1: "B2".into(),
            voltage_kv: 69.0,
            conductor: conductor.into(),
            max_temp_c: 75.0,
            flow_mva: flow,
        }
    }

    fn aggregator(lines: Vec<LineRecord>) -> GridAggregator {
        GridAggregator::new(
            GridData::new(LineLibrary::new(lines).unwrap(), conductors()),
            LineRatingEvaluator::new(RatingOptions::default()).unwrap(),
            SiteConditions::default(),
        )
    }

    #[test]
    fn results_are_ranked_and_ties_keep_network_order() {
        let grid = aggregator(vec![
            line("L0", "Oriole", 50.0),
            line("L1", "Oriole", 150.0),
            line("L2", "Oriole", 50.0),
            line("L3", "Oriole", 100.0),
        ]);
        let ids: Vec<_> = grid
            .calculate_all_lines(&weather())
            .into_iter()
            .map(|r| r.line_id)
            .collect();
        assert_eq!(ids, ["L1", "L3", "L0", "L2"]);
    }

    #[test]
    fn missing_conductor_only_skips_that_line() {
        let grid = aggregator(vec![
            line("L0", "Oriole", 50.0),
            line("L1", "Unobtainium", 150.0),
        ]);
        let results = grid.calculate_all_lines(&weather());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].line_id, "L0");
    }

    #[test]
    fn health_counts_match_results() {
        // 174.9 MVA rating at 69 kV.
        let grid = aggregator(vec![
            line("L0", "Oriole", 10.0),
            line("L1", "Oriole", 150.0),
            line("L2", "Oriole", 170.0),
            line("L3", "Oriole", 200.0),
        ]);
        let evaluation = grid.evaluate_grid(&weather());
        let health = &evaluation.health;
        assert_eq!(health.total_lines, 4);
        assert_eq!(health.overloaded_lines, 1);
        assert_eq!(health.critical_lines, 1);
        assert_eq!(health.warning_lines, 1);
        assert_eq!(health.normal_lines, 1);
        assert_eq!(health.lines_at_risk(), 2);
        assert_eq!(health.most_stressed_line.as_deref(), Some("L3"));
        assert_eq!(health.max_loading_pct, evaluation.results[0].loading_pct);
        let mean = evaluation.results.iter().map(|r| r.loading_pct).sum::<f64>() / 4.0;
        assert!((health.avg_loading_pct - mean).abs() < 1e-9);
    }

    #[test]
    fn empty_grid_reports_zeroes() {
        let health = SystemHealth::from_results(&[], Utc::now());
        assert_eq!(health.total_lines, 0);
        assert_eq!(health.avg_loading_pct, 0.0);
        assert_eq!(health.max_loading_pct, 0.0);
        assert!(health.most_stressed_line.is_none());
        assert!(health.most_stressed_loading_pct.is_none());
    }

    #[test]
    fn critical_lines_filters_by_status() {
        let grid = aggregator(vec![
            line("L0", "Oriole", 10.0),
            line("L1", "Oriole", 170.0),
            line("L2", "Oriole", 200.0),
        ]);
        let ids: Vec<_> = grid
            .critical_lines(&weather())
            .into_iter()
            .map(|r| r.line_id)
            .collect();
        assert_eq!(ids, ["L2", "L1"]);
    }

    #[test]
    fn first_failure_is_the_minimal_overloading_temperature() {
        let grid = aggregator(vec![line("L0", "Oriole", 10.0), line("L1", "Oriole", 90.0)]);
        let scan = grid.find_first_failure_temperature(20.0, 80.0, 2.0).unwrap();
        assert!(scan.is_failure());
        assert_eq!(scan.line_label(), "L1");
        assert_eq!(scan.temperature_c, 48.0);

        let site = SiteConditions::default();
        let at = |t: f64| {
            grid.calculate_all_lines(&site.worst_case_snapshot(t, 2.0).unwrap())[0].loading_pct
        };
        assert!(at(scan.temperature_c) >= 100.0);
        assert!(at(scan.temperature_c - 1.0) < 100.0);
    }

    #[test]
    fn no_failure_reports_last_temperature() {
        let grid = aggregator(vec![line("L0", "Oriole", 1.0)]);
        let scan = grid.find_first_failure_temperature(20.0, 30.9, 6.56).unwrap();
        assert!(!scan.is_failure());
        assert_eq!(scan.temperature_c, 30.9);
        assert_eq!(scan.line_label(), NO_FAILURE);
    }

    #[test]
    fn scan_rejects_unbounded_ranges() {
        let grid = aggregator(vec![line("L0", "Oriole", 1.0)]);
        for (start, max) in [
            (20.0, 1e15),
            (-500.0, 50.0),
            (f64::NAN, 50.0),
            (20.0, f64::INFINITY),
        ] {
            let err = grid.find_first_failure_temperature(start, max, 6.56).unwrap_err();
            assert!(matches!(err, RatingError::InvalidScan(_)), "{start}..{max}");
        }
        assert!(validate_scan_range(0.0, MAX_SCAN_SPAN_C).is_ok());
    }

    #[test]
    fn scan_json_carries_the_no_failure_label() {
        let grid = aggregator(vec![line("L0", "Oriole", 1.0)]);
        let scan = grid.find_first_failure_temperature(20.0, 25.5, 6.56).unwrap();
        let value = serde_json::to_value(&scan).unwrap();
        assert_eq!(value["temperature_c"], 25.5);
        assert!(value["line_id"].is_null());
        assert_eq!(value["line"], NO_FAILURE);

        let back: FailureScan = serde_json::from_value(value).unwrap();
        assert_eq!(back, scan);
    }

    #[test]
    fn replacing_data_keeps_earlier_snapshot_intact() {
        let grid = aggregator(vec![line("L0", "Oriole", 10.0)]);
        let before = grid.snapshot();
        let previous = grid.replace_data(GridData::new(
            LineLibrary::new(vec![line("L0", "Oriole", 10.0), line("L1", "Oriole", 20.0)])
                .unwrap(),
            conductors(),
        ));
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.lines.len(), 1);
        assert_eq!(grid.snapshot().lines.len(), 2);
    }

    #[test]
    fn flow_updates_apply_to_later_evaluations() {
        let grid = aggregator(vec![line("L0", "Oriole", 10.0)]);
        grid.update_flows(&HashMap::from([("L0".to_string(), 200.0)]));
        let result = grid.evaluate_line("L0", &weather()).unwrap();
        assert_eq!(result.flow_mva, 200.0);
        assert_eq!(result.status, LineStatus::Overload);
    }

    #[test]
    fn free_function_matches_aggregator() {
        let lines = LineLibrary::new(vec![line("L0", "Oriole", 80.0)]).unwrap();
        let (results, health) = evaluate_grid(&lines, &conductors(), &weather());
        let grid = aggregator(vec![line("L0", "Oriole", 80.0)]);
        assert_eq!(results, grid.calculate_all_lines(&weather()));
        assert_eq!(health.total_lines, 1);
    }
}
