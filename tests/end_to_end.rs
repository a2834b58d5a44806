//! ---
//! ems_section: "15-testing-qa-runbook"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "End-to-end checks from configuration and CSV inputs to grid health reports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use gridguard_common::AppConfig;
use gridguard_rating::{
    aggregator::{GridAggregator, SystemHealth},
    analyze_grid_with_options,
    io::load_grid_data_from_readers,
    LineRatingEvaluator, LineStatus, RatingError, RatingResult,
};
use tempfile::tempdir;

const CONFIG: &str = r#"
[site]
latitude_deg = 27.0
elevation_ft = 1000.0
atmosphere = "clear"

[status]
warning_pct = 80.0
critical_pct = 95.0
"#;

const LINES: &str = "\
name,bus0,bus1,branch_name,conductor,MOT
L0,SURF69,TURTLE69,SURF69 TO TURTLE69,336.4 ACSR 30/7 ORIOLE,75
L1,SURF69,REEF69,SURF69 TO REEF69,336.4 ACSR 30/7 ORIOLE,75
L2,REEF69,TURTLE69,REEF69 TO TURTLE69,336.4 ACSR 30/7 ORIOLE,75
L3,REEF69,WAVE69,REEF69 TO WAVE69,336.4 ACSR 30/7 ORIOLE,75
";
const FLOWS: &str = "\
name,p0_nominal
L0,100.0
L1,150.0
L2,170.0
L3,180.0
";
const CONDUCTORS: &str = "\
ConductorName,RES_25C,RES_50C,CDRAD_in
336.4 ACSR 30/7 ORIOLE,0.2708,0.2974,0.18525
";
const BUSES: &str = "\
name,v_nom
SURF69,69
TURTLE69,69
REEF69,69
WAVE69,69
";

fn grid(config: &AppConfig) -> GridAggregator {
    let data = load_grid_data_from_readers(
        LINES.as_bytes(),
        FLOWS.as_bytes(),
        CONDUCTORS.as_bytes(),
        BUSES.as_bytes(),
    )
    .expect("grid data");
    let evaluator = LineRatingEvaluator::new(config.rating_options()).expect("evaluator");
    GridAggregator::new(data, evaluator, config.site_conditions())
}

#[test]
fn reference_run_flows_through_to_grid_health() {
    let config: AppConfig = CONFIG.parse().expect("config");
    let grid = grid(&config);
    let weather = grid
        .site()
        .snapshot_at(25.0, 6.56, 12.0, "12 Jun")
        .expect("weather");

    let evaluation = grid.evaluate_grid(&weather);
    let statuses: Vec<_> = evaluation
        .results
        .iter()
        .map(|r| (r.line_id.as_str(), r.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("L3", LineStatus::Overload),
            ("L2", LineStatus::Critical),
            ("L1", LineStatus::Warning),
            ("L0", LineStatus::Ok),
        ]
    );
    for result in &evaluation.results {
        assert!((result.rating_amps - 1463.4547460252704).abs() < 1e-6);
        assert!((result.rating_mva - 174.89968025385673).abs() < 1e-6);
    }

    let health = &evaluation.health;
    assert_eq!(health.total_lines, 4);
    assert_eq!(health.lines_at_risk(), 2);
    assert_eq!(health.most_stressed_line.as_deref(), Some("L3"));
    let expected_avg = (100.0 + 150.0 + 170.0 + 180.0) / 4.0 / 174.89968025385673 * 100.0;
    assert!((health.avg_loading_pct - expected_avg).abs() < 1e-9);
}

#[test]
fn still_air_at_conductor_limit_overloads_every_line() {
    let config: AppConfig = CONFIG.parse().expect("config");
    let grid = grid(&config);
    let weather = grid
        .site()
        .snapshot_at(75.0, 0.0, 12.0, "12 Jun")
        .expect("weather");

    let health = grid.system_health(&weather);
    assert_eq!(health.overloaded_lines, 4);
    assert_eq!(health.max_loading_pct, f64::INFINITY);
}

#[test]
fn reports_serialize_infinite_loading_as_null() {
    let config: AppConfig = CONFIG.parse().expect("config");
    let grid = grid(&config);
    let weather = grid
        .site()
        .snapshot_at(75.0, 0.0, 12.0, "12 Jun")
        .expect("weather");
    let dir = tempdir().expect("tempdir");

    analyze_grid_with_options(&grid, &weather, None, None, Some(dir.path())).expect("reports");
    let raw = std::fs::read_to_string(dir.path().join("line_ratings.json")).expect("report");
    let report: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert!(report["data"][0]["loading_pct"].is_null());
    assert_eq!(report["data"][0]["status"], "OVERLOAD");

    let ratings: Vec<RatingResult> =
        serde_json::from_value(report["data"].clone()).expect("ratings read back");
    assert!(ratings.iter().all(|r| r.loading_pct == f64::INFINITY));
    let raw = std::fs::read_to_string(dir.path().join("system_health.json")).expect("report");
    let report: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let health: SystemHealth =
        serde_json::from_value(report["data"].clone()).expect("health read back");
    assert_eq!(health.max_loading_pct, f64::INFINITY);
    assert_eq!(health.most_stressed_loading_pct, Some(f64::INFINITY));
}

#[test]
fn duplicate_flow_rows_are_rejected() {
    let flows = "name,p0_nominal\nL0,100.0\nL0,50.0\n";
    let err = load_grid_data_from_readers(
        LINES.as_bytes(),
        flows.as_bytes(),
        CONDUCTORS.as_bytes(),
        BUSES.as_bytes(),
    )
    .unwrap_err();
    assert!(matches!(err, RatingError::InvalidData { .. }));
}

#[test]
fn missing_bus_voltage_fails_the_load() {
    let buses = "name,v_nom\nSURF69,69\n";
    let err = load_grid_data_from_readers(
        LINES.as_bytes(),
        FLOWS.as_bytes(),
        CONDUCTORS.as_bytes(),
        buses.as_bytes(),
    )
    .unwrap_err();
    assert!(matches!(err, RatingError::BusNotFound { .. }));
}

#[test]
fn sample_configuration_parses() {
    let config: AppConfig = include_str!("../configs/gridguard.toml")
        .parse()
        .expect("sample config");
    assert_eq!(config.scan.max_c, 50.0);
    assert_eq!(config.reports.directory, std::path::PathBuf::from("reports"));
}
