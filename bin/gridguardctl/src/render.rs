//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for operators evaluating GridGuard line ratings."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use anyhow::{Context as _, Result};
use gridguard_rating::{
    aggregator::GridEvaluation, forecast::ForecastAlerts, FailureScan, RatingResult,
};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialise output")?;
    println!("{rendered}");
    Ok(())
}

fn loading(result: &RatingResult) -> String {
    if result.has_finite_loading() {
        format!("{:.1}%", result.loading_pct)
    } else {
        "inf".to_owned()
    }
}

pub fn print_line(result: &RatingResult) {
    println!("Line {} ({})", result.line_id, result.branch_name);
    println!("  Buses:     {} -> {}", result.bus0, result.bus1);
    println!("  Conductor: {}", result.conductor);
    println!("  Voltage:   {:.1} kV", result.voltage_kv);
    println!(
        "  Rating:    {:.1} A / {:.2} MVA",
        result.rating_amps, result.rating_mva
    );
    println!("  Flow:      {:.2} MVA", result.flow_mva);
    println!("  Loading:   {} [{}]", loading(result), result.status);
}

pub fn print_grid(evaluation: &GridEvaluation) {
    println!(
        "{:<8} {:<32} {:>10} {:>10} {:>9}  {}",
        "LINE", "BRANCH", "RATING", "FLOW", "LOADING", "STATUS"
    );
    for result in &evaluation.results {
        println!(
            "{:<8} {:<32} {:>10.2} {:>10.2} {:>9}  {}",
            result.line_id,
            result.branch_name,
            result.rating_mva,
            result.flow_mva,
            loading(result),
            result.status
        );
    }

    let health = &evaluation.health;
    println!("\n=== System health ===");
    println!("Lines rated:   {}", health.total_lines);
    println!(
        "Overload: {}  Critical: {}  Warning: {}  Normal: {}",
        health.overloaded_lines, health.critical_lines, health.warning_lines, health.normal_lines
    );
    println!(
        "Loading:       avg {:.1}%  max {:.1}%",
        health.avg_loading_pct, health.max_loading_pct
    );
    match (&health.most_stressed_line, health.most_stressed_loading_pct) {
        (Some(line), Some(pct)) if pct.is_finite() => {
            println!("Most stressed: {line} at {pct:.1}%")
        }
        (Some(line), _) => println!("Most stressed: {line} (no thermal capacity)"),
        _ => println!("Most stressed: none"),
    }
}

pub fn print_scan(scan: &FailureScan, wind_fts: f64) {
    if scan.is_failure() {
        println!(
            "First failure at {} °C (wind {wind_fts} ft/s): {}",
            scan.temperature_c,
            scan.line_label()
        );
    } else {
        println!(
            "No failure up to {} °C (wind {wind_fts} ft/s)",
            scan.temperature_c
        );
    }
}

pub fn print_alerts(alerts: &ForecastAlerts) {
    println!("{}", alerts.summary);
    if let Some(peak) = alerts.peak_stress_time {
        println!(
            "Peak loading {:.1}% at {}",
            alerts.peak_loading_pct,
            peak.format("%Y-%m-%d %H:%M")
        );
    }
    for alert in alerts.prioritized() {
        println!(
            "[{}] {} {} {:.1}% ({:.2}/{:.2} MVA, {:.0} kV) at {}",
            alert.severity,
            alert.line_id,
            alert.branch_name,
            alert.loading_pct,
            alert.flow_mva,
            alert.rating_mva,
            alert.voltage_kv,
            alert.time_str
        );
    }
}
