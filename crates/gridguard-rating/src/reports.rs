//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::{fs, path::Path};

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{errors::Result, RatingSummary};

pub const LINE_RATINGS_FILE: &str = "line_ratings.json";
pub const SYSTEM_HEALTH_FILE: &str = "system_health.json";
pub const FORECAST_ALERTS_FILE: &str = "forecast_alerts.json";

#[derive(Debug)]
pub struct ReportExporter<'a> {
    summary: &'a RatingSummary,
}

impl<'a> ReportExporter<'a> {
    pub fn new(summary: &'a RatingSummary) -> Self {
        Self { summary }
    }

    pub fn export_all(&self, output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let timestamp = self.summary.timestamp.to_rfc3339();
        let source = self.summary.data_source.clone();

        let ratings = ReportEnvelope::new(
            &timestamp,
            source.clone(),
            line_ratings_schema(),
            &self.summary.evaluation.results,
        );
        let health = ReportEnvelope::new(
            &timestamp,
            source.clone(),
            system_health_schema(),
            &self.summary.evaluation.health,
        );
        write_json(output_dir.join(LINE_RATINGS_FILE), &ratings)?;
        write_json(output_dir.join(SYSTEM_HEALTH_FILE), &health)?;

        if let Some(alerts) = &self.summary.alerts {
            let report = ReportEnvelope::new(&timestamp, source, forecast_alerts_schema(), alerts);
            write_json(output_dir.join(FORECAST_ALERTS_FILE), &report)?;
        }

        info!("Reports exported to {}", output_dir.display());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    timestamp: &'a str,
    data_source: Option<String>,
    schema: serde_json::Value,
    data: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    fn new(
        timestamp: &'a str,
        data_source: Option<String>,
        schema: serde_json::Value,
        data: &'a T,
    ) -> Self {
        Self {
            timestamp,
            data_source,
            schema,
            data,
        }
    }
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn rating_result_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "line_id": {"type": "string"},
            "branch_name": {"type": "string"},
            "rating_amps": {"type": "number", "minimum": 0},
            "rating_mva": {"type": "number", "minimum": 0},
            "flow_mva": {"type": "number"},
            "loading_pct": {"type": ["number", "null"]},
            "voltage_kv": {"type": "number"},
            "conductor": {"type": "string"},
            "status": {"enum": ["OK", "WARNING", "CRITICAL", "OVERLOAD"]},
            "bus0": {"type": "string"},
            "bus1": {"type": "string"}
        },
        "required": ["line_id", "rating_amps", "rating_mva", "flow_mva", "status"]
    })
}

fn line_ratings_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "LineRatingsReport",
        "type": "array",
        "items": rating_result_schema()
    })
}

fn system_health_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "SystemHealthReport",
        "type": "object",
        "properties": {
            "total_lines": {"type": "integer", "minimum": 0},
            "overloaded_lines": {"type": "integer", "minimum": 0},
            "critical_lines": {"type": "integer", "minimum": 0},
            "warning_lines": {"type": "integer", "minimum": 0},
            "normal_lines": {"type": "integer", "minimum": 0},
            "avg_loading_pct": {"type": ["number", "null"]},
            "max_loading_pct": {"type": ["number", "null"]},
            "most_stressed_line": {"type": ["string", "null"]},
            "most_stressed_loading_pct": {"type": ["number", "null"]},
            "timestamp": {"type": "string", "format": "date-time"}
        },
        "required": ["total_lines", "overloaded_lines", "critical_lines", "timestamp"]
    })
}

fn forecast_alerts_schema() -> serde_json::Value {
    let alert = json!({
        "type": "object",
        "properties": {
            "severity": {"enum": ["WARNING", "CRITICAL"]},
            "line_id": {"type": "string"},
            "branch_name": {"type": "string"},
            "loading_pct": {"type": ["number", "null"]},
            "timestamp": {"type": "string"},
            "time_str": {"type": "string"},
            "rating_mva": {"type": "number"},
            "flow_mva": {"type": "number"},
            "voltage_kv": {"type": "number"}
        },
        "required": ["severity", "line_id", "loading_pct", "timestamp"]
    });
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "ForecastAlertsReport",
        "type": "object",
        "properties": {
            "critical": {"type": "array", "items": alert.clone()},
            "warning": {"type": "array", "items": alert},
            "peak_stress_time": {"type": ["string", "null"]},
            "peak_loading_pct": {"type": ["number", "null"]},
            "summary": {"type": "string"},
            "alert_count": {"type": "integer", "minimum": 0}
        },
        "required": ["critical", "warning", "summary", "alert_count"]
    })
}
