//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::{
    collections::HashMap,
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, Trim};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info};

use crate::{
    errors::{RatingError, Result},
    model::{BusRecord, ConductorLibrary, ConductorProperties, GridData, LineLibrary, LineRecord},
    weather::WeatherObservation,
};

pub const LINES_FILE: &str = "lines.csv";
pub const FLOWS_FILE: &str = "line_flows_nominal.csv";
pub const CONDUCTORS_FILE: &str = "conductor_library.csv";
pub const BUSES_FILE: &str = "buses.csv";

/// Locations of the four reference tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub lines: PathBuf,
    pub flows: PathBuf,
    pub conductors: PathBuf,
    pub buses: PathBuf,
}

impl DataPaths {
    /// Default file names under `directory`.
    pub fn in_dir(directory: impl AsRef<Path>) -> Self {
        let directory = directory.as_ref();
        Self {
            lines: directory.join(LINES_FILE),
            flows: directory.join(FLOWS_FILE),
            conductors: directory.join(CONDUCTORS_FILE),
            buses: directory.join(BUSES_FILE),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LineRow {
    name: String,
    bus0: String,
    bus1: String,
    conductor: String,
    #[serde(rename = "MOT")]
    max_temp_c: f64,
    #[serde(default)]
    branch_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlowRow {
    name: String,
    #[serde(default)]
    p0_nominal: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConductorRow {
    #[serde(rename = "ConductorName")]
    name: String,
    #[serde(rename = "RES_25C")]
    resistance_25c: f64,
    #[serde(rename = "RES_50C")]
    resistance_50c: f64,
    #[serde(rename = "CDRAD_in")]
    radius_in: f64,
}

#[derive(Debug, Deserialize)]
struct BusRow {
    name: String,
    v_nom: f64,
}

fn read_table<T: DeserializeOwned>(reader: impl Read, source: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    reader
        .deserialize::<T>()
        .map(|row| {
            row.map_err(|source_err| RatingError::Csv {
                path: source.to_path_buf(),
                source: source_err,
            })
        })
        .collect()
}

fn open_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = fs::File::open(path)?;
    read_table(file, path)
}

fn ensure_finite(table: &'static str, row: &str, field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RatingError::InvalidData {
            table,
            reason: format!("{field} of {row} is {value}"),
        })
    }
}

/// Load and join the reference tables from disk.
pub fn load_grid_data(paths: &DataPaths) -> Result<GridData> {
    let data = assemble(
        open_table(&paths.lines)?,
        open_table(&paths.flows)?,
        open_table(&paths.conductors)?,
        open_table(&paths.buses)?,
    )?;
    info!(
        lines = data.lines.len(),
        conductors = data.conductors.len(),
        "loaded grid data"
    );
    Ok(data)
}

/// Same join as [`load_grid_data`] over in-memory tables.
pub fn load_grid_data_from_readers(
    lines: impl Read,
    flows: impl Read,
    conductors: impl Read,
    buses: impl Read,
) -> Result<GridData> {
    assemble(
        read_table(lines, Path::new(LINES_FILE))?,
        read_table(flows, Path::new(FLOWS_FILE))?,
        read_table(conductors, Path::new(CONDUCTORS_FILE))?,
        read_table(buses, Path::new(BUSES_FILE))?,
    )
}

fn assemble(
    line_rows: Vec<LineRow>,
    flow_rows: Vec<FlowRow>,
    conductor_rows: Vec<ConductorRow>,
    bus_rows: Vec<BusRow>,
) -> Result<GridData> {
    let mut buses = HashMap::with_capacity(bus_rows.len());
    for row in bus_rows {
        let bus = BusRecord {
            nominal_voltage_kv: ensure_finite("buses", &row.name, "v_nom", row.v_nom)?,
            name: row.name,
        };
        buses.insert(bus.name.clone(), bus);
    }

    let mut flows = HashMap::with_capacity(flow_rows.len());
    for row in flow_rows {
        let flow = match row.p0_nominal {
            Some(value) => ensure_finite("line flows", &row.name, "p0_nominal", value)?,
            None => 0.0,
        };
        if flows.insert(row.name.clone(), flow).is_some() {
            return Err(RatingError::InvalidData {
                table: "line flows",
                reason: format!("duplicate flow for line {}", row.name),
            });
        }
    }

    let conductors = conductor_rows
        .into_iter()
        .map(|row| {
            Ok(ConductorProperties {
                resistance_25c_ohm_per_mile: ensure_finite(
                    "conductor library",
                    &row.name,
                    "RES_25C",
                    row.resistance_25c,
                )?,
                resistance_50c_ohm_per_mile: ensure_finite(
                    "conductor library",
                    &row.name,
                    "RES_50C",
                    row.resistance_50c,
                )?,
                radius_in: ensure_finite("conductor library", &row.name, "CDRAD_in", row.radius_in)?,
                name: row.name,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let lines = line_rows
        .into_iter()
        .map(|row| {
            let bus = buses.get(&row.bus0).ok_or_else(|| RatingError::BusNotFound {
                line: row.name.clone(),
                bus: row.bus0.clone(),
            })?;
            let flow_mva = flows.get(&row.name).copied().unwrap_or_else(|| {
                debug!(line = %row.name, "no nominal flow; assuming 0 MVA");
                0.0
            });
            Ok(LineRecord {
                max_temp_c: ensure_finite("lines", &row.name, "MOT", row.max_temp_c)?,
                branch_name: row.branch_name.unwrap_or_else(|| row.name.clone()),
                voltage_kv: bus.nominal_voltage_kv,
                id: row.name,
                bus0: row.bus0,
                bus1: row.bus1,
                conductor: row.conductor,
                flow_mva,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GridData::new(
        LineLibrary::new(lines)?,
        ConductorLibrary::new(conductors)?,
    ))
}

/// Forecast scenario: a JSON or YAML list of observations.
pub fn load_observations(path: impl AsRef<Path>) -> Result<Vec<WeatherObservation>> {
    let data = fs::read_to_string(path)?;
    let trimmed = data.trim_start();
    let observations = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        serde_json::from_str(&data)?
    } else {
        serde_yaml::from_str(&data)?
    };
    Ok(observations)
}
