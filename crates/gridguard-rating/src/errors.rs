//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use gridguard_thermal::ThermalError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RatingError>;

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("line {0} not found in line library")]
    LineNotFound(String),
    #[error("conductor type {conductor} for line {line} not found in conductor library")]
    ConductorNotFound { line: String, conductor: String },
    #[error("bus {bus} referenced by line {line} not found")]
    BusNotFound { line: String, bus: String },
    #[error("duplicate line identifier {0}")]
    DuplicateLine(String),
    #[error("duplicate conductor type {0}")]
    DuplicateConductor(String),
    #[error("invalid conductor data for line {line}: {source}")]
    InvalidConductor {
        line: String,
        #[source]
        source: ThermalError,
    },
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ThermalError),
    #[error("invalid value in {table}: {reason}")]
    InvalidData { table: &'static str, reason: String },
    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),
    #[error("invalid temperature scan: {0}")]
    InvalidScan(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read table {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
    #[error("yaml serialization error: {0}")]
    YamlSerializationFailed(#[from] serde_yaml::Error),
}

impl RatingError {
    /// Lookup failures against the reference data.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RatingError::LineNotFound(_)
                | RatingError::ConductorNotFound { .. }
                | RatingError::BusNotFound { .. }
        )
    }
}
