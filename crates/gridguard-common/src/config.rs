//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the GridGuard runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use gridguard_rating::{
    aggregator::validate_scan_range,
    io::{DataPaths, BUSES_FILE, CONDUCTORS_FILE, FLOWS_FILE, LINES_FILE},
    weather::{DEFAULT_LATITUDE_DEG, DEFAULT_WIND_FTS},
    AlertThresholds, ConductorDefaults, RatingOptions, SiteConditions, StatusThresholds,
};
use gridguard_thermal::{
    params::{DEFAULT_ABSORPTIVITY, DEFAULT_ELEVATION_FT, DEFAULT_EMISSIVITY},
    Atmosphere, Direction,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

fn default_data_directory() -> PathBuf {
    PathBuf::from("data")
}

fn default_lines_file() -> String {
    LINES_FILE.to_owned()
}

fn default_flows_file() -> String {
    FLOWS_FILE.to_owned()
}

fn default_conductors_file() -> String {
    CONDUCTORS_FILE.to_owned()
}

fn default_buses_file() -> String {
    BUSES_FILE.to_owned()
}

fn default_latitude() -> f64 {
    DEFAULT_LATITUDE_DEG
}

fn default_elevation() -> f64 {
    DEFAULT_ELEVATION_FT
}

fn default_emissivity() -> f64 {
    DEFAULT_EMISSIVITY
}

fn default_absorptivity() -> f64 {
    DEFAULT_ABSORPTIVITY
}

fn default_warning_pct() -> f64 {
    gridguard_rating::evaluator::DEFAULT_WARNING_PCT
}

fn default_critical_pct() -> f64 {
    gridguard_rating::evaluator::DEFAULT_CRITICAL_PCT
}

fn default_scan_start() -> f64 {
    20.0
}

fn default_scan_max() -> f64 {
    50.0
}

fn default_scan_wind() -> f64 {
    DEFAULT_WIND_FTS
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_reports_directory() -> PathBuf {
    PathBuf::from("reports")
}

/// Primary configuration object for GridGuard tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub conductor_defaults: ConductorDefaultsConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "GRIDGUARD_CONFIG";

    /// Load configuration from disk, respecting the `GRIDGUARD_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    pub fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.site.validate()?;
        self.conductor_defaults.validate()?;
        self.status
            .thresholds()
            .validate()
            .context("invalid [status] thresholds")?;
        self.alerts.thresholds().context("invalid [alerts] thresholds")?;
        self.scan.validate()?;
        Ok(())
    }

    pub fn site_conditions(&self) -> SiteConditions {
        self.site.conditions()
    }

    pub fn rating_options(&self) -> RatingOptions {
        RatingOptions {
            thresholds: self.status.thresholds(),
            conductor: self.conductor_defaults.defaults(),
        }
    }

    pub fn alert_thresholds(&self) -> Result<AlertThresholds> {
        Ok(self.alerts.thresholds()?)
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_lines_file")]
    pub lines_file: String,
    #[serde(default = "default_flows_file")]
    pub flows_file: String,
    #[serde(default = "default_conductors_file")]
    pub conductors_file: String,
    #[serde(default = "default_buses_file")]
    pub buses_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: default_data_directory(),
            lines_file: default_lines_file(),
            flows_file: default_flows_file(),
            conductors_file: default_conductors_file(),
            buses_file: default_buses_file(),
        }
    }
}

impl DataConfig {
    /// Table locations, optionally rooted somewhere other than `directory`.
    pub fn paths(&self, directory_override: Option<&Path>) -> DataPaths {
        let directory = directory_override.unwrap_or(self.directory.as_path());
        DataPaths {
            lines: directory.join(&self.lines_file),
            flows: directory.join(&self.flows_file),
            conductors: directory.join(&self.conductors_file),
            buses: directory.join(&self.buses_file),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_latitude")]
    pub latitude_deg: f64,
    #[serde(default = "default_elevation")]
    pub elevation_ft: f64,
    #[serde(default)]
    pub atmosphere: Atmosphere,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            latitude_deg: default_latitude(),
            elevation_ft: default_elevation(),
            atmosphere: Atmosphere::default(),
        }
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(anyhow!(
                "site latitude {} is outside [-90, 90]",
                self.latitude_deg
            ));
        }
        if !self.elevation_ft.is_finite() {
            return Err(anyhow!("site elevation must be finite"));
        }
        Ok(())
    }

    pub fn conditions(&self) -> SiteConditions {
        SiteConditions {
            latitude_deg: self.latitude_deg,
            elevation_ft: self.elevation_ft,
            atmosphere: self.atmosphere,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConductorDefaultsConfig {
    #[serde(default = "default_emissivity")]
    pub emissivity: f64,
    #[serde(default = "default_absorptivity")]
    pub absorptivity: f64,
    #[serde(default)]
    pub direction: Direction,
}

impl Default for ConductorDefaultsConfig {
    fn default() -> Self {
        Self {
            emissivity: default_emissivity(),
            absorptivity: default_absorptivity(),
            direction: Direction::default(),
        }
    }
}

impl ConductorDefaultsConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("emissivity", self.emissivity),
            ("absorptivity", self.absorptivity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!(
                    "conductor_defaults.{} {} is outside [0, 1]",
                    name,
                    value
                ));
            }
        }
        Ok(())
    }

    pub fn defaults(&self) -> ConductorDefaults {
        ConductorDefaults {
            emissivity: self.emissivity,
            absorptivity: self.absorptivity,
            direction: self.direction,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_warning_pct")]
    pub warning_pct: f64,
    #[serde(default = "default_critical_pct")]
    pub critical_pct: f64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            warning_pct: default_warning_pct(),
            critical_pct: default_critical_pct(),
        }
    }
}

impl StatusConfig {
    pub fn thresholds(&self) -> StatusThresholds {
        StatusThresholds {
            warning_pct: self.warning_pct,
            critical_pct: self.critical_pct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_warning_pct")]
    pub warning_pct: f64,
    #[serde(default = "default_critical_pct")]
    pub critical_pct: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            warning_pct: default_warning_pct(),
            critical_pct: default_critical_pct(),
        }
    }
}

impl AlertConfig {
    pub fn thresholds(&self) -> gridguard_rating::Result<AlertThresholds> {
        AlertThresholds::new(self.warning_pct, self.critical_pct)
    }
}

/// Ambient temperature range for the first-failure scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_scan_start")]
    pub start_c: f64,
    #[serde(default = "default_scan_max")]
    pub max_c: f64,
    #[serde(default = "default_scan_wind")]
    pub wind_fts: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_c: default_scan_start(),
            max_c: default_scan_max(),
            wind_fts: default_scan_wind(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.start_c.is_finite() && self.max_c.is_finite()) || self.start_c > self.max_c {
            return Err(anyhow!(
                "scan range {}..={} is empty or not finite",
                self.start_c,
                self.max_c
            ));
        }
        validate_scan_range(self.start_c, self.max_c)?;
        if !(self.wind_fts.is_finite() && self.wind_fts >= 0.0) {
            return Err(anyhow!("scan wind speed must be a non-negative number"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_reports_directory")]
    pub directory: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            directory: default_reports_directory(),
        }
    }
}
