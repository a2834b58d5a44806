//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the GridGuard runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the GridGuard workspace: configuration loading and
//! tracing setup consumed by the binaries.

pub mod config;
pub mod logging;

pub use config::{
    AlertConfig, AppConfig, ConductorDefaultsConfig, DataConfig, LoadedAppConfig, LoggingConfig,
    ReportsConfig, ScanConfig, SiteConfig, StatusConfig,
};
pub use logging::{init_tracing, LogFormat};
