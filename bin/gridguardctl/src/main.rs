//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for operators evaluating GridGuard line ratings."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;
mod render;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "GridGuard dynamic line rating utility",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalOptions {
    /// Configuration file (overrides GRIDGUARD_CONFIG and the default locations).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding lines.csv, line_flows_nominal.csv, conductor_library.csv and buses.csv.
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,
    /// Emit machine-readable JSON on stdout.
    #[arg(long, action = clap::ArgAction::SetTrue, global = true)]
    pub json: bool,
    /// Write JSON reports to the [reports] directory (grid and forecast commands).
    #[arg(long, action = clap::ArgAction::SetTrue, global = true)]
    pub export: bool,
    /// Write JSON reports to this directory instead; implies --export.
    #[arg(long = "report-dir", value_name = "DIR", global = true)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rate a single line.
    Line(commands::LineArgs),
    /// Rate every line and summarize grid health.
    Grid(commands::GridArgs),
    /// Find the lowest ambient temperature that overloads a line.
    #[command(name = "first-failure")]
    FirstFailure(commands::ScanArgs),
    /// Evaluate a weather forecast and raise alerts.
    Forecast(commands::ForecastArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = commands::Context::initialise(&cli.global)?;
    match cli.command {
        Commands::Line(args) => commands::line(&ctx, args),
        Commands::Grid(args) => commands::grid(&ctx, args),
        Commands::FirstFailure(args) => commands::first_failure(&ctx, args),
        Commands::Forecast(args) => commands::forecast(&ctx, args),
    }
}
