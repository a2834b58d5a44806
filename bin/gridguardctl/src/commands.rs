//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for operators evaluating GridGuard line ratings."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use clap::Args;
use gridguard_common::{init_tracing, AppConfig};
use gridguard_logging::{gg_info, gg_warn, log_system_event, LogContext, SystemEventOutcome};
use gridguard_rating::{
    aggregator::{validate_scan_range, GridAggregator},
    analyze_forecast, analyze_grid_with_options,
    forecast::forecast_points,
    io::{load_grid_data, load_observations},
    weather::{default_forecast, DEFAULT_AMBIENT_C, DEFAULT_WIND_FTS, WORST_CASE_DATE},
    LineRatingEvaluator, LineStatus,
};
use gridguard_thermal::WeatherSnapshot;

use crate::{render, GlobalOptions};

const SERVICE_NAME: &str = "gridguardctl";
const CONFIG_CANDIDATES: [&str; 2] = ["configs/gridguard.toml", "gridguard.toml"];

/// Weather for a single rating, at the configured site.
#[derive(Debug, Args)]
pub struct WeatherArgs {
    /// Ambient temperature (°C).
    #[arg(long, default_value_t = DEFAULT_AMBIENT_C, allow_negative_numbers = true)]
    pub ambient: f64,
    /// Wind speed perpendicular to the conductor (ft/s).
    #[arg(long, default_value_t = DEFAULT_WIND_FTS)]
    pub wind: f64,
    /// Solar hour of day (0-24).
    #[arg(long, default_value_t = 12.0)]
    pub hour: f64,
    /// Calendar day, e.g. "21 Jun".
    #[arg(long, default_value = WORST_CASE_DATE)]
    pub date: String,
}

#[derive(Debug, Args)]
pub struct LineArgs {
    /// Line identifier, e.g. L0.
    pub id: String,
    #[command(flatten)]
    pub weather: WeatherArgs,
}

#[derive(Debug, Args)]
pub struct GridArgs {
    #[command(flatten)]
    pub weather: WeatherArgs,
    /// Only list CRITICAL and OVERLOAD lines.
    #[arg(long = "critical-only", action = clap::ArgAction::SetTrue)]
    pub critical_only: bool,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// First ambient temperature to test (°C); defaults to [scan] start_c.
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<f64>,
    /// Last ambient temperature to test (°C); defaults to [scan] max_c.
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,
    /// Wind speed held constant during the scan (ft/s); defaults to [scan] wind_fts.
    #[arg(long)]
    pub wind: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// JSON or YAML list of weather observations. Without it a default
    /// three-hourly forecast is generated.
    #[arg(long, value_name = "FILE")]
    pub scenario: Option<PathBuf>,
    /// Hours covered by the generated forecast.
    #[arg(long, default_value_t = 24)]
    pub hours: u32,
}

/// Loaded configuration and grid data shared by the subcommands.
pub struct Context {
    pub config: AppConfig,
    pub grid: GridAggregator,
    pub json: bool,
    pub report_dir: Option<PathBuf>,
    pub data_label: String,
}

impl Context {
    pub fn initialise(options: &GlobalOptions) -> Result<Self> {
        let config = load_config(options.config.as_deref())?;
        init_tracing(SERVICE_NAME, &config.logging)?;

        let paths = config.data.paths(options.data_dir.as_deref());
        let data_label = paths
            .lines
            .parent()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        let log_ctx = LogContext::new().with_grid(&data_label);
        let data = match load_grid_data(&paths) {
            Ok(data) => data,
            Err(err) => {
                log_system_event(
                    Some(&log_ctx),
                    "data.load",
                    &err.to_string(),
                    SystemEventOutcome::Fault,
                );
                return Err(err)
                    .with_context(|| format!("unable to load grid data from {data_label}"));
            }
        };
        log_system_event(
            Some(&log_ctx),
            "data.load",
            "grid data loaded",
            SystemEventOutcome::Success,
        );

        let evaluator = LineRatingEvaluator::new(config.rating_options())?;
        let grid = GridAggregator::new(data, evaluator, config.site_conditions());
        let report_dir = options
            .report_dir
            .clone()
            .or_else(|| options.export.then(|| config.reports.directory.clone()));

        Ok(Self {
            config,
            grid,
            json: options.json,
            report_dir,
            data_label,
        })
    }

    fn snapshot(&self, weather: &WeatherArgs) -> Result<WeatherSnapshot> {
        self.grid
            .site()
            .snapshot_at(weather.ambient, weather.wind, weather.hour, &weather.date)
            .context("invalid weather arguments")
    }
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return AppConfig::from_path(path.to_path_buf());
    }
    let env_set = std::env::var(AppConfig::ENV_CONFIG_PATH)
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);
    if env_set || CONFIG_CANDIDATES.iter().any(|c| Path::new(c).exists()) {
        AppConfig::load(&CONFIG_CANDIDATES)
    } else {
        Ok(AppConfig::default())
    }
}

pub fn line(ctx: &Context, args: LineArgs) -> Result<()> {
    let weather = ctx.snapshot(&args.weather)?;
    let result = ctx.grid.evaluate_line(&args.id, &weather)?;
    gg_info!(
        context = LogContext::new().with_grid(&ctx.data_label).with_line(&result.line_id),
        "line {} at {:.1}% ({})",
        result.line_id,
        result.loading_pct,
        result.status
    );
    if ctx.json {
        render::print_json(&result)
    } else {
        render::print_line(&result);
        Ok(())
    }
}

pub fn grid(ctx: &Context, args: GridArgs) -> Result<()> {
    let weather = ctx.snapshot(&args.weather)?;
    let mut evaluation = match &ctx.report_dir {
        Some(dir) => {
            analyze_grid_with_options(
                &ctx.grid,
                &weather,
                Some(ctx.data_label.clone()),
                None,
                Some(dir.as_path()),
            )?
            .evaluation
        }
        None => ctx.grid.evaluate_grid(&weather),
    };
    if args.critical_only {
        evaluation
            .results
            .retain(|r| matches!(r.status, LineStatus::Critical | LineStatus::Overload));
    }
    if evaluation.health.overloaded_lines > 0 {
        gg_warn!(
            context = LogContext::new().with_grid(&ctx.data_label),
            "{} line(s) overloaded",
            evaluation.health.overloaded_lines
        );
    }
    if ctx.json {
        render::print_json(&evaluation)
    } else {
        render::print_grid(&evaluation);
        Ok(())
    }
}

pub fn first_failure(ctx: &Context, args: ScanArgs) -> Result<()> {
    let scan = &ctx.config.scan;
    let start = args.start.unwrap_or(scan.start_c);
    let max = args.max.unwrap_or(scan.max_c);
    let wind = args.wind.unwrap_or(scan.wind_fts);
    if start > max {
        return Err(anyhow!("scan start {start} is above scan max {max}"));
    }
    validate_scan_range(start, max)?;
    let outcome = ctx.grid.find_first_failure_temperature(start, max, wind)?;
    if ctx.json {
        render::print_json(&outcome)
    } else {
        render::print_scan(&outcome, wind);
        Ok(())
    }
}

pub fn forecast(ctx: &Context, args: ForecastArgs) -> Result<()> {
    let (observations, label) = match &args.scenario {
        Some(path) => (
            load_observations(path)
                .with_context(|| format!("unable to read scenario {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (default_forecast(current_hour(), args.hours), "default".to_owned()),
    };
    if observations.is_empty() {
        return Err(anyhow!("forecast {label} contains no observations"));
    }

    let points = forecast_points(ctx.grid.site(), &observations)?;
    let steps = ctx.grid.evaluate_forecast(&points);
    let alerts = analyze_forecast(&steps, &ctx.config.alert_thresholds()?);
    gg_info!(
        context = LogContext::new().with_grid(&ctx.data_label).with_scenario(&label),
        "{}",
        alerts.summary
    );

    if let Some(dir) = &ctx.report_dir {
        analyze_grid_with_options(
            &ctx.grid,
            &points[0].weather,
            Some(ctx.data_label.clone()),
            Some(alerts.clone()),
            Some(dir.as_path()),
        )?;
    }

    if ctx.json {
        render::print_json(&alerts)
    } else {
        render::print_alerts(&alerts);
        Ok(())
    }
}

fn current_hour() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
