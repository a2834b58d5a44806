//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Structured logging adapters and sinks."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Context-carrying logging macros for GridGuard tools.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

#[doc(hidden)]
pub use tracing;

/// Stderr-only subscriber at `info` and above, for tests and small tools that
/// do not load an `AppConfig`.
pub fn init() {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let _ = Registry::default()
        .with(filter)
        .with(subscriber_fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Fields attached to every `gg_*!` event. Unset fields are logged as empty strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogContext<'a> {
    /// Grid or data set the event refers to.
    pub grid: Option<&'a str>,
    /// Transmission line identifier.
    pub line: Option<&'a str>,
    /// Weather scenario or forecast file.
    pub scenario: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Context with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Data set label, usually the data directory.
    pub fn with_grid(mut self, grid: &'a str) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Line being rated.
    pub fn with_line(mut self, line: &'a str) -> Self {
        self.line = Some(line);
        self
    }

    /// Forecast scenario label.
    pub fn with_scenario(mut self, scenario: &'a str) -> Self {
        self.scenario = Some(scenario);
        self
    }
}

/// Result of a data load or reload, as reported by [`log_system_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// Logged at `info`.
    Success,
    /// Logged at `error`.
    Fault,
}

impl SystemEventOutcome {
    fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Fault => "fault",
        }
    }
}

/// Lifecycle event such as `data.load`, tagged with the outcome and context fields.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let default = LogContext::default();
    let ctx = context.unwrap_or(&default);
    match outcome {
        SystemEventOutcome::Success => tracing::info!(
            event,
            outcome = outcome.label(),
            grid = ctx.grid.unwrap_or(""),
            line = ctx.line.unwrap_or(""),
            scenario = ctx.scenario.unwrap_or(""),
            message = %message
        ),
        SystemEventOutcome::Fault => tracing::error!(
            event,
            outcome = outcome.label(),
            grid = ctx.grid.unwrap_or(""),
            line = ctx.line.unwrap_or(""),
            scenario = ctx.scenario.unwrap_or(""),
            message = %message
        ),
    }
}
