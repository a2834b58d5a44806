//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Structured logging adapters and sinks."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#[doc(hidden)]
#[macro_export]
macro_rules! __gg_event {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx: &$crate::LogContext<'_> = &$ctx;
        $crate::tracing::event!(
            $level,
            grid = ctx.grid.unwrap_or(""),
            line = ctx.line.unwrap_or(""),
            scenario = ctx.scenario.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an informational log enriched with GridGuard context.
#[macro_export]
macro_rules! gg_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__gg_event!($crate::tracing::Level::INFO, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__gg_event!($crate::tracing::Level::INFO, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a debug log enriched with GridGuard context.
#[macro_export]
macro_rules! gg_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__gg_event!($crate::tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__gg_event!($crate::tracing::Level::DEBUG, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a warning enriched with GridGuard context.
#[macro_export]
macro_rules! gg_warn {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__gg_event!($crate::tracing::Level::WARN, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__gg_event!($crate::tracing::Level::WARN, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit an error log enriched with GridGuard context.
#[macro_export]
macro_rules! gg_error {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__gg_event!($crate::tracing::Level::ERROR, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__gg_event!($crate::tracing::Level::ERROR, $crate::LogContext::default(), $($arg)+)
    };
}
