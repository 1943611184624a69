//! Logging infrastructure
//!
//! - [`init_tracing`] installs the diagnostic `tracing` subscriber: stderr
//!   output filtered by verbosity, plus an optional daily rolling log file.
//! - [`JsonlInvocationLogger`] implements the
//!   [`InvocationLogger`](advisor_application::InvocationLogger) port with one
//!   JSON line per tool invocation or estimate.

mod invocation_log;

pub use invocation_log::JsonlInvocationLogger;

use crate::config::FileLoggingConfig;
use advisor_application::{InvocationLogger, NoInvocationLogger};
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive for a `-v` count
pub fn verbosity_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Explicit directives win; invalid ones fall back to the verbosity level
pub fn build_filter(config: &FileLoggingConfig) -> EnvFilter {
    let fallback = || EnvFilter::new(verbosity_directive(config.verbosity));
    match config.filter.as_deref() {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("Ignoring invalid log filter {directives:?}: {e}");
            fallback()
        }),
        None => fallback(),
    }
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when a log directory is configured; keep
/// it alive for the life of the process. Does nothing if the host already
/// installed a subscriber.
pub fn init_tracing(config: &FileLoggingConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();

    match installed {
        Ok(()) => guard,
        Err(e) => {
            debug!(error = %e, "Tracing subscriber already installed");
            None
        }
    }
}

/// The configured invocation log, or a no-op logger
pub fn invocation_logger(config: &FileLoggingConfig) -> Arc<dyn InvocationLogger> {
    match &config.invocation_log {
        Some(path) => match JsonlInvocationLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => {
                warn!(path = %path.display(), "Invocation log disabled");
                Arc::new(NoInvocationLogger)
            }
        },
        None => Arc::new(NoInvocationLogger),
    }
}
