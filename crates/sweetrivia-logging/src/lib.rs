//! # sweetrivia-logging
//!
//! Logging for the sweetrivia authoring tool.
//!
//! ## Key Types
//!
//! - [`Logger`] - Console and file output of authoring events
//! - [`LogEvent`] - Log event types
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//!
//! [`init_tracing`] sets up the `tracing` subscriber used by the library
//! crates; [`init_tracing_with_file`] additionally writes a daily log file.

mod events;

pub use events::{LogEvent, LogFormat, Logger};

use std::path::{Path, PathBuf};

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Prefix of the daily rolling log files
const LOG_FILE_PREFIX: &str = "sweetrivia.log";

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer(format))
        .init();
}

/// Initialize tracing with an extra JSON log file rolled daily in `dir`.
///
/// Keep the returned guard alive for the life of the process, dropping it
/// flushes the file writer.
pub fn init_tracing_with_file(level: &str, format: LogFormat, dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer(format))
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    guard
}

/// Default directory for log files
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("sweetrivia").join("logs"))
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn console_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}
