//! Tracing subscriber setup for the platform.
//!
//! One call wires the whole stack: an `EnvFilter` for level control, a
//! console layer for operators, and a daily-rolling NDJSON file layer for
//! ingestion.

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. File output
/// rotates daily as `paygrid.log.YYYY-MM-DD` under `log_dir`. Uses
/// `try_init`, so repeated calls (as happens across tests) are harmless.
pub fn init_logging<P: AsRef<Path>>(log_dir: P, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "paygrid.log");
    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
