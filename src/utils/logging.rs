//! Structured JSON logging to stdout and a daily rolling file.

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,daftar_server=debug";
const LOG_FILE_PREFIX: &str = "daftar-server.log";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the filter, `LOG_DIR` (default `logs`) picks the
/// directory for `daftar-server.log.YYYY-MM-DD`. Keep the returned guard
/// alive until shutdown or buffered file lines are lost.
pub fn init_logging() -> WorkerGuard {
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, LOG_FILE_PREFIX));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_current_span(true),
        )
        .with(
            fmt::layer()
                .json()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_current_span(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init();

    // A second init (tests, embedded use) keeps the first subscriber.
    if let Err(err) = result {
        eprintln!("tracing subscriber not installed: {}", err);
    }

    guard
}
