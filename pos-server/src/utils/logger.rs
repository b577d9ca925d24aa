//! Logging Infrastructure
//!
//! Structured logging for development (pretty, stdout) and production
//! (optional JSON, daily rolling file).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter when neither `RUST_LOG` nor a level is given
const DEFAULT_FILTER: &str = "pos_server=info,tower_http=info";

fn build_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) => EnvFilter::new(format!(
            "pos_server={level},shared={level},tower_http=info,sqlx=warn"
        )),
        None => EnvFilter::new(DEFAULT_FILTER),
    })
}

/// Initialize the logger with optional JSON formatting and file output.
///
/// When `log_dir` exists, a daily rolling file `pos-server.YYYY-MM-DD` is
/// written in addition to stdout. The returned guard must be kept alive
/// for buffered file output to be flushed.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: bool,
    log_dir: Option<&str>,
) -> Option<WorkerGuard> {
    let filter = build_filter(log_level);

    let (file_writer, guard) = match log_dir.map(Path::new) {
        Some(dir) if dir.is_dir() => {
            let appender = tracing_appender::rolling::daily(dir, "pos-server");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        Some(dir) => {
            eprintln!("LOG_DIR {} does not exist, logging to stdout only", dir.display());
            (None, None)
        }
        None => (None, None),
    };

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
    });

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let result = if json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(false)
                    .with_target(false),
            )
            .try_init()
    };

    if result.is_err() {
        // A global subscriber is already set (tests, embedding)
        return None;
    }

    guard
}
