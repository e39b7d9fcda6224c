use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Keeps the file writer alive for the run. Dropping it flushes pending log lines.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initializes console logging, plus a daily-rolling JSON log file when `log_dir` is set.
///
/// Call once per run and hold the returned guard until exit. A second call
/// (e.g. from tests) leaves the existing subscriber in place.
pub fn init_logging(log_dir: Option<&Path>) -> LoggingGuard {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wedding_crawler=info"))
    };

    match log_dir {
        Some(dir) => {
            if let Err(e) = fs::create_dir_all(dir) {
                eprintln!("could not create log directory {}: {}", dir.display(), e);
            }
            let file_appender = tracing_appender::rolling::daily(dir, "crawler.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().json().with_writer(writer);

            let _ = tracing_subscriber::registry()
                .with(filter())
                .with(file_layer)
                .with(fmt::layer().with_writer(std::io::stdout))
                .try_init();

            LoggingGuard {
                _file_guard: Some(guard),
            }
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter())
                .with(fmt::layer().with_writer(std::io::stdout))
                .try_init();

            LoggingGuard { _file_guard: None }
        }
    }
}
