use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "pdp-backend.log";

/// Keeps the file writer flushing; drop it only on shutdown.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Directory for the daily log file, when `ENABLE_FILE_LOGS` is `true` or `1`.
pub fn file_log_dir() -> Option<PathBuf> {
    let enabled = std::env::var("ENABLE_FILE_LOGS")
        .map(|v| matches!(v.trim(), "true" | "1"))
        .unwrap_or(false);
    enabled.then(|| {
        std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./logs"))
    })
}

/// Installs the global subscriber. Console output goes to stderr because stdout
/// carries command results.
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let (file_layer, guard) = match file_log_dir().map(open_file_writer) {
        Some(Ok((writer, guard))) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(FileLogGuard { _guard: guard }))
        }
        Some(Err(err)) => {
            eprintln!("file logging disabled: {err}");
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    guard
}

fn open_file_writer(
    dir: PathBuf,
) -> std::io::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}
