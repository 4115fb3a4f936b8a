use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Rotated files kept per process.
const MAX_LOG_FILES: usize = 5;

/// Install the global subscriber: stdout, plus `<log_dir>/<name>.*.log` when
/// a directory is configured.
///
/// `RUST_LOG` wins over the default level picked from `debug`. The returned
/// guard flushes the file writer on drop and must live as long as `main`.
pub fn init_tracing(
    name: &str,
    debug: bool,
    json: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<Option<WorkerGuard>> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},sqlx=warn")));

    let stdout_layer = if json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(dir, name)?);
            let layer = fmt::layer().with_ansi(false).with_target(true).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }

    Ok(guard)
}

/// Daily rotated `<dir>/<name>.<date>.log`, keeping the last few files.
pub fn file_appender(dir: &Path, name: &str) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("Cannot open log file in {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_appender_creates_directory_and_file() {
        let dir = std::env::temp_dir()
            .join(format!("candlestick-logs-{}", uuid::Uuid::new_v4().simple()))
            .join("nested");

        let mut appender = file_appender(&dir, "api").unwrap();
        appender.write_all(b"started\n").unwrap();
        appender.flush().unwrap();

        let files: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("api."));
        assert!(files[0].ends_with(".log"));

        std::fs::remove_dir_all(dir.parent().unwrap()).ok();
    }
}
