//! Logging configuration using the tracing ecosystem.
//!
//! Logs go to a daily-rotated file so stdout only carries command output.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "ytrack=info,warn";

/// Log level used when `--debug` is given and RUST_LOG is not set.
const DEBUG_LOG_FILTER: &str = "ytrack=debug,warn";

/// Initialize the logging system.
///
/// Sets up tracing with:
/// - Daily rotating file appender in the user's local data directory
/// - Log level configuration via `RUST_LOG` environment variable
///
/// Logs are stored under `<local data dir>/ytrack/logs/`.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created, or
/// the tracing subscriber cannot be set.
pub fn init(debug: bool) -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "ytrack.log");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ytrack starting");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

/// The filter used when RUST_LOG is not set.
pub(crate) fn default_filter(debug: bool) -> &'static str {
    if debug {
        DEBUG_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Get the log directory path.
fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("ytrack").join("logs"))
}

/// Get the path where logs are stored.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_has_expected_structure() {
        let dir = get_log_directory().unwrap();
        assert!(dir.ends_with("ytrack/logs"));
    }

    #[test]
    fn test_default_filter_follows_debug_flag() {
        assert_eq!(default_filter(false), "ytrack=info,warn");
        assert_eq!(default_filter(true), "ytrack=debug,warn");
    }
}
