//! Logging setup on top of `tracing`.
//!
//! The terminal belongs to the UI, so log lines go to a daily rotated file
//! under the local data directory:
//! - Linux: `~/.local/share/fedportal/logs/`
//! - macOS: `~/Library/Application Support/fedportal/logs/`
//! - Windows: `C:\Users\<User>\AppData\Local\fedportal\logs\`
//!
//! `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=fedportal=debug`.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "fedportal=info,warn";

/// Filter used by `--verbose` when `RUST_LOG` is unset.
const VERBOSE_LOG_FILTER: &str = "fedportal=debug,info";

/// Log file name prefix; the appender adds the date suffix.
const LOG_FILE_NAME: &str = "fedportal.log";

/// Install the global subscriber.
///
/// # Errors
///
/// Fails when the log directory cannot be determined or created, or when a
/// global subscriber is already set.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fedportal starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("fedportal").join("logs"))
}

/// Where log files are written, for the help screen.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

/// Log a clean shutdown.
pub fn shutdown() {
    tracing::info!("fedportal shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_has_expected_structure() {
        let dir = log_directory().unwrap();
        assert!(dir.ends_with("fedportal/logs"));
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "fedportal=info,warn");
        assert!(default_filter(true).starts_with("fedportal=debug"));
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }
}
