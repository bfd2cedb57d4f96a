//! Tracing subscriber initialization.
//!
//! The terminal owns stdout, so diagnostics go to a file.
//! Follow them with `tail -f` in a separate terminal.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Log path has no usable file name
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Split a log path into its directory and file name, creating the
/// directory if needed.
fn prepare_log_path(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    Ok((directory, file_name.to_string()))
}

/// `RUST_LOG` if set and valid, else [`DEFAULT_FILTER`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Build a subscriber that appends plain-text events to `log_path`.
///
/// # Errors
/// Returns `LoggingError` if the path has no file name or its directory
/// cannot be created.
pub fn file_subscriber(
    log_path: &Path,
) -> Result<impl tracing::Subscriber + Send + Sync + 'static, LoggingError> {
    let (directory, file_name) = prepare_log_path(log_path)?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    Ok(tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(file_appender)
        .with_ansi(false)
        .finish())
}

/// Install the file subscriber as the global default.
///
/// # Errors
/// Returns `LoggingError::SubscriberAlreadySet` on a second call, or any
/// error from [`file_subscriber`].
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let subscriber = file_subscriber(log_path)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn prepare_creates_missing_directory() {
        let test_dir = std::env::temp_dir().join("logrows_test_logs_create");
        let _ = fs::remove_dir_all(&test_dir);

        let (directory, file_name) = prepare_log_path(&test_dir.join("nested").join("app.log")).unwrap();

        assert!(directory.exists());
        assert_eq!(file_name, "app.log");
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    fn bare_file_name_logs_to_current_directory() {
        let (directory, file_name) = prepare_log_path(Path::new("logrows.log")).unwrap();
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file_name, "logrows.log");
    }

    #[test]
    fn path_without_file_name_is_invalid() {
        let result = prepare_log_path(Path::new("/"));
        assert!(matches!(result, Err(LoggingError::InvalidPath(_))));
    }

    #[test]
    #[serial(tracing_init)]
    fn events_are_written_to_the_log_file() {
        let test_dir = std::env::temp_dir().join("logrows_test_logs_write");
        let _ = fs::remove_dir_all(&test_dir);
        let log_file = test_dir.join("events.log");

        let subscriber = file_subscriber(&log_file).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(rows = 3, "written through the file subscriber");
        });

        let content = fs::read_to_string(&log_file).unwrap();
        assert!(content.contains("written through the file subscriber"));
        assert!(content.contains("rows=3"));
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn second_global_init_is_rejected() {
        let test_dir = std::env::temp_dir().join("logrows_test_logs_twice");
        let log_file = test_dir.join("twice.log");

        let _ = init(&log_file);
        let second = init(&log_file);

        assert!(matches!(second, Err(LoggingError::SubscriberAlreadySet)));
        let _ = fs::remove_dir_all(&test_dir);
    }
}
