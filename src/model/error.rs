//! Error types for logrows.
//!
//! The row engine itself is total and has no error type. Failures only come
//! from the shell around it: reading input, loading config, setting up
//! logging, and driving the terminal.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned from `main`
//!   - [`InputError`] - File/stdin reading failures
//!   - [`crate::config::ConfigError`] - Config file read/parse failures
//!   - [`crate::logging::LoggingError`] - Tracing subscriber setup failures
//!   - [`crate::view::TuiError`] - Terminal failures
//!
//! Unparseable input lines are not errors: they become plain-text rows.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
///
/// All of these are fatal: `main` prints them and exits non-zero.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to open or read the row source.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Config file exists but is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal setup, drawing, or event reading failed.
    #[error("Terminal error: {0}")]
    Tui(#[from] crate::view::TuiError),
}

/// Errors encountered when reading rows from files or stdin.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified log file does not exist at the given path.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use logrows::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.log")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.log"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// No file argument and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Any other I/O failure while reading input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
