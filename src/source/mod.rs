//! Log input sources.
//!
//! The host plays the data layer: it reads lines from a file (read-once) or
//! from piped stdin (streaming) and turns them into rows for the engine.

use crate::model::error::InputError;
use crate::model::LogRow;
use std::path::PathBuf;

pub mod file;
pub mod stdin;

pub use file::FileSource;
pub use stdin::StdinSource;

/// Unified input source.
#[derive(Debug)]
pub enum InputSource {
    /// Read-once file.
    File(FileSource),
    /// Piped stdin, possibly still streaming.
    Stdin(StdinSource),
}

impl InputSource {
    /// Rows that arrived since the last poll. Never blocks.
    ///
    /// # Behavior:
    /// - File: all rows on first call, empty vec after
    /// - Stdin: incremental as data arrives
    ///
    /// # Errors
    ///
    /// Returns `InputError` for I/O errors.
    pub fn poll(&mut self) -> Result<Vec<LogRow>, InputError> {
        match self {
            InputSource::File(f) => Ok(f.drain_rows()),
            InputSource::Stdin(s) => s.poll_rows(),
        }
    }

    /// Whether more rows may still arrive.
    pub fn is_live(&self) -> bool {
        match self {
            InputSource::File(_) => false,
            InputSource::Stdin(s) => !s.is_complete(),
        }
    }
}

/// Pick the input source: the file if one is given, else piped stdin.
///
/// # Errors
///
/// Returns `InputError::NoInput` if no file is provided and stdin is a TTY.
/// Returns `InputError::FileNotFound` if the file does not exist.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(FileSource::new(path)?)),
        None => Ok(InputSource::Stdin(StdinSource::new()?)),
    }
}
