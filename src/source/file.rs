//! Read-once file source.

use crate::model::error::InputError;
use crate::model::LogRow;
use crate::parser::LineParser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Rows loaded from a file at construction.
///
/// The whole file is parsed up front; [`FileSource::drain_rows`] hands the
/// rows over once and returns nothing afterwards.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    rows: Option<Vec<LogRow>>,
}

impl FileSource {
    /// Load and parse every line of `path`.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let mut parser = LineParser::new();
        let rows: Vec<LogRow> = content.lines().filter_map(|line| parser.parse(line)).collect();
        info!(path = %path.display(), rows = rows.len(), "Loaded log file");

        Ok(Self {
            path: path.to_path_buf(),
            rows: Some(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows on the first call, empty afterwards.
    pub fn drain_rows(&mut self) -> Vec<LogRow> {
        self.rows.take().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_rows_once() {
        let path = temp_file("logrows_file_source_once.log", "first\n\nsecond\n");
        let mut source = FileSource::new(&path).unwrap();
        let _ = fs::remove_file(&path);

        let rows = source.drain_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].raw(), "first");
        assert_eq!(rows[1].sequence(), 1);
        assert!(source.drain_rows().is_empty());
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let path = std::env::temp_dir().join("logrows_missing_file_12345.log");
        match FileSource::new(&path) {
            Err(InputError::FileNotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let path = std::env::temp_dir().join("logrows_file_source_lossy.log");
        fs::write(&path, b"ok\n\xff\xfe bad\n").unwrap();
        let mut source = FileSource::new(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(source.drain_rows().len(), 2);
    }
}
