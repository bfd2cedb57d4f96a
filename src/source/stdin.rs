//! Stdin source for piped input.
//!
//! A background thread reads lines and sends them over a channel so the
//! event loop can poll without blocking, whether data is still streaming
//! (`tail -f app.log | logrows`) or already complete (`cat app.log | logrows`).

use crate::model::error::InputError;
use crate::model::LogRow;
use crate::parser::LineParser;
use std::io::{BufRead, BufReader, IsTerminal, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::warn;

#[derive(Debug)]
enum StdinMessage {
    Line(String),
    Eof,
    Failed(std::io::Error),
}

/// Non-blocking line source over stdin (or any reader, in tests).
#[derive(Debug)]
pub struct StdinSource {
    rx: Receiver<StdinMessage>,
    parser: LineParser,
    complete: bool,
}

impl StdinSource {
    /// Start reading stdin on a background thread.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is an interactive terminal,
    /// so the viewer never sits waiting for keyboard input it won't get.
    pub fn new() -> Result<Self, InputError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self::from_reader(stdin))
    }

    /// Read from any reader on a background thread.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(reader);
            let mut buffer = Vec::new();
            loop {
                buffer.clear();
                let message = match reader.read_until(b'\n', &mut buffer) {
                    Ok(0) => StdinMessage::Eof,
                    Ok(_) => StdinMessage::Line(String::from_utf8_lossy(&buffer).into_owned()),
                    Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(err) => StdinMessage::Failed(err),
                };
                let done = !matches!(message, StdinMessage::Line(_));
                if tx.send(message).is_err() || done {
                    break;
                }
            }
        });

        Self {
            rx,
            parser: LineParser::new(),
            complete: false,
        }
    }

    /// Drain every line received since the last poll and parse it.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if the reader thread hit a read error.
    /// Rows received before the error are dropped with it.
    pub fn poll_rows(&mut self) -> Result<Vec<LogRow>, InputError> {
        let mut rows = Vec::new();
        while !self.complete {
            match self.rx.try_recv() {
                Ok(StdinMessage::Line(line)) => rows.extend(self.parser.parse(&line)),
                Ok(StdinMessage::Eof) => self.complete = true,
                Ok(StdinMessage::Failed(err)) => {
                    self.complete = true;
                    return Err(err.into());
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Stdin reader stopped without EOF");
                    self.complete = true;
                }
            }
        }
        Ok(rows)
    }

    /// Whether EOF has been reached (no more data will arrive).
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Poll until EOF or timeout, collecting everything.
    fn drain(source: &mut StdinSource) -> Vec<LogRow> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut rows = Vec::new();
        while !source.is_complete() && Instant::now() < deadline {
            rows.extend(source.poll_rows().unwrap());
            thread::sleep(Duration::from_millis(5));
        }
        rows
    }

    #[test]
    fn reads_all_lines_then_completes() {
        let data = b"one\ntwo\n{\"id\":\"x\",\"msg\":\"three\"}\n";
        let mut source = StdinSource::from_reader(&data[..]);

        let rows = drain(&mut source);

        assert!(source.is_complete());
        let raws: Vec<_> = rows.iter().map(LogRow::raw).collect();
        assert_eq!(raws, vec!["one", "two", "three"]);
        assert_eq!(rows[2].uid(), "x");
    }

    #[test]
    fn final_line_without_newline_is_kept() {
        let mut source = StdinSource::from_reader(&b"alpha\nomega"[..]);
        let rows = drain(&mut source);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].raw(), "omega");
    }

    #[test]
    fn is_live_until_eof_is_seen() {
        let source = StdinSource::from_reader(&b"x\n"[..]);
        assert!(!source.is_complete());
    }

    #[test]
    fn poll_after_complete_returns_nothing() {
        let mut source = StdinSource::from_reader(&b"x\n"[..]);
        drain(&mut source);
        assert!(source.poll_rows().unwrap().is_empty());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("boom"))
        }
    }

    #[test]
    fn read_error_surfaces_as_io_error() {
        let mut source = StdinSource::from_reader(FailingReader);
        let deadline = Instant::now() + Duration::from_secs(2);
        let result = loop {
            match source.poll_rows() {
                Ok(rows) if rows.is_empty() && Instant::now() < deadline && !source.is_complete() => {
                    thread::sleep(Duration::from_millis(5));
                }
                other => break other,
            }
        };
        assert!(matches!(result, Err(InputError::Io(_))));
    }
}
