//! File-level progress reporting.
//!
//! The engine calls a [`ProgressSink`] from many workers at once: once per file
//! that opened, once per file that did not. [`TerminalProgress`] prints a `.`
//! or an `x` for each and keeps the failures for the end-of-run summary.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use nodelog_core::error::NodelogError;
use tracing::warn;

/// Observer for per-file open outcomes. Implementations must be internally
/// synchronised.
pub trait ProgressSink: Send + Sync {
    /// `path` opened and scanning has begun.
    fn on_open(&self, path: &Path);

    /// `path` could not be opened; the run continues without it.
    fn on_failure(&self, path: &Path, error: NodelogError);
}

/// One file that could not be opened.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: NodelogError,
}

struct State<W> {
    out: W,
    opened: usize,
    failures: Vec<FileFailure>,
}

/// Progress markers on a terminal (or any writer), plus a failure list.
///
/// One lock covers both printing and the failure list, so markers and the
/// final summary never interleave.
pub struct TerminalProgress<W: Write + Send = io::Stdout> {
    state: Mutex<State<W>>,
}

impl<W: Write + Send> TerminalProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(State {
                out,
                opened: 0,
                failures: Vec::new(),
            }),
        }
    }

    /// Number of files reported as opened so far.
    pub fn opened_count(&self) -> usize {
        self.lock().opened
    }

    /// Number of files reported as failed so far.
    pub fn failure_count(&self) -> usize {
        self.lock().failures.len()
    }

    /// `(path, message)` for each failure, in the order they were reported.
    pub fn failures(&self) -> Vec<(PathBuf, String)> {
        self.lock()
            .failures
            .iter()
            .map(|f| (f.path.clone(), f.error.to_string()))
            .collect()
    }

    /// Write the numbered failure list to the sink's writer, starting on a
    /// fresh line if any markers were printed.
    pub fn print_failures(&self) -> io::Result<()> {
        let mut state = self.lock();
        let State {
            out,
            opened,
            failures,
        } = &mut *state;
        if *opened + failures.len() > 0 {
            writeln!(out)?;
        }
        writeln!(out, "file errors")?;
        writeln!(out, "-----------")?;
        for (i, failure) in failures.iter().enumerate() {
            writeln!(out, "{} - {}", i, failure.error)?;
        }
        out.flush()
    }

    /// Hand back the writer, e.g. to inspect captured output.
    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }

    fn lock(&self) -> MutexGuard<'_, State<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> ProgressSink for TerminalProgress<W> {
    fn on_open(&self, _path: &Path) {
        let mut state = self.lock();
        state.opened += 1;
        if let Err(e) = write!(state.out, ".").and_then(|_| state.out.flush()) {
            warn!("unable to write progress marker: {}", e);
        }
    }

    fn on_failure(&self, path: &Path, error: NodelogError) {
        let mut state = self.lock();
        state.failures.push(FileFailure {
            path: path.to_path_buf(),
            error,
        });
        if let Err(e) = write!(state.out, "x").and_then(|_| state.out.flush()) {
            warn!("unable to write progress marker: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn open_error(path: &str) -> NodelogError {
        NodelogError::FileOpen {
            path: PathBuf::from(path),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        }
    }

    #[test]
    fn test_markers_written_per_event() {
        let progress = TerminalProgress::new(Vec::new());
        progress.on_open(Path::new("a"));
        progress.on_failure(Path::new("b"), open_error("b"));
        progress.on_open(Path::new("c"));

        assert_eq!(progress.opened_count(), 2);
        assert_eq!(progress.failure_count(), 1);
        assert_eq!(progress.into_inner(), b".x.");
    }

    #[test]
    fn test_failures_kept_in_report_order() {
        let progress = TerminalProgress::new(Vec::new());
        progress.on_failure(Path::new("one"), open_error("one"));
        progress.on_failure(Path::new("two"), open_error("two"));

        let failures = progress.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, PathBuf::from("one"));
        assert_eq!(failures[1].0, PathBuf::from("two"));
        assert!(failures[1].1.contains("error opening file two"));
    }

    #[test]
    fn test_print_failures_numbers_each_entry() {
        let progress = TerminalProgress::new(Vec::new());
        progress.on_failure(Path::new("one"), open_error("one"));
        progress.on_failure(Path::new("two"), open_error("two"));
        progress.print_failures().unwrap();

        let out = String::from_utf8(progress.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "xx");
        assert_eq!(lines[1], "file errors");
        assert_eq!(lines[2], "-----------");
        assert_eq!(lines[3], "0 - error opening file one with error 'gone'");
        assert_eq!(lines[4], "1 - error opening file two with error 'gone'");
    }

    #[test]
    fn test_print_failures_with_none() {
        let progress = TerminalProgress::new(Vec::new());
        progress.print_failures().unwrap();
        assert_eq!(progress.into_inner(), b"file errors\n-----------\n");
    }

    #[test]
    fn test_concurrent_reports_are_all_recorded() {
        let progress = Arc::new(TerminalProgress::new(Vec::new()));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let progress = Arc::clone(&progress);
                thread::spawn(move || {
                    let name = format!("f{i}");
                    if i % 4 == 0 {
                        progress.on_failure(Path::new(&name), open_error(&name));
                    } else {
                        progress.on_open(Path::new(&name));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(progress.opened_count(), 12);
        assert_eq!(progress.failure_count(), 4);
        let out = Arc::try_unwrap(progress).ok().unwrap().into_inner();
        assert_eq!(out.iter().filter(|&&b| b == b'.').count(), 12);
        assert_eq!(out.iter().filter(|&&b| b == b'x').count(), 4);
    }
}
