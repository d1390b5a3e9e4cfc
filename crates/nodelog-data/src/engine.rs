//! Concurrent ingestion of log files.
//!
//! [`IngestionEngine::parse`] discovers the files under the given roots, then
//! scans each file on its own blocking task. Every line of a file is offered,
//! in file order, to every rule in registration order. The call returns only
//! after every task has finished, so the rules' stores are complete and no
//! longer written to once it resolves.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nodelog_core::error::{NodelogError, Result};
use nodelog_core::settings::DEFAULT_NODE_MARKER;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::discovery::{find_log_files, DiscoveryConfig};
use crate::node::node_id;
use crate::progress::ProgressSink;
use crate::rules::LineRule;

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub discovery: DiscoveryConfig,
    /// Path component whose successor names the node.
    pub node_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            node_marker: DEFAULT_NODE_MARKER.to_string(),
        }
    }
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Counters describing one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub files_discovered: usize,
    pub files_opened: usize,
    pub files_failed: usize,
    /// Lines read across all opened files.
    pub lines_read: u64,
    /// Lines a rule matched but could not parse, counted once per rule.
    pub rule_errors: u64,
    /// Files whose task panicked before finishing.
    pub tasks_panicked: usize,
}

#[derive(Debug, Default)]
struct FileOutcome {
    opened: bool,
    lines: u64,
    rule_errors: u64,
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub struct IngestionEngine {
    config: EngineConfig,
}

impl Default for IngestionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl IngestionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Scan every log file under `roots` with `rules`.
    ///
    /// Only a discovery failure is returned as an error, before any file is
    /// touched. Files that fail to open go to `progress`; lines that fail a
    /// rule are logged and skipped for that rule.
    ///
    /// One task is spawned per file. How many run at once is bounded by the
    /// runtime's blocking pool size.
    pub async fn parse<P: AsRef<Path>>(
        &self,
        roots: &[P],
        progress: Arc<dyn ProgressSink>,
        rules: Vec<Arc<dyn LineRule>>,
    ) -> Result<IngestSummary> {
        let roots: Vec<PathBuf> = roots.iter().map(|r| r.as_ref().to_path_buf()).collect();
        let discovery = self.config.discovery.clone();
        let files = tokio::task::spawn_blocking(move || find_log_files(&roots, &discovery))
            .await
            .map_err(|e| NodelogError::Other(e.into()))??;

        let mut summary = IngestSummary {
            files_discovered: files.len(),
            ..IngestSummary::default()
        };
        info!("Scanning {} log files", files.len());

        let rules: Arc<[Arc<dyn LineRule>]> = rules.into();
        let mut tasks = JoinSet::new();
        for path in files {
            let node = node_id(&path, &self.config.node_marker);
            let progress = Arc::clone(&progress);
            let rules = Arc::clone(&rules);
            tasks.spawn_blocking(move || scan_file(&path, &node, progress.as_ref(), &rules));
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    if outcome.opened {
                        summary.files_opened += 1;
                    } else {
                        summary.files_failed += 1;
                    }
                    summary.lines_read += outcome.lines;
                    summary.rule_errors += outcome.rule_errors;
                }
                Err(e) => {
                    error!("file scan task did not complete: {}", e);
                    summary.tasks_panicked += 1;
                }
            }
        }

        info!(
            opened = summary.files_opened,
            failed = summary.files_failed,
            lines = summary.lines_read,
            rule_errors = summary.rule_errors,
            "ingestion complete"
        );
        Ok(summary)
    }
}

// ── Per-file work ─────────────────────────────────────────────────────────────

fn scan_file(
    path: &Path,
    node: &str,
    progress: &dyn ProgressSink,
    rules: &[Arc<dyn LineRule>],
) -> FileOutcome {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(source) => {
            progress.on_failure(
                path,
                NodelogError::FileOpen {
                    path: path.to_path_buf(),
                    source,
                },
            );
            return FileOutcome::default();
        }
    };
    progress.on_open(path);

    let mut outcome = FileOutcome {
        opened: true,
        ..FileOutcome::default()
    };
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(source) => {
                let err = NodelogError::FileRead {
                    path: path.to_path_buf(),
                    source,
                };
                error!("stopped reading after line {}: {}", outcome.lines, err);
                break;
            }
        }
        outcome.lines += 1;
        let text = String::from_utf8_lossy(trim_line_ending(&buf));
        for rule in rules {
            if let Err(e) = rule.read_line(node, &text) {
                outcome.rule_errors += 1;
                error!(
                    "unable to read line '{}' for file '{}' using rule '{}' with error '{}'",
                    outcome.lines,
                    path.display(),
                    rule.name(),
                    e
                );
            }
        }
    }

    debug!(
        "File {}: {} lines, {} rule errors",
        path.display(),
        outcome.lines,
        outcome.rule_errors
    );
    outcome
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
