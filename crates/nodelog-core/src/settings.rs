use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::{NodelogError, Result};
use crate::formatting::NumberStyle;

/// File-name substrings that mark a file as a log worth scanning.
pub const DEFAULT_LOG_MARKERS: [&str; 2] = ["system.log", "debug.log"];

/// Path component after which the node name follows, e.g. `.../nodes/10.0.0.1/logs/system.log`.
pub const DEFAULT_NODE_MARKER: &str = "nodes";

/// Matches tokio's own default for the blocking pool.
pub const DEFAULT_MAX_BLOCKING_THREADS: usize = 512;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summarise dropped messages and slow queries across a cluster's log files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "nodelog",
    about = "Summarise dropped messages and slow queries across a cluster's log files",
    version
)]
pub struct Settings {
    #[command(subcommand)]
    pub command: Command,

    /// Logging level (written to stderr)
    #[arg(
        long,
        global = true,
        env = "NODELOG_LOG_LEVEL",
        default_value = "INFO",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"]
    )]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// File-name substring marking a log file; repeat to accept several
    #[arg(long = "log-marker", global = true, default_values = DEFAULT_LOG_MARKERS)]
    pub log_markers: Vec<String>,

    /// Path component whose successor names the node
    #[arg(long, global = true, default_value = DEFAULT_NODE_MARKER)]
    pub node_marker: String,

    /// Upper bound on files scanned at the same time
    #[arg(
        long,
        global = true,
        env = "NODELOG_MAX_BLOCKING_THREADS",
        default_value_t = DEFAULT_MAX_BLOCKING_THREADS
    )]
    pub max_blocking_threads: usize,

    /// Print numbers without thousands separators
    #[arg(long, global = true)]
    pub raw_numbers: bool,

    /// Emit the report as JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,
}

/// Report to produce.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Dropped message statistics per node and message type
    Drops {
        /// Log files or directories to scan
        paths: Vec<PathBuf>,
    },
    /// Quantiles of slow query hit counts per node
    #[command(alias = "tpc")]
    SlowQueries {
        /// Log files or directories to scan
        paths: Vec<PathBuf>,
    },
}

impl Command {
    /// Roots to scan for this report.
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Command::Drops { paths } | Command::SlowQueries { paths } => paths,
        }
    }
}

impl Settings {
    /// Level passed to the logging bootstrap; `--debug` wins over `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    pub fn number_style(&self) -> NumberStyle {
        if self.raw_numbers {
            NumberStyle::Raw
        } else {
            NumberStyle::Grouped
        }
    }

    /// Reject combinations clap cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        if self.log_markers.iter().any(|m| m.is_empty()) {
            return Err(NodelogError::Config(
                "--log-marker must not be empty".to_string(),
            ));
        }
        if self.node_marker.is_empty() {
            return Err(NodelogError::Config(
                "--node-marker must not be empty".to_string(),
            ));
        }
        if self.max_blocking_threads == 0 {
            return Err(NodelogError::Config(
                "--max-blocking-threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Settings::try_parse_from(args).expect("valid args")
    }

    #[test]
    fn test_settings_default_values() {
        let s = parse(&["nodelog", "drops", "/logs"]);
        assert_eq!(s.log_level, "INFO");
        assert!(!s.debug);
        assert_eq!(s.log_markers, vec!["system.log", "debug.log"]);
        assert_eq!(s.node_marker, "nodes");
        assert_eq!(s.max_blocking_threads, DEFAULT_MAX_BLOCKING_THREADS);
        assert_eq!(s.number_style(), NumberStyle::Grouped);
        assert!(!s.json);
        assert_eq!(s.command.paths(), &[PathBuf::from("/logs")]);
    }

    #[test]
    fn test_settings_tpc_alias() {
        let s = parse(&["nodelog", "tpc", "a", "b"]);
        assert_eq!(
            s.command,
            Command::SlowQueries {
                paths: vec![PathBuf::from("a"), PathBuf::from("b")]
            }
        );
    }

    #[test]
    fn test_settings_no_paths_is_allowed() {
        let s = parse(&["nodelog", "drops"]);
        assert!(s.command.paths().is_empty());
    }

    #[test]
    fn test_settings_custom_markers_replace_defaults() {
        let s = parse(&[
            "nodelog",
            "--log-marker",
            "output.log",
            "--log-marker",
            "gc.log",
            "drops",
        ]);
        assert_eq!(s.log_markers, vec!["output.log", "gc.log"]);
    }

    #[test]
    fn test_settings_global_flags_after_subcommand() {
        let s = parse(&["nodelog", "slow-queries", "--raw-numbers", "--json", "x"]);
        assert_eq!(s.number_style(), NumberStyle::Raw);
        assert!(s.json);
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let s = parse(&["nodelog", "--log-level", "ERROR", "--debug", "drops"]);
        assert_eq!(s.effective_log_level(), "DEBUG");
    }

    #[test]
    fn test_settings_rejects_unknown_log_level() {
        assert!(Settings::try_parse_from(["nodelog", "--log-level", "LOUD", "drops"]).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_marker() {
        let s = parse(&["nodelog", "--log-marker", "", "drops"]);
        assert!(matches!(s.validate(), Err(NodelogError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        let s = parse(&["nodelog", "--max-blocking-threads", "0", "drops"]);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(parse(&["nodelog", "drops"]).validate().is_ok());
    }
}
