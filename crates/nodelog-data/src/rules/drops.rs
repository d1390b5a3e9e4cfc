//! Dropped message rule.
//!
//! Cassandra reports dropped messages every five seconds per message type:
//!
//! ```text
//! INFO  [ScheduledTasks:1] 2021-05-17 11:42:44,114  DroppedMessages.java:156 - MUTATION messages were dropped in the last 5 s: 0 internal and 25 cross node. Mean internal dropped latency: 2952 ms and Mean cross-node dropped latency: 2516 ms
//! ```

use chrono::{DateTime, Utc};
use nodelog_core::error::Result;
use regex::Regex;
use serde::Serialize;

use super::{parse_capture, parse_log_timestamp, LineRule};
use crate::store::AggregateStore;

const DROPPED_PATTERN: &str = concat!(
    r"INFO  \[(?P<thread>.*)\] (?P<date>.{10} .{12}) *(?P<source_file>[^:]*):(?P<source_line>[0-9]*)",
    r" - (?P<message_type>\S*) messages were dropped in the last 5 s:",
    r" (?P<local_count>[0-9]*) internal and (?P<remote_count>[0-9]*) cross node\.",
    r" Mean internal dropped latency: (?P<local_latency>[0-9]*) ms",
    r" and Mean cross-node dropped latency: (?P<remote_latency>[0-9]*) ms",
);

/// One five-second drop report for a single message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropStats {
    pub timestamp: DateTime<Utc>,
    pub message_type: String,
    pub count_local: i64,
    pub count_remote: i64,
    pub mean_latency_local_ms: i32,
    pub mean_latency_remote_ms: i32,
}

impl DropStats {
    /// Milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Extracts [`DropStats`] from dropped message log lines.
pub struct DropRule {
    re: Regex,
    store: AggregateStore<DropStats>,
}

impl Default for DropRule {
    fn default() -> Self {
        Self::new()
    }
}

impl DropRule {
    pub fn new() -> Self {
        Self {
            re: Regex::new(DROPPED_PATTERN).expect("regex is valid"),
            store: AggregateStore::new(),
        }
    }

    /// The observations collected so far, keyed by node.
    pub fn store(&self) -> &AggregateStore<DropStats> {
        &self.store
    }

    /// Parse `line` without recording it. `Ok(None)` means the line is not a
    /// drop report.
    pub fn extract(&self, line: &str) -> Result<Option<DropStats>> {
        let Some(caps) = self.re.captures(line) else {
            return Ok(None);
        };
        let raw_date = caps.name("date").map_or("", |m| m.as_str());
        let timestamp = parse_log_timestamp(raw_date)?;
        let mean_latency_local_ms = parse_capture(&caps, "local_latency", "local latency")?;
        let mean_latency_remote_ms = parse_capture(&caps, "remote_latency", "remote latency")?;
        let count_remote = parse_capture(&caps, "remote_count", "remote count")?;
        let count_local = parse_capture(&caps, "local_count", "local count")?;
        Ok(Some(DropStats {
            timestamp,
            message_type: caps["message_type"].to_string(),
            count_local,
            count_remote,
            mean_latency_local_ms,
            mean_latency_remote_ms,
        }))
    }
}

impl LineRule for DropRule {
    fn read_line(&self, node: &str, line: &str) -> Result<()> {
        if let Some(stats) = self.extract(line)? {
            self.store.append(node, stats);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "DropRule"
    }
}
