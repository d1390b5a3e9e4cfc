//! Slow search query rule.
//!
//! ```text
//! WARN  [RemoteMessageServer query worker - 52] 2021-05-19 01:10:49,847  SolrCore.java:2208 - slow: [ks.table]  hits=408877851 status=0 QTime=4499
//! ```
//!
//! `status` and `QTime` are part of the match but are not recorded.

use chrono::{DateTime, Utc};
use nodelog_core::error::Result;
use regex::Regex;
use serde::Serialize;

use super::{parse_capture, parse_log_timestamp, LineRule};
use crate::store::AggregateStore;

const SLOW_QUERY_PATTERN: &str = concat!(
    r"WARN  \[\S*MessageServer query worker - (?P<thread_id>[0-9]*)\]",
    r" (?P<date>.{10} .{12}) *(?P<source_file>[^:]*):(?P<source_line>[0-9]*)",
    r" - slow: \[(?P<table>\S*)\]  hits=(?P<hits>[0-9]*) status=(?P<status>[0-9]) QTime=(?P<qtime>[0-9]*)",
);

/// Result size of one slow query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlowQueryHit {
    pub timestamp: DateTime<Utc>,
    pub hits: i64,
}

/// Extracts [`SlowQueryHit`]s from slow query warnings.
pub struct SlowQueryRule {
    re: Regex,
    store: AggregateStore<SlowQueryHit>,
}

impl Default for SlowQueryRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SlowQueryRule {
    pub fn new() -> Self {
        Self {
            re: Regex::new(SLOW_QUERY_PATTERN).expect("regex is valid"),
            store: AggregateStore::new(),
        }
    }

    pub fn store(&self) -> &AggregateStore<SlowQueryHit> {
        &self.store
    }

    /// Parse `line` without recording it.
    pub fn extract(&self, line: &str) -> Result<Option<SlowQueryHit>> {
        let Some(caps) = self.re.captures(line) else {
            return Ok(None);
        };
        let hits = parse_capture(&caps, "hits", "hits")?;
        let timestamp = parse_log_timestamp(caps.name("date").map_or("", |m| m.as_str()))?;
        Ok(Some(SlowQueryHit { timestamp, hits }))
    }
}

impl LineRule for SlowQueryRule {
    fn read_line(&self, node: &str, line: &str) -> Result<()> {
        if let Some(hit) = self.extract(line)? {
            self.store.append(node, hit);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "SlowQueryRule"
    }
}
