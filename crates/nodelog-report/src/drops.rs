//! Dropped message report.
//!
//! One `-total-` row per node followed by a row per message type. The
//! "avg freq in log" column is the node's log span divided by the number of
//! drop reports, i.e. how often a drop report appeared.

use std::collections::BTreeMap;

use nodelog_core::formatting::NumberStyle;
use nodelog_core::quantile::mean;
use nodelog_data::rules::DropStats;
use serde::Serialize;

use crate::table::TextTable;

const HEADERS: [&str; 7] = [
    "host",
    "message_type",
    "avg freq in log",
    "local count",
    "remote count",
    "avg local latency ms",
    "remote latency ms",
];

/// Running totals over a set of drop reports. Sums saturate at `i64::MAX`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DropTotals {
    /// Number of drop reports.
    pub freq: usize,
    pub total_local: i64,
    pub total_remote: i64,
    pub total_local_latency_ms: i64,
    pub total_remote_latency_ms: i64,
}

impl DropTotals {
    pub fn add(&mut self, stats: &DropStats) {
        self.freq += 1;
        self.total_local = self.total_local.saturating_add(stats.count_local);
        self.total_remote = self.total_remote.saturating_add(stats.count_remote);
        self.total_local_latency_ms = self
            .total_local_latency_ms
            .saturating_add(i64::from(stats.mean_latency_local_ms));
        self.total_remote_latency_ms = self
            .total_remote_latency_ms
            .saturating_add(i64::from(stats.mean_latency_remote_ms));
    }

    pub fn avg_local_latency_ms(&self) -> f64 {
        mean(self.total_local_latency_ms, self.freq)
    }

    pub fn avg_remote_latency_ms(&self) -> f64 {
        mean(self.total_remote_latency_ms, self.freq)
    }
}

/// Drop statistics for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDropSummary {
    pub node: String,
    /// Milliseconds between the first and last report, divided by the report count.
    pub avg_freq_ms: f64,
    pub total: DropTotals,
    pub by_message_type: BTreeMap<String, DropTotals>,
}

/// Summarise every node in `data`, sorted by node.
pub fn summarize_drops(data: &BTreeMap<String, Vec<DropStats>>) -> Vec<NodeDropSummary> {
    data.iter()
        .filter(|(_, stats)| !stats.is_empty())
        .map(|(node, stats)| summarize_node(node, stats))
        .collect()
}

fn summarize_node(node: &str, stats: &[DropStats]) -> NodeDropSummary {
    let mut total = DropTotals::default();
    let mut by_message_type: BTreeMap<String, DropTotals> = BTreeMap::new();
    let mut first = i64::MAX;
    let mut last = i64::MIN;

    for s in stats {
        let ts = s.timestamp_ms();
        first = first.min(ts);
        last = last.max(ts);
        total.add(s);
        by_message_type
            .entry(s.message_type.clone())
            .or_default()
            .add(s);
    }

    NodeDropSummary {
        node: node.to_string(),
        avg_freq_ms: mean(last - first, total.freq),
        total,
        by_message_type,
    }
}

/// Render `summaries` as a text table.
pub fn render_drop_table(summaries: &[NodeDropSummary], style: NumberStyle) -> String {
    let mut table = TextTable::new(HEADERS);
    for summary in summaries {
        let t = &summary.total;
        table.push_row([
            summary.node.clone(),
            "-total-".to_string(),
            format!("{} ms", style.float(summary.avg_freq_ms, 2)),
            style.int(t.total_local),
            style.int(t.total_remote),
            style.float(t.avg_local_latency_ms(), 2),
            style.float(t.avg_remote_latency_ms(), 2),
        ]);
        for (message_type, m) in &summary.by_message_type {
            table.push_row([
                String::new(),
                message_type.clone(),
                "--".to_string(),
                style.int(m.total_local),
                style.int(m.total_remote),
                style.float(m.avg_local_latency_ms(), 2),
                style.float(m.avg_remote_latency_ms(), 2),
            ]);
        }
    }
    table.render()
}
