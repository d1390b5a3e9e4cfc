//! Quantile report over one integer value per observation.

use std::collections::BTreeMap;

use nodelog_core::formatting::NumberStyle;
use nodelog_core::quantile::QuantileSummary;
use serde::Serialize;
use tracing::warn;

use crate::table::TextTable;

const HEADERS: [&str; 6] = ["host", "p25", "p50", "P99", "max", "count"];

/// Distribution of one node's values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeQuantiles {
    pub node: String,
    pub p25: f64,
    pub p50: f64,
    pub p99: f64,
    pub max: i64,
    pub count: usize,
}

/// Summarise `value(observation)` per node, sorted by node.
///
/// Nodes without observations are skipped.
pub fn summarize_quantiles<T, F>(data: &BTreeMap<String, Vec<T>>, value: F) -> Vec<NodeQuantiles>
where
    F: Fn(&T) -> i64,
{
    let mut rows = Vec::with_capacity(data.len());
    for (node, observations) in data {
        let values: Vec<i64> = observations.iter().map(&value).collect();
        let Some(summary) = QuantileSummary::from_values(&values) else {
            warn!("node {} has no values", node);
            continue;
        };
        rows.push(NodeQuantiles {
            node: node.clone(),
            p25: summary.p25,
            p50: summary.p50,
            p99: summary.p99,
            max: summary.max,
            count: summary.count,
        });
    }
    rows
}

/// Render `rows` as a text table. Percentiles are rounded to whole numbers.
pub fn render_quantile_table(rows: &[NodeQuantiles], style: NumberStyle) -> String {
    let mut table = TextTable::new(HEADERS);
    for row in rows {
        table.push_row([
            row.node.clone(),
            style.float(row.p25, 0),
            style.float(row.p50, 0),
            style.float(row.p99, 0),
            style.int(row.max),
            style.int(row.count as i64),
        ]);
    }
    table.render()
}
