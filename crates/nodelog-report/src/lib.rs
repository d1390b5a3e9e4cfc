//! Reports over completed aggregate stores.
//!
//! Reporters only read: they take the sorted data handed back by a rule's
//! store after ingestion and turn it into a table or JSON.

pub mod drops;
pub mod quantiles;
pub mod table;

use serde::Serialize;

pub use drops::{render_drop_table, summarize_drops, NodeDropSummary};
pub use quantiles::{render_quantile_table, summarize_quantiles, NodeQuantiles};

/// Pretty JSON for any report rows.
pub fn render_json<T: Serialize + ?Sized>(rows: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}
