//! Ingestion layer for nodelog.
//!
//! Discovers log files, attributes them to nodes, scans them concurrently
//! and feeds every line to a set of [`rules::LineRule`]s, each of which
//! accumulates observations in its own [`store::AggregateStore`].

pub mod discovery;
pub mod engine;
pub mod node;
pub mod progress;
pub mod rules;
pub mod store;

pub use engine::{EngineConfig, IngestSummary, IngestionEngine};
pub use nodelog_core as core;
