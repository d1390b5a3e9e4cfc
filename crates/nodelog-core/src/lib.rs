//! Shared building blocks for nodelog: the error type, CLI settings,
//! number formatting and percentile helpers.

pub mod error;
pub mod formatting;
pub mod quantile;
pub mod settings;

pub use error::{NodelogError, Result};
