use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by nodelog.
#[derive(Error, Debug)]
pub enum NodelogError {
    /// Walking a root path failed. Fatal for the whole run.
    #[error("Failed to walk {root}: {source}")]
    Discovery {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A discovered log file could not be opened.
    #[error("error opening file {path} with error '{source}'")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from an already opened log file failed.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A captured field of a matching line did not parse into its type.
    #[error("unable to parse {field} '{value}': {reason}")]
    FieldParse {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A captured timestamp did not match the log timestamp layout.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NodelogError {
    /// Build a [`NodelogError::FieldParse`] from any displayable parse error.
    pub fn field_parse(field: &'static str, value: &str, reason: impl std::fmt::Display) -> Self {
        Self::FieldParse {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the nodelog crates.
pub type Result<T> = std::result::Result<T, NodelogError>;
