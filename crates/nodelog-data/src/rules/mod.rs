//! Line rules: pluggable matchers that turn log lines into observations.
//!
//! Every rule sees every line of every file. A rule ignores lines that do not
//! have its shape, returns an error for lines that do but carry unparseable
//! fields, and otherwise appends one observation to the store it owns.

pub mod drops;
pub mod slow_query;

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use nodelog_core::error::{NodelogError, Result};
use regex::Captures;

pub use drops::{DropRule, DropStats};
pub use slow_query::{SlowQueryHit, SlowQueryRule};

/// A line-matching extraction unit.
///
/// `read_line` is called concurrently from every file worker, so
/// implementations synchronise their own storage.
pub trait LineRule: Send + Sync {
    /// Offer one line from a file attributed to `node`.
    ///
    /// Returns `Ok(())` for lines the rule does not recognise.
    fn read_line(&self, node: &str, line: &str) -> Result<()>;

    /// Identifies the rule in diagnostics.
    fn name(&self) -> &str;
}

/// Layout of the log timestamp once the millisecond comma became a period.
const TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Parse a `2021-05-17 11:42:44,114` style timestamp as UTC.
pub fn parse_log_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let normalised = raw.replacen(',', ".", 1);
    let naive = NaiveDateTime::parse_from_str(&normalised, TIMESTAMP_LAYOUT)
        .map_err(|e| NodelogError::TimestampParse(format!("'{}': {}", normalised, e)))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Parse the named capture `group` into `T`, labelling failures with `field`.
pub(crate) fn parse_capture<T>(caps: &Captures<'_>, group: &str, field: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = caps.name(group).map_or("", |m| m.as_str());
    raw.parse::<T>()
        .map_err(|e| NodelogError::field_parse(field, raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_parse_log_timestamp_comma_millis() {
        let ts = parse_log_timestamp("2021-05-17 11:42:44,114").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_621_251_764_114);
    }

    #[test]
    fn test_parse_log_timestamp_period_millis() {
        let ts = parse_log_timestamp("2021-05-17 11:42:44.114").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_621_251_764_114);
    }

    #[test]
    fn test_parse_log_timestamp_rejects_garbage() {
        let err = parse_log_timestamp("2021-13-45 11:42:44,114").unwrap_err();
        assert!(matches!(err, NodelogError::TimestampParse(_)));
    }

    #[test]
    fn test_parse_capture() {
        let re = Regex::new(r"n=(?P<n>\d*)").unwrap();
        let caps = re.captures("n=42").unwrap();
        assert_eq!(parse_capture::<i64>(&caps, "n", "number").unwrap(), 42);

        let caps = re.captures("n=").unwrap();
        let err = parse_capture::<i64>(&caps, "n", "number").unwrap_err();
        assert!(err.to_string().starts_with("unable to parse number ''"));
    }
}
