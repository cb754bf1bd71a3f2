use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}-[A-Za-z]{3}-\d{4})").unwrap());

/// A `DD-Mon-YYYY` date exactly as printed in the statement.
///
/// The literal is kept verbatim: statements carry markers such as
/// financial-year-start dates that are meaningful even when out of order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DateToken(String);

impl DateToken {
    /// Matches a date token at the start of `line` (after trimming leading whitespace).
    pub fn at_line_start(line: &str) -> Option<DateToken> {
        DATE_PREFIX
            .captures(line.trim_start())
            .map(|caps| DateToken(caps[1].to_string()))
    }

    /// Splits a line into its leading date token and the trimmed remainder.
    pub fn split_prefix(line: &str) -> Option<(DateToken, &str)> {
        let line = line.trim_start();
        let matched = DATE_PREFIX.find(line)?;
        Some((
            DateToken(matched.as_str().to_string()),
            line[matched.end()..].trim(),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calendar view of the token, `None` for impossible dates like `31-Feb-2023`.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%d-%b-%Y").ok()
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
