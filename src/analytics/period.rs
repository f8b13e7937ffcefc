//! Month/year selection and the filter that narrows collections to it.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A (month, year) selection. `None` on either axis means "All".
/// Months are 0-based (0 = January), matching the console's month picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Period {
    #[schema(example = 2, nullable = true)]
    pub month: Option<u32>,
    #[schema(example = 2024, nullable = true)]
    pub year: Option<i32>,
}

impl Period {
    pub fn new(month: Option<u32>, year: Option<i32>) -> Self {
        Self { month, year }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn month_of(month: u32, year: i32) -> Self {
        Self::new(Some(month), Some(year))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.month.is_none() && self.year.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.month.is_none_or(|m| date.month0() == m) && self.year.is_none_or(|y| date.year() == y)
    }

    /// Stable string form used in cache keys: `2024-02`, `2024-all`, `all-02`, `all`.
    pub fn key(&self) -> String {
        match (self.year, self.month) {
            (None, None) => "all".to_string(),
            (Some(y), Some(m)) => format!("{}-{:02}", y, m),
            (Some(y), None) => format!("{}-all", y),
            (None, Some(m)) => format!("all-{:02}", m),
        }
    }
}

/// Parse a date-bearing field. Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// and plain `YYYY-MM-DD`. Offsets keep their local calendar date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Date of a record via its own date field, `None` when absent or unparseable.
pub fn record_date<T>(record: &T, date_of: impl Fn(&T) -> Option<&str>) -> Option<NaiveDate> {
    date_of(record).and_then(parse_timestamp)
}

/// Keep the records whose date falls in `period`.
///
/// Under "All months / All years" nothing is constrained and every record passes,
/// including ones with unparseable dates; bucketed aggregates drop those later.
/// As soon as either axis is constrained, a record needs a valid date to pass.
pub fn filter_by_period<'a, T, F>(records: &'a [T], date_of: F, period: Period) -> Vec<&'a T>
where
    F: Fn(&T) -> Option<&str>,
{
    if period.is_unconstrained() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|r| record_date(*r, &date_of).is_some_and(|d| period.contains(d)))
        .collect()
}
