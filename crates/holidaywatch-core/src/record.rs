//! Holiday data as it moves through one check cycle.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One table row as scraped from the remote calendar, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// e.g. `Monday`
    pub day_of_week: String,
    /// Abbreviated month and day, e.g. `Jan 01`.
    pub date_text: String,
    pub name: String,
}

impl RawRow {
    pub fn new(
        day_of_week: impl Into<String>,
        date_text: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            day_of_week: day_of_week.into(),
            date_text: date_text.into(),
            name: name.into(),
        }
    }
}

/// Rows fetched for a single year.
///
/// `explicit_year` is false when the rows came from the non-year-scoped
/// fallback page, in which case `year` is only an assumption and dates are
/// disambiguated by the look-back rule in [`normalize`](crate::normalize).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearRows {
    pub year: i32,
    pub explicit_year: bool,
    pub rows: Vec<RawRow>,
}

impl YearRows {
    /// Rows read from the year-scoped page.
    pub fn explicit(year: i32, rows: Vec<RawRow>) -> Self {
        Self {
            year,
            explicit_year: true,
            rows,
        }
    }

    /// Rows read from the default page, which carries no year marker.
    pub fn inferred(year: i32, rows: Vec<RawRow>) -> Self {
        Self {
            year,
            explicit_year: false,
            rows,
        }
    }

    /// Nothing found for `year`.
    pub fn empty(year: i32) -> Self {
        Self::explicit(year, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A normalised holiday: canonical date plus display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRecord {
    pub date: NaiveDate,
    pub name: String,
    pub day_of_week: String,
}

impl HolidayRecord {
    pub fn new(date: NaiveDate, name: impl Into<String>, day_of_week: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            day_of_week: day_of_week.into(),
        }
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_month_and_year() {
        let rec = HolidayRecord::new(
            NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            "Merdeka Day",
            "Sunday",
        );
        assert_eq!(rec.month(), 8);
        assert_eq!(rec.year(), 2025);
    }

    #[test]
    fn record_serialises_iso_date() {
        let rec = HolidayRecord::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            "New Year",
            "Wednesday",
        );
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"date\":\"2025-01-01\""));
        let parsed: HolidayRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn inferred_rows_carry_no_explicit_year() {
        let rows = YearRows::inferred(2025, vec![RawRow::new("Monday", "Jan 01", "New Year")]);
        assert!(!rows.explicit_year);
        assert!(!rows.is_empty());
        assert!(YearRows::empty(2026).is_empty());
    }
}
