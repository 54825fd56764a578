//! Date normalisation for scraped holiday rows.
//!
//! The remote calendar prints dates as an abbreviated month and a day
//! (`Jan 01`) with no year. The year comes from the page that was fetched:
//! either the year-scoped page (explicit) or the default page, where the
//! year is assumed to be the current one and corrected by a look-back rule.

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::{HolidayRecord, RawRow, YearRows};

/// Dates further than this in the past on the default page belong to next year.
pub const LOOK_BACK_DAYS: i64 = 180;

/// Turn one row's date text into a [`HolidayRecord`].
///
/// `today` is only consulted when `has_explicit_year` is false: a date more
/// than [`LOOK_BACK_DAYS`] before it is moved forward by exactly one year.
/// Returns `None` for unparsable dates, an empty name, or a rollover that
/// lands on a non-existent day (Feb 29).
pub fn normalize(
    date_text: &str,
    day_of_week: &str,
    name: &str,
    assumed_year: i32,
    has_explicit_year: bool,
    today: NaiveDate,
) -> Option<HolidayRecord> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut date = parse_month_day(date_text, assumed_year)?;
    if !has_explicit_year && (today - date).num_days() > LOOK_BACK_DAYS {
        date = date.with_year(date.year() + 1)?;
    }

    Some(HolidayRecord::new(date, name, day_of_week.trim()))
}

/// Normalise every row fetched for one year, dropping the ones that fail.
pub fn normalize_rows(rows: &YearRows, today: NaiveDate) -> Vec<HolidayRecord> {
    rows.rows
        .iter()
        .filter_map(|row| {
            let record = normalize_row(row, rows.year, rows.explicit_year, today);
            if record.is_none() {
                warn!(
                    date_text = %row.date_text,
                    name = %row.name,
                    year = rows.year,
                    "could not parse holiday date, dropping row"
                );
            }
            record
        })
        .collect()
}

fn normalize_row(
    row: &RawRow,
    year: i32,
    explicit_year: bool,
    today: NaiveDate,
) -> Option<HolidayRecord> {
    normalize(
        &row.date_text,
        &row.day_of_week,
        &row.name,
        year,
        explicit_year,
        today,
    )
}

/// Parse `"Jan 01"` (or `"January 1"`) against `year`.
fn parse_month_day(text: &str, year: i32) -> Option<NaiveDate> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    // `%B` accepts both the abbreviated and the full month name.
    NaiveDate::parse_from_str(&format!("{text} {year}"), "%B %d %Y").ok()
}
