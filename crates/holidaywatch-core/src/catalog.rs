//! The merged, date-ordered holiday set for one check cycle.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::HolidayRecord;

/// Holidays for the current and next year, ascending by date.
///
/// Rebuilt from scratch every cycle. Records sharing a date keep the order
/// in which they were fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HolidayCatalog {
    records: Vec<HolidayRecord>,
}

impl HolidayCatalog {
    /// Build a catalog from any record order. The sort is stable.
    pub fn from_records(mut records: Vec<HolidayRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    /// Concatenate the current-year and next-year results.
    ///
    /// No cross-year deduplication: the two fetches target different years.
    pub fn merge(current_year: Vec<HolidayRecord>, next_year: Vec<HolidayRecord>) -> Self {
        let mut records = current_year;
        records.extend(next_year);
        Self::from_records(records)
    }

    /// First holiday on or after `reference`.
    pub fn upcoming(&self, reference: NaiveDate) -> Option<&HolidayRecord> {
        self.records.iter().find(|r| r.date >= reference)
    }

    pub fn for_month(&self, year: i32, month: u32) -> Vec<&HolidayRecord> {
        self.records
            .iter()
            .filter(|r| r.date.year() == year && r.date.month() == month)
            .collect()
    }

    pub fn for_year(&self, year: i32) -> Vec<&HolidayRecord> {
        self.records.iter().filter(|r| r.date.year() == year).collect()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.date.year()).collect();
        years.dedup();
        years
    }

    pub fn iter(&self) -> impl Iterator<Item = &HolidayRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a HolidayCatalog {
    type Item = &'a HolidayRecord;
    type IntoIter = std::slice::Iter<'a, HolidayRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
