//! Deduplication key for announced holidays.

use std::fmt;

use chrono::NaiveDate;

use crate::HolidayRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identity of an announced holiday: `"YYYY-MM-DD_Name"`.
///
/// The date prefix is what retention pruning reads back, so keys are only
/// ever built from a date and a name, never edited.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotifiedKey(String);

impl NotifiedKey {
    pub fn new(date: NaiveDate, name: &str) -> Self {
        Self(format!("{}_{}", date.format(DATE_FORMAT), name))
    }

    pub fn for_record(record: &HolidayRecord) -> Self {
        Self::new(record.date, &record.name)
    }

    /// Wrap a key read back from storage. No validation happens here;
    /// a malformed key simply has no [`date`](Self::date).
    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    /// The embedded date, if the prefix before the first `_` parses.
    pub fn date(&self) -> Option<NaiveDate> {
        let prefix = self.0.split('_').next()?;
        NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
