//! Holiday table extraction.
//!
//! The only place that knows the page markup. The calendar site changes its
//! HTML without notice, so a missing table is reported as `None` rather than
//! an error and the selector is configurable.

use holidaywatch_core::RawRow;
use scraper::{ElementRef, Html, Selector};

use crate::FetchError;

/// Minimum cells per row: day of week, date, name.
const MIN_CELLS: usize = 3;

pub struct TableParser {
    table: Selector,
    row: Selector,
    cell: Selector,
}

impl TableParser {
    /// Build a parser for the table matched by `table_selector`
    /// (e.g. `table.country-table`).
    pub fn new(table_selector: &str) -> Result<Self, FetchError> {
        Ok(Self {
            table: parse_selector(table_selector)?,
            row: parse_selector("tr")?,
            cell: parse_selector("td")?,
        })
    }

    /// Rows of the first matching table, header row excluded.
    ///
    /// Returns `None` when no table matches. Rows with fewer than three
    /// cells are skipped.
    pub fn parse(&self, html: &str) -> Option<Vec<RawRow>> {
        let doc = Html::parse_document(html);
        let table = doc.select(&self.table).next()?;

        let rows = table
            .select(&self.row)
            .skip(1)
            .filter_map(|row| {
                let cells: Vec<String> = row.select(&self.cell).map(cell_text).collect();
                if cells.len() < MIN_CELLS {
                    return None;
                }
                let mut cells = cells.into_iter();
                let day_of_week = cells.next()?;
                let date_text = cells.next()?;
                let name = cells.next()?;
                Some(RawRow {
                    day_of_week,
                    date_text,
                    name,
                })
            })
            .collect();
        Some(rows)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|e| FetchError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Cell text with whitespace collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    let text: String = cell.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
