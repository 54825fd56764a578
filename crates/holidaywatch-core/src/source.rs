//! Seam between the check cycle and whatever retrieves holiday rows.

use async_trait::async_trait;

use crate::YearRows;

/// Retrieves raw holiday rows for one year.
///
/// Implementations never fail: transport or markup problems produce an
/// empty [`YearRows`] and are logged. The next cycle is the retry.
#[async_trait]
pub trait HolidaySource: Send + Sync {
    /// Fetch rows for `year`. When `year == current_year` and no year-scoped
    /// table exists, implementations fall back to a page without a year
    /// marker and return [`YearRows::inferred`] rows.
    async fn fetch_year(&self, year: i32, current_year: i32) -> YearRows;
}
