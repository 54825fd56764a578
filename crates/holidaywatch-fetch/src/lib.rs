//! Fetch layer: HTTP page retrieval and holiday table extraction for the
//! remote calendar, with the current-year fallback to the default page.

pub mod fetcher;
pub mod http;
pub mod table;

pub use fetcher::HolidayFetcher;
pub use http::{FetchConfig, FetchError, HttpPageClient, PageClient};
pub use table::TableParser;
