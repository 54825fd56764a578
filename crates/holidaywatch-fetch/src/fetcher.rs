//! Year-scoped holiday fetch with a same-page fallback.

use async_trait::async_trait;
use holidaywatch_core::{HolidaySource, RawRow, YearRows};
use tracing::{Instrument, Span, error, info, warn};

use crate::{FetchConfig, FetchError, HttpPageClient, PageClient, TableParser};

/// Fetches holiday rows from `{base_url}/{year}`, falling back to
/// `{base_url}` for the current year when the year page has no table.
pub struct HolidayFetcher<P = HttpPageClient> {
    pages: P,
    parser: TableParser,
    base_url: String,
    span: Span,
}

impl HolidayFetcher<HttpPageClient> {
    /// Build a reqwest-backed fetcher from `config`.
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            HttpPageClient::new(config)?,
            TableParser::new(&config.table_selector)?,
            &config.base_url,
        ))
    }
}

impl<P: PageClient> HolidayFetcher<P> {
    pub fn new(pages: P, parser: TableParser, base_url: &str) -> Self {
        Self {
            pages,
            parser,
            base_url: base_url.trim_end_matches('/').to_string(),
            span: tracing::info_span!("fetcher"),
        }
    }

    /// Log under `span` instead of the default `fetcher` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn year_url(&self, year: i32) -> String {
        format!("{}/{}", self.base_url, year)
    }

    /// `Ok(None)` when the page loaded but the holiday table is absent.
    async fn fetch_table(&self, url: &str) -> Result<Option<Vec<RawRow>>, FetchError> {
        let body = self.pages.get(url).await?;
        Ok(self.parser.parse(&body))
    }

    async fn fetch_default_page(&self, year: i32) -> YearRows {
        match self.fetch_table(&self.base_url).await {
            Ok(Some(rows)) => {
                info!(count = rows.len(), "read holidays from default page");
                YearRows::inferred(year, rows)
            }
            Ok(None) => {
                warn!(url = %self.base_url, "could not find holiday table on default page");
                YearRows::empty(year)
            }
            Err(e) => {
                error!(url = %self.base_url, error = %e, "failed to fetch default page");
                YearRows::empty(year)
            }
        }
    }
}

#[async_trait]
impl<P: PageClient> HolidaySource for HolidayFetcher<P> {
    async fn fetch_year(&self, year: i32, current_year: i32) -> YearRows {
        let span = self.span.clone();
        async move {
            let url = self.year_url(year);
            match self.fetch_table(&url).await {
                Ok(Some(rows)) => {
                    info!(year, count = rows.len(), "read holidays");
                    YearRows::explicit(year, rows)
                }
                Ok(None) if year == current_year => {
                    warn!(year, "no holiday table on year page, trying default page");
                    self.fetch_default_page(year).await
                }
                Ok(None) => {
                    warn!(year, "could not find holiday table");
                    YearRows::empty(year)
                }
                Err(e) => {
                    error!(year, url = %url, error = %e, "failed to fetch holidays");
                    YearRows::empty(year)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    const BASE: &str = "https://calendar.test/countries/malaysia";

    fn table(rows: &[(&str, &str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(dow, date, name)| {
                format!("<tr><td>{dow}</td><td>{date}</td><td>{name}</td></tr>")
            })
            .collect();
        format!(
            r#"<html><table class="country-table"><tr><th>Day</th><th>Date</th><th>Name</th></tr>{body}</table></html>"#
        )
    }

    /// Canned pages keyed by URL; unknown URLs answer 404. Records every request.
    #[derive(Default)]
    struct StaticPages {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticPages {
        fn with(mut self, url: &str, body: String) -> Self {
            self.pages.insert(url.to_string(), body);
            self
        }
    }

    #[async_trait]
    impl PageClient for StaticPages {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or(FetchError::Server {
                status: 404,
                body: String::new(),
            })
        }
    }

    fn fetcher(pages: StaticPages) -> HolidayFetcher<StaticPages> {
        HolidayFetcher::new(pages, TableParser::new("table.country-table").unwrap(), BASE)
    }

    #[tokio::test]
    async fn year_page_rows_are_explicit() {
        let pages = StaticPages::default().with(
            &format!("{BASE}/2025"),
            table(&[("Monday", "Jan 01", "New Year"), ("Wednesday", "Feb 01", "Federal Day")]),
        );
        let rows = fetcher(pages).fetch_year(2025, 2025).await;
        assert_eq!(rows.year, 2025);
        assert!(rows.explicit_year);
        assert_eq!(
            rows.rows,
            vec![
                RawRow::new("Monday", "Jan 01", "New Year"),
                RawRow::new("Wednesday", "Feb 01", "Federal Day"),
            ]
        );
    }

    #[tokio::test]
    async fn current_year_without_table_falls_back_to_default_page() {
        let pages = StaticPages::default()
            .with(&format!("{BASE}/2025"), "<html>redesigned</html>".to_string())
            .with(BASE, table(&[("Monday", "Jan 01", "New Year")]));
        let f = fetcher(pages);
        let rows = f.fetch_year(2025, 2025).await;
        assert!(!rows.explicit_year);
        assert_eq!(rows.year, 2025);
        assert_eq!(rows.rows.len(), 1);
        assert_eq!(
            *f.pages.requested.lock().unwrap(),
            vec![format!("{BASE}/2025"), BASE.to_string()]
        );
    }

    #[tokio::test]
    async fn other_year_without_table_is_empty() {
        let pages = StaticPages::default()
            .with(&format!("{BASE}/2026"), "<html>nothing</html>".to_string())
            .with(BASE, table(&[("Monday", "Jan 01", "New Year")]));
        let f = fetcher(pages);
        let rows = f.fetch_year(2026, 2025).await;
        assert!(rows.is_empty());
        assert_eq!(f.pages.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn network_failure_is_empty_without_fallback() {
        let pages = StaticPages::default().with(BASE, table(&[("Monday", "Jan 01", "New Year")]));
        let f = fetcher(pages);
        let rows = f.fetch_year(2025, 2025).await;
        assert!(rows.is_empty());
        assert_eq!(f.pages.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fallback_without_table_is_empty() {
        let pages = StaticPages::default()
            .with(&format!("{BASE}/2025"), "<html></html>".to_string())
            .with(BASE, "<html></html>".to_string());
        assert!(fetcher(pages).fetch_year(2025, 2025).await.is_empty());
    }

    #[test]
    fn year_url_trims_trailing_slash() {
        let f = HolidayFetcher::new(
            StaticPages::default(),
            TableParser::new("table").unwrap(),
            "https://calendar.test/countries/malaysia/",
        );
        assert_eq!(f.year_url(2026), "https://calendar.test/countries/malaysia/2026");
    }
}
