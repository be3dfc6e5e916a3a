use thiserror::Error;

use crate::page::PageError;

/// Failures inside one site's scrape. Every variant is caught at the
/// scraper boundary and converted to an empty, failed result for that
/// platform only; nothing propagates to the orchestrator as an error.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: PageError,
    },

    #[error("calendar paging exhausted {pages} advances without reaching {target}")]
    CalendarPaging { pages: u32, target: String },

    #[error("no navigation to results route within {secs}s")]
    SubmissionTimeout { secs: u64 },

    #[error("expected result markup absent: {0}")]
    Extraction(String),

    #[error("required element not found: {selector}")]
    MissingElement { selector: String },

    #[error("page driver error: {0}")]
    Page(#[from] PageError),

    #[error("browser session could not be started: {0}")]
    Session(#[from] busfare_webdriver::WebDriverError),
}
