//! Shared navigation state machine.
//!
//! Every platform runs the same ordered steps:
//!
//! ```text
//! NavigateHome -> FillOrigin -> ResolveOriginSuggestion
//!   -> FillDestination -> ResolveDestinationSuggestion
//!   -> OpenCalendar -> PageToTargetMonth -> SelectDay
//!   -> Submit -> AwaitResultsRoute -> CheckEmptyState -> ExtractListings
//! ```
//!
//! with selectors, month representation, and extraction supplied per
//! platform by a [`SitePlan`]. Nothing is retried: a single failure at any
//! step funnels to an error terminal and yields an empty result for that
//! platform only. The browser session is released on every terminal path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use busfare_core::{AppConfig, BusListing, Platform, ScrapeResult, ScrapeStatus, SearchQuery, TravelDate};
use busfare_webdriver::{keys, BrowserConfig, WebDriverClient};

use crate::error::ScrapeError;
use crate::normalize::normalize_record;
use crate::page::{Page, WebDriverPage};
use crate::types::{Outcome, RawBusRecord};

/// Upper bound on "next month" advances: one year of paging.
pub const MAX_CALENDAR_PAGES: u32 = 12;

/// Per-step wait bounds for one scrape run.
#[derive(Debug, Clone)]
pub struct StepTimings {
    pub suggestion_settle_ms: u64,
    pub calendar_transition_ms: u64,
    pub submit_timeout_secs: u64,
    pub submit_poll_ms: u64,
    pub results_settle_ms: u64,
    pub extract_wait_secs: u64,
}

impl StepTimings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            suggestion_settle_ms: config.suggestion_settle_ms,
            calendar_transition_ms: config.calendar_transition_ms,
            submit_timeout_secs: config.submit_timeout_secs,
            submit_poll_ms: config.submit_poll_ms,
            results_settle_ms: config.results_settle_ms,
            extract_wait_secs: config.extract_wait_secs,
        }
    }

    /// Near-zero waits, for driving the machine against fakes in tests.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            suggestion_settle_ms: 0,
            calendar_transition_ms: 0,
            submit_timeout_secs: 0,
            submit_poll_ms: 0,
            results_settle_ms: 0,
            extract_wait_secs: 0,
        }
    }
}

/// Site-specific half of the state machine: selectors, month
/// representation, empty-state markers, and extraction for one platform.
///
/// Default implementations cover the behavior most sites share (keyboard
/// suggestion selection, contains-match calendar headers, URL-fragment
/// result detection); plans override only where their site differs.
#[async_trait]
pub trait SitePlan: Send + Sync {
    fn platform(&self) -> Platform;

    fn home_url(&self) -> &'static str;

    fn origin_input(&self) -> &'static str;

    fn destination_input(&self) -> &'static str;

    /// URL fragment that identifies the results route after submission.
    fn results_url_fragment(&self) -> &'static str;

    /// Whether zero-price rows are dropped as extraction noise.
    fn filters_zero_price(&self) -> bool {
        false
    }

    /// Runs before form fill-in (e.g. dismissing a login modal).
    async fn pre_search_hook(&self, _page: &dyn Page) -> Result<(), ScrapeError> {
        Ok(())
    }

    /// Resolves the autocomplete suggestion for a just-filled location
    /// field. The deterministic policy is "first visible suggestion";
    /// the default waits a bounded settle time and picks it with
    /// ArrowDown + Enter. If no list appeared the keys are pressed
    /// anyway, best-effort, since some sites auto-select on blur.
    async fn resolve_suggestion(
        &self,
        page: &dyn Page,
        field_css: &str,
        timings: &StepTimings,
    ) -> Result<(), ScrapeError> {
        let _ = field_css;
        page.sleep(timings.suggestion_settle_ms).await;
        page.press_key(keys::ARROW_DOWN).await?;
        page.press_key(keys::ENTER).await?;
        Ok(())
    }

    async fn open_calendar(&self, page: &dyn Page) -> Result<(), ScrapeError>;

    /// Currently displayed month+year label, `None` when the header
    /// element is absent.
    async fn calendar_header(&self, page: &dyn Page) -> Result<Option<String>, ScrapeError>;

    fn header_matches(&self, header: &str, date: &TravelDate) -> bool {
        header.contains(date.month_name()) && header.contains(&date.year().to_string())
    }

    /// Triggers the "next month" control.
    async fn advance_month(&self, page: &dyn Page) -> Result<(), ScrapeError>;

    /// Clicks the exact day cell for day+month+year. Precise match only;
    /// no nearest-date fallback.
    async fn select_day(&self, page: &dyn Page, date: &TravelDate) -> Result<(), ScrapeError>;

    async fn submit(&self, page: &dyn Page) -> Result<(), ScrapeError>;

    /// Waits for the results route after submission. The default polls
    /// the current URL for [`Self::results_url_fragment`] under the
    /// submit timeout; the click has already fired when polling starts,
    /// so a fast navigation cannot be missed.
    async fn await_results(
        &self,
        page: &dyn Page,
        timings: &StepTimings,
    ) -> Result<(), ScrapeError> {
        let deadline = Instant::now() + Duration::from_secs(timings.submit_timeout_secs);
        loop {
            let url = page.current_url().await?;
            if url.contains(self.results_url_fragment()) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ScrapeError::SubmissionTimeout {
                    secs: timings.submit_timeout_secs,
                });
            }
            page.sleep(timings.submit_poll_ms).await;
        }
    }

    /// Site-specific "no services on this route" indicator. Returning
    /// `true` terminates the run in the Empty state, which is not an
    /// error.
    async fn empty_state(&self, page: &dyn Page) -> Result<bool, ScrapeError>;

    async fn extract(
        &self,
        page: &dyn Page,
        timings: &StepTimings,
    ) -> Result<Vec<RawBusRecord>, ScrapeError>;
}

/// Drives the full step sequence for one plan on one page.
///
/// # Errors
///
/// Returns the first [`ScrapeError`] hit at any step; callers convert it
/// into a failed [`ScrapeResult`] at the scraper boundary.
pub async fn run_scrape(
    plan: &dyn SitePlan,
    page: &dyn Page,
    query: &SearchQuery,
    timings: &StepTimings,
) -> Result<Outcome, ScrapeError> {
    let platform = plan.platform();
    tracing::info!(
        %platform,
        origin = %query.origin,
        destination = %query.destination,
        date = %query.travel_date,
        "starting scrape"
    );

    page.goto(plan.home_url())
        .await
        .map_err(|source| ScrapeError::Navigation {
            url: plan.home_url().to_owned(),
            source,
        })?;
    plan.pre_search_hook(page).await?;

    page.type_text(plan.origin_input(), &query.origin).await?;
    plan.resolve_suggestion(page, plan.origin_input(), timings)
        .await?;
    page.type_text(plan.destination_input(), &query.destination)
        .await?;
    plan.resolve_suggestion(page, plan.destination_input(), timings)
        .await?;

    plan.open_calendar(page).await?;
    page_to_target_month(plan, page, &query.travel_date, timings).await?;
    plan.select_day(page, &query.travel_date).await?;
    tracing::debug!(%platform, date = %query.travel_date, "day selected");

    plan.submit(page).await?;
    plan.await_results(page, timings).await?;
    page.sleep(timings.results_settle_ms).await;

    if plan.empty_state(page).await? {
        tracing::info!(%platform, "site reports no services on this route");
        return Ok(Outcome::Empty);
    }

    let records = plan.extract(page, timings).await?;
    tracing::info!(%platform, count = records.len(), "extracted raw listings");
    Ok(Outcome::Listings(records))
}

/// Calendar paging loop: read the displayed month+year, advance until it
/// matches the target, bounded by [`MAX_CALENDAR_PAGES`] advances.
async fn page_to_target_month(
    plan: &dyn SitePlan,
    page: &dyn Page,
    date: &TravelDate,
    timings: &StepTimings,
) -> Result<(), ScrapeError> {
    let mut advances = 0u32;
    loop {
        if let Some(header) = plan.calendar_header(page).await? {
            if plan.header_matches(&header, date) {
                return Ok(());
            }
        }
        if advances == MAX_CALENDAR_PAGES {
            return Err(ScrapeError::CalendarPaging {
                pages: MAX_CALENDAR_PAGES,
                target: date.month_year_label(),
            });
        }
        plan.advance_month(page).await?;
        advances += 1;
        page.sleep(timings.calendar_transition_ms).await;
    }
}

/// Polls for any match of `css`, bounded by `timeout_secs`. Returns
/// whether a match appeared; never errors on absence, so sites whose
/// result markup renders late can tolerate it.
pub(crate) async fn wait_for(page: &dyn Page, css: &str, timeout_secs: u64) -> bool {
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    loop {
        match page.exists(css).await {
            Ok(true) => return true,
            Ok(false) | Err(_) => {}
        }
        if Instant::now() >= deadline {
            return false;
        }
        page.sleep(250).await;
    }
}

/// Runs the state machine on an already-acquired page and converts the
/// outcome at the failure boundary: this function never errors. The page
/// is closed on every path; a teardown failure is swallowed and logged.
pub async fn scrape_with_page(
    plan: &dyn SitePlan,
    page: &dyn Page,
    query: &SearchQuery,
    timings: &StepTimings,
) -> ScrapeResult {
    let platform = plan.platform();
    let outcome = run_scrape(plan, page, query, timings).await;

    if let Err(error) = page.close().await {
        tracing::warn!(%platform, error = %error, "browser session teardown failed");
    }

    match outcome {
        Ok(Outcome::Empty) => ScrapeResult::empty(platform),
        Ok(Outcome::Listings(records)) => {
            let mut listings: Vec<BusListing> = records
                .into_iter()
                .map(|record| normalize_record(record, Some(platform)))
                .collect();
            if plan.filters_zero_price() {
                listings.retain(|listing| listing.price > 0);
            }
            ScrapeResult {
                platform,
                listings,
                status: ScrapeStatus::Ok,
            }
        }
        Err(error) => {
            tracing::warn!(%platform, error = %error, "scrape failed");
            ScrapeResult::failed(platform)
        }
    }
}

/// One dispatchable automation unit: converts a query into a settled
/// per-platform result, never an error.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    fn platform(&self) -> Platform;

    async fn scrape(&self, query: &SearchQuery) -> ScrapeResult;
}

/// Production [`SiteScraper`]: owns a browser session end-to-end per run,
/// acquired from the shared WebDriver endpoint with an explicit
/// per-session [`BrowserConfig`].
pub struct PlanScraper {
    plan: Arc<dyn SitePlan>,
    client: WebDriverClient,
    browser: BrowserConfig,
    timings: StepTimings,
}

impl PlanScraper {
    #[must_use]
    pub fn new(
        plan: Arc<dyn SitePlan>,
        client: WebDriverClient,
        browser: BrowserConfig,
        timings: StepTimings,
    ) -> Self {
        Self {
            plan,
            client,
            browser,
            timings,
        }
    }
}

#[async_trait]
impl SiteScraper for PlanScraper {
    fn platform(&self) -> Platform {
        self.plan.platform()
    }

    async fn scrape(&self, query: &SearchQuery) -> ScrapeResult {
        let platform = self.plan.platform();
        let session = match self.client.new_session(&self.browser).await {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(%platform, error = %error, "browser session could not be started");
                return ScrapeResult::failed(platform);
            }
        };
        let page = WebDriverPage::new(session);
        scrape_with_page(self.plan.as_ref(), &page, query, &self.timings).await
    }
}
