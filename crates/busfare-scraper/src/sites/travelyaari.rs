//! TravelYaari navigation plan.
//!
//! Differs from the other sites in three ways: autocomplete suggestions
//! render as a sibling list that wants a real click, the calendar is a
//! jQuery UI datepicker with no data attributes on day cells, and the
//! results page keeps the same URL, so arrival is detected by markup
//! instead of a URL fragment.

use async_trait::async_trait;

use busfare_core::{Platform, TravelDate};
use busfare_webdriver::keys;

use crate::error::ScrapeError;
use crate::machine::{wait_for, SitePlan, StepTimings};
use crate::page::Page;
use crate::types::RawBusRecord;

const RESULT_ITEM: &str = ".service-item";
const EMPTY_MARKERS: &str = ".no-bus-found, .error-msg-container";

pub struct TravelYaariPlan;

#[async_trait]
impl SitePlan for TravelYaariPlan {
    fn platform(&self) -> Platform {
        Platform::TravelYaari
    }

    fn home_url(&self) -> &'static str {
        "https://www.travelyaari.com/"
    }

    fn origin_input(&self) -> &'static str {
        "#from-city"
    }

    fn destination_input(&self) -> &'static str {
        "#to-city"
    }

    fn results_url_fragment(&self) -> &'static str {
        "/bus-booking/"
    }

    /// Zero-price rows on TravelYaari are placeholder cards.
    fn filters_zero_price(&self) -> bool {
        true
    }

    /// Clicks the first matched-city suggestion rendered as a sibling of
    /// the input; falls back to keyboard selection when the list never
    /// materialized.
    async fn resolve_suggestion(
        &self,
        page: &dyn Page,
        field_css: &str,
        timings: &StepTimings,
    ) -> Result<(), ScrapeError> {
        page.sleep(timings.suggestion_settle_ms).await;
        let suggestion = format!("{field_css} ~ .atc-city-matched div");
        if page.try_click(&suggestion).await? {
            return Ok(());
        }
        page.press_key(keys::ARROW_DOWN).await?;
        page.press_key(keys::ENTER).await?;
        Ok(())
    }

    async fn open_calendar(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click("#journey_date").await?;
        Ok(())
    }

    async fn calendar_header(&self, page: &dyn Page) -> Result<Option<String>, ScrapeError> {
        let month = page.text_of(".ui-datepicker-month").await?;
        let year = page.text_of(".ui-datepicker-year").await?;
        Ok(match (month, year) {
            (Some(month), Some(year)) => Some(format!("{month} {year}")),
            _ => None,
        })
    }

    async fn advance_month(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click(".ui-datepicker-next").await?;
        Ok(())
    }

    /// Day cells have no data attributes, so the pick walks the visible
    /// cells and matches on rendered text.
    async fn select_day(&self, page: &dyn Page, date: &TravelDate) -> Result<(), ScrapeError> {
        let wanted = date.day().to_string();
        for cell in page.nodes(".ui-datepicker-calendar td a").await? {
            if cell.text().await?.trim() == wanted {
                cell.click().await?;
                return Ok(());
            }
        }
        Err(ScrapeError::MissingElement {
            selector: format!(".ui-datepicker-calendar td a (day {wanted})"),
        })
    }

    async fn submit(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click("#search_btn").await?;
        Ok(())
    }

    /// The results page keeps the search URL, so arrival is "either a
    /// service item or an explicit empty marker rendered".
    async fn await_results(
        &self,
        page: &dyn Page,
        timings: &StepTimings,
    ) -> Result<(), ScrapeError> {
        let settled = format!("{RESULT_ITEM}, {EMPTY_MARKERS}");
        let arrived = wait_for(page, &settled, timings.submit_timeout_secs).await;
        if arrived {
            Ok(())
        } else {
            Err(ScrapeError::SubmissionTimeout {
                secs: timings.submit_timeout_secs,
            })
        }
    }

    async fn empty_state(&self, page: &dyn Page) -> Result<bool, ScrapeError> {
        Ok(page.exists(EMPTY_MARKERS).await?)
    }

    async fn extract(
        &self,
        page: &dyn Page,
        timings: &StepTimings,
    ) -> Result<Vec<RawBusRecord>, ScrapeError> {
        wait_for(page, RESULT_ITEM, timings.extract_wait_secs).await;

        // Service cards below the fold render on scroll.
        page.scroll_by(800).await?;
        page.sleep(timings.results_settle_ms).await;

        let mut records = Vec::new();
        for item in page.nodes(RESULT_ITEM).await? {
            records.push(RawBusRecord {
                operator: item.text_of(".bus-name").await?,
                bus_type: item.text_of(".bus-type").await?,
                departure: item.text_of(".dept-time").await?,
                arrival: item.text_of(".arr-time").await?,
                duration: item.text_of(".duration").await?,
                price_text: item.text_of(".fare").await?,
                seats: item.text_of(".seat-left").await?,
                rating: item.text_of(".rating-box").await?,
                source: Some("TravelYaari".to_owned()),
                ..RawBusRecord::default()
            });
        }
        Ok(records)
    }
}
