//! RedBus navigation plan.
//!
//! RedBus ships hashed CSS class names (`tupleWrapper___d5a78a`), so
//! every selector here matches on the stable class prefix with
//! `[class*=...]` instead of the full hashed name.

use async_trait::async_trait;

use busfare_core::{Platform, TravelDate};

use crate::error::ScrapeError;
use crate::machine::{wait_for, SitePlan, StepTimings};
use crate::page::Page;
use crate::types::RawBusRecord;

const RESULT_CARD: &str = "li[class*=\"tupleWrapper\"]";
const RESULTS_READY: &str = "[data-autoid=\"inv-wrap\"]";
const EMPTY_TITLE: &str = "[class*=\"titleSection\"]";

pub struct RedBusPlan;

#[async_trait]
impl SitePlan for RedBusPlan {
    fn platform(&self) -> Platform {
        Platform::RedBus
    }

    fn home_url(&self) -> &'static str {
        "https://www.redbus.in/"
    }

    fn origin_input(&self) -> &'static str {
        "#srcinput"
    }

    fn destination_input(&self) -> &'static str {
        "#destinput"
    }

    fn results_url_fragment(&self) -> &'static str {
        "/bus-tickets/"
    }

    async fn open_calendar(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click("[class*=\"dateInputWrapper\"]").await?;
        Ok(())
    }

    async fn calendar_header(&self, page: &dyn Page) -> Result<Option<String>, ScrapeError> {
        Ok(page.text_of("[class*=\"monthYear\"]").await?)
    }

    async fn advance_month(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click(".icon-arrow[class*=\"right\"]").await?;
        Ok(())
    }

    async fn select_day(&self, page: &dyn Page, date: &TravelDate) -> Result<(), ScrapeError> {
        // Day cells carry labels like "February 15, 2026".
        let selector = format!(
            "div.calendarDate[aria-label*=\"{} {}\"]",
            date.month_name(),
            date.day()
        );
        page.click(&selector).await?;
        Ok(())
    }

    async fn submit(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click("button[class*=\"searchButtonWrapper\"]").await?;
        Ok(())
    }

    async fn empty_state(&self, page: &dyn Page) -> Result<bool, ScrapeError> {
        match page.text_of(EMPTY_TITLE).await? {
            Some(text) => Ok(text.contains("Oops!!") || text.contains("No buses found")),
            None => Ok(false),
        }
    }

    async fn extract(
        &self,
        page: &dyn Page,
        timings: &StepTimings,
    ) -> Result<Vec<RawBusRecord>, ScrapeError> {
        wait_for(page, RESULTS_READY, timings.extract_wait_secs).await;

        // The inventory list renders lazily; a small scroll kicks it off.
        page.scroll_by(400).await?;
        page.sleep(timings.results_settle_ms).await;

        let mut records = Vec::new();
        for card in page.nodes(RESULT_CARD).await? {
            records.push(RawBusRecord {
                operator: card.text_of("[class*=\"travelsName\"]").await?,
                bus_type: card.text_of("[class*=\"busType\"]").await?,
                departure: card.text_of("[class*=\"boardingTime\"]").await?,
                arrival: card.text_of("[class*=\"droppingTime\"]").await?,
                duration: card.text_of("[class*=\"duration___\"]").await?,
                price_text: card.text_of("[class*=\"finalFare\"]").await?,
                seats: card.text_of("[class*=\"totalSeats\"]").await?,
                rating: card.text_of("[class*=\"rating___\"]").await?,
                source: Some("RedBus".to_owned()),
                summary: card.attribute("aria-label").await?,
                ..RawBusRecord::default()
            });
        }
        Ok(records)
    }
}
