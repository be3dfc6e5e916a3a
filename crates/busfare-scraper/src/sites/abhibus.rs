//! AbhiBus navigation plan.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use busfare_core::{Platform, TravelDate};

use crate::error::ScrapeError;
use crate::machine::{wait_for, SitePlan, StepTimings};
use crate::page::Page;
use crate::types::RawBusRecord;

const RESULT_CARD: &str = ".card.service";

static SEATS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*Seats\s*Left").expect("valid seats regex"));

pub struct AbhiBusPlan;

#[async_trait]
impl SitePlan for AbhiBusPlan {
    fn platform(&self) -> Platform {
        Platform::AbhiBus
    }

    fn home_url(&self) -> &'static str {
        "https://www.abhibus.com/"
    }

    fn origin_input(&self) -> &'static str {
        "input[placeholder=\"Leaving From\"]"
    }

    fn destination_input(&self) -> &'static str {
        "input[placeholder=\"Going To\"]"
    }

    fn results_url_fragment(&self) -> &'static str {
        "/bus_search/"
    }

    /// Zero-price rows on AbhiBus are sold-out or placeholder cards.
    fn filters_zero_price(&self) -> bool {
        true
    }

    async fn open_calendar(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click("input[placeholder=\"Onward Journey Date\"]")
            .await?;
        Ok(())
    }

    async fn calendar_header(&self, page: &dyn Page) -> Result<Option<String>, ScrapeError> {
        Ok(page.text_of(".container.month .col:nth-child(2)").await?)
    }

    async fn advance_month(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click(".calender-month-change").await?;
        Ok(())
    }

    async fn select_day(&self, page: &dyn Page, date: &TravelDate) -> Result<(), ScrapeError> {
        // Day cells carry unpadded data attributes: data-month="2", not "02".
        let selector = format!(
            "a[data-date=\"{}\"][data-month=\"{}\"][data-year=\"{}\"]",
            date.day(),
            date.month_number(),
            date.year()
        );
        page.click(&selector).await?;
        Ok(())
    }

    async fn submit(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click("#search-button a.button").await?;
        Ok(())
    }

    async fn empty_state(&self, page: &dyn Page) -> Result<bool, ScrapeError> {
        match page.text_of("h5").await? {
            Some(text) => Ok(text.contains("no services on this route")),
            None => Ok(false),
        }
    }

    async fn extract(
        &self,
        page: &dyn Page,
        timings: &StepTimings,
    ) -> Result<Vec<RawBusRecord>, ScrapeError> {
        wait_for(page, ".card", timings.extract_wait_secs).await;

        let mut records = Vec::new();
        for card in page.nodes(RESULT_CARD).await? {
            // Seat availability is loose text inside .seat-info.
            let seats = match card.text_of(".seat-info").await? {
                Some(text) => SEATS_RE
                    .find(&text)
                    .map(|needle| needle.as_str().to_owned()),
                None => None,
            };
            records.push(RawBusRecord {
                operator: card.text_of(".title").await?,
                bus_type: card.text_of(".sub-title").await?,
                departure: card.text_of(".departure-time").await?,
                arrival: card.text_of(".arrival-time").await?,
                duration: card.text_of(".travel-time span").await?,
                price_text: card.text_of(".fare.text-neutral-800").await?,
                seats,
                rating: card.text_of(".service-rating span").await?,
                source: Some("AbhiBus".to_owned()),
                ..RawBusRecord::default()
            });
        }
        Ok(records)
    }
}
