//! Ixigo navigation plan.
//!
//! Ixigo greets fresh sessions with a login modal that blocks every
//! click underneath it, so the plan dismisses it before form fill-in:
//! Escape first, then known close buttons, then DOM removal of the
//! overlay as a last resort. Each step is best-effort.

use async_trait::async_trait;

use busfare_core::{Platform, TravelDate};

use crate::error::ScrapeError;
use crate::machine::{wait_for, SitePlan, StepTimings};
use crate::page::Page;
use crate::types::RawBusRecord;

use busfare_webdriver::keys;

const RESULT_CARD: &str = ".card.service";

const MODAL_CLOSE_BUTTONS: &[&str] = &[
    "button[aria-label=\"Close\"]",
    ".close",
    ".close-btn",
    ".modal-close",
    ".cross",
    ".login-close",
    ".auth-close",
    ".native-login-interface button",
    ".modal-header button",
];

const MODAL_OVERLAYS: &str = ".native-login-interface, .modal-backdrop, .login-modal, \
     .auth-modal, .modal, .overlay, .backdrop";

pub struct IxigoPlan;

#[async_trait]
impl SitePlan for IxigoPlan {
    fn platform(&self) -> Platform {
        Platform::Ixigo
    }

    fn home_url(&self) -> &'static str {
        "https://bus.ixigo.com/"
    }

    fn origin_input(&self) -> &'static str {
        "input[placeholder=\"From Station\"]"
    }

    fn destination_input(&self) -> &'static str {
        "input[placeholder=\"To Station\"]"
    }

    fn results_url_fragment(&self) -> &'static str {
        "/bus_search/"
    }

    async fn pre_search_hook(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.press_key(keys::ESCAPE).await.ok();
        for selector in MODAL_CLOSE_BUTTONS {
            if page.try_click(selector).await.unwrap_or(false) {
                tracing::debug!(selector = *selector, "login modal dismissed");
                return Ok(());
            }
        }
        page.remove_nodes(MODAL_OVERLAYS).await.ok();
        Ok(())
    }

    async fn open_calendar(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click("input[placeholder=\"Onward Journey Date\"]")
            .await?;
        Ok(())
    }

    async fn calendar_header(&self, page: &dyn Page) -> Result<Option<String>, ScrapeError> {
        Ok(page
            .text_of(".container.calendar .col:nth-child(2)")
            .await?)
    }

    async fn advance_month(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click(".calender-month-change").await?;
        Ok(())
    }

    async fn select_day(&self, page: &dyn Page, date: &TravelDate) -> Result<(), ScrapeError> {
        let selector = format!(
            ".container.calendar span[data-date=\"{}\"][data-month=\"{}\"][data-year=\"{}\"]",
            date.day(),
            date.month_number(),
            date.year()
        );
        page.click(&selector).await?;
        Ok(())
    }

    async fn submit(&self, page: &dyn Page) -> Result<(), ScrapeError> {
        page.click("button.btn-search").await?;
        Ok(())
    }

    async fn empty_state(&self, _page: &dyn Page) -> Result<bool, ScrapeError> {
        // Ixigo renders an empty results list instead of a marker.
        Ok(false)
    }

    async fn extract(
        &self,
        page: &dyn Page,
        timings: &StepTimings,
    ) -> Result<Vec<RawBusRecord>, ScrapeError> {
        wait_for(page, RESULT_CARD, timings.extract_wait_secs).await;

        let mut records = Vec::new();
        for card in page.nodes(RESULT_CARD).await? {
            records.push(RawBusRecord {
                operator: card.text_of(".operator-info .title").await?,
                kind: card.text_of(".operator-info .sub-title").await?,
                departure: card.text_of(".departure-time").await?,
                arrival: card.text_of(".arrival-time").await?,
                duration: card.text_of(".travel-time").await?,
                price_text: card.text_of(".fare span").await?,
                seats_available: card
                    .text_of("#service-operator-select-seat-container small, .text-grey small")
                    .await?,
                rating: card.text_of(".lessRating span").await?,
                ..RawBusRecord::default()
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::fake::{FakePage, FakeState};

    #[tokio::test]
    async fn modal_hook_clicks_a_visible_close_button() {
        let mut state = FakeState::default();
        state.present.insert(".modal-close".to_owned());
        let page = FakePage::with_state(state);

        IxigoPlan.pre_search_hook(&page).await.unwrap();

        let state = page.state.lock().unwrap();
        assert_eq!(state.keys_pressed, vec![keys::ESCAPE.to_owned()]);
        assert_eq!(state.clicked, vec![".modal-close".to_owned()]);
        assert!(
            state.removed.is_empty(),
            "DOM removal is the last resort, not the first"
        );
    }

    #[tokio::test]
    async fn modal_hook_falls_back_to_dom_removal() {
        let page = FakePage::with_state(FakeState::default());

        IxigoPlan.pre_search_hook(&page).await.unwrap();

        let state = page.state.lock().unwrap();
        assert_eq!(state.keys_pressed, vec![keys::ESCAPE.to_owned()]);
        assert!(state.clicked.is_empty());
        assert_eq!(state.removed, vec![MODAL_OVERLAYS.to_owned()]);
    }

    #[tokio::test]
    async fn day_selector_is_scoped_to_the_calendar_container() {
        let page = FakePage::with_state(FakeState::default());
        let date = busfare_core::TravelDate::parse("15 February 2026").unwrap();

        IxigoPlan.select_day(&page, &date).await.unwrap();
        let clicked = page.state.lock().unwrap().clicked.clone();
        assert_eq!(
            clicked,
            vec![
                ".container.calendar span[data-date=\"15\"][data-month=\"2\"][data-year=\"2026\"]"
                    .to_owned()
            ]
        );
    }
}
