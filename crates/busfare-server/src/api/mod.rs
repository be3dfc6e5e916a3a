//! HTTP boundary: one search endpoint plus a health probe.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use busfare_core::{AppConfig, BusListing, Platform, SearchQuery};
use busfare_scraper::{default_plans, orchestrator, PlanScraper, SiteScraper, StepTimings};
use busfare_webdriver::{BrowserConfig, WebDriverClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub scrapers: Arc<Vec<Arc<dyn SiteScraper>>>,
}

/// Search request body; every field is optional and falls back to the
/// configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub source: Option<String>,
    pub destination: Option<String>,
    /// Travel date as `"<day> <MonthName> <year>"`, e.g. `"15 February 2026"`.
    pub date: Option<String>,
}

/// Response envelope. `success` reflects whether the request was
/// dispatched, not whether any platform produced listings; a run where
/// every site failed still reports `success: true` with zero totals.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub summary: SearchSummary,
    pub data: BTreeMap<Platform, Vec<BusListing>>,
    pub combined: Vec<BusListing>,
}

#[derive(Debug, Serialize)]
pub struct SearchSummary {
    pub total: usize,
    pub platforms: BTreeMap<Platform, usize>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                success: false,
                message: message.into(),
            }),
        )
    }
}

/// Builds the production scraper set: one [`PlanScraper`] per supported
/// platform, sharing the WebDriver endpoint and timing configuration.
///
/// # Errors
///
/// Returns [`busfare_webdriver::WebDriverError`] if the underlying HTTP
/// client cannot be constructed.
pub fn build_default_scrapers(
    config: &AppConfig,
) -> Result<Vec<Arc<dyn SiteScraper>>, busfare_webdriver::WebDriverError> {
    let client = WebDriverClient::new(&config.webdriver_url, config.webdriver_timeout_secs)?;
    let browser = BrowserConfig {
        headless: config.browser_headless,
        user_agent: config.browser_user_agent.clone(),
        window_width: config.browser_window_width,
        window_height: config.browser_window_height,
        extra_args: Vec::new(),
    };
    let timings = StepTimings::from_config(config);

    Ok(default_plans()
        .into_iter()
        .map(|plan| {
            Arc::new(PlanScraper::new(
                plan,
                client.clone(),
                browser.clone(),
                timings.clone(),
            )) as Arc<dyn SiteScraper>
        })
        .collect())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/bus", post(search))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(
    State(state): State<AppState>,
    body: Option<Json<SearchRequest>>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ApiError>)> {
    let Json(request) = body.unwrap_or_default();
    let config = &state.config;

    let origin = request
        .source
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.default_origin.clone());
    let destination = request
        .destination
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.default_destination.clone());
    let date = request
        .date
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.default_travel_date.clone());

    let query = SearchQuery::new(origin, destination, &date)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let response = orchestrator::run(&state.scrapers, &query).await;
    Ok(Json(SearchResponse {
        success: true,
        summary: SearchSummary {
            total: response.total,
            platforms: response.platforms,
        },
        data: response.categorized,
        combined: response.combined,
    }))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use busfare_core::{ScrapeResult, ScrapeStatus};

    use super::*;

    struct StubScraper {
        platform: Platform,
        listings: Vec<BusListing>,
    }

    #[async_trait]
    impl SiteScraper for StubScraper {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn scrape(&self, _query: &SearchQuery) -> ScrapeResult {
            ScrapeResult {
                platform: self.platform,
                listings: self.listings.clone(),
                status: ScrapeStatus::Ok,
            }
        }
    }

    fn listing(platform: Platform, price: u32) -> BusListing {
        BusListing {
            source_platform: platform,
            operator: "Neeta Travels".to_owned(),
            bus_type: "AC Sleeper".to_owned(),
            departure_time: "22:00".to_owned(),
            arrival_time: "05:00".to_owned(),
            duration: "07h".to_owned(),
            price,
            seats_available: "9 Seats Left".to_owned(),
            rating: "4.1".to_owned(),
            raw_summary: None,
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            env: busfare_core::Environment::Test,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_owned(),
            webdriver_url: "http://127.0.0.1:9515".to_owned(),
            webdriver_timeout_secs: 1,
            browser_headless: true,
            browser_user_agent: "test".to_owned(),
            browser_window_width: 1280,
            browser_window_height: 800,
            suggestion_settle_ms: 0,
            calendar_transition_ms: 0,
            submit_timeout_secs: 0,
            submit_poll_ms: 0,
            results_settle_ms: 0,
            extract_wait_secs: 0,
            default_origin: "khed".to_owned(),
            default_destination: "Pune".to_owned(),
            default_travel_date: "15 February 2026".to_owned(),
        }
    }

    fn state_with(scrapers: Vec<Arc<dyn SiteScraper>>) -> AppState {
        AppState {
            config: Arc::new(test_config()),
            scrapers: Arc::new(scrapers),
        }
    }

    #[tokio::test]
    async fn search_merges_platforms_into_the_envelope() {
        let state = state_with(vec![
            Arc::new(StubScraper {
                platform: Platform::RedBus,
                listings: vec![listing(Platform::RedBus, 700), listing(Platform::RedBus, 500)],
            }),
            Arc::new(StubScraper {
                platform: Platform::AbhiBus,
                listings: vec![listing(Platform::AbhiBus, 450)],
            }),
        ]);

        let request = SearchRequest {
            source: Some("khed".to_owned()),
            destination: Some("Pune".to_owned()),
            date: Some("15 February 2026".to_owned()),
        };
        let Json(response) = search(State(state), Some(Json(request))).await.unwrap();

        assert!(response.success);
        assert_eq!(response.summary.total, 3);
        assert_eq!(response.summary.platforms[&Platform::RedBus], 2);
        assert_eq!(response.summary.platforms[&Platform::AbhiBus], 1);
        assert_eq!(response.combined.len(), 3);
        let redbus_prices: Vec<u32> = response.data[&Platform::RedBus]
            .iter()
            .map(|l| l.price)
            .collect();
        assert_eq!(redbus_prices, vec![500, 700]);
    }

    #[tokio::test]
    async fn missing_body_falls_back_to_configured_defaults() {
        let state = state_with(vec![Arc::new(StubScraper {
            platform: Platform::Ixigo,
            listings: vec![listing(Platform::Ixigo, 600)],
        })]);

        let Json(response) = search(State(state), None).await.unwrap();
        assert!(response.success);
        assert_eq!(response.summary.total, 1);
    }

    #[tokio::test]
    async fn blank_fields_fall_back_to_configured_defaults() {
        let state = state_with(vec![Arc::new(StubScraper {
            platform: Platform::RedBus,
            listings: vec![],
        })]);

        let request = SearchRequest {
            source: Some("  ".to_owned()),
            destination: None,
            date: Some(String::new()),
        };
        let result = search(State(state), Some(Json(request))).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn malformed_date_is_a_bad_request() {
        let state = state_with(vec![]);

        let request = SearchRequest {
            source: None,
            destination: None,
            date: Some("sometime next week".to_owned()),
        };
        let error = search(State(state), Some(Json(request))).await.unwrap_err();
        assert_eq!(error.0, StatusCode::BAD_REQUEST);
        assert!(!error.1.success);
    }

    #[tokio::test]
    async fn all_platforms_failing_is_still_a_successful_response() {
        struct FailingScraper(Platform);

        #[async_trait]
        impl SiteScraper for FailingScraper {
            fn platform(&self) -> Platform {
                self.0
            }

            async fn scrape(&self, _query: &SearchQuery) -> ScrapeResult {
                ScrapeResult::failed(self.0)
            }
        }

        let state = state_with(vec![
            Arc::new(FailingScraper(Platform::RedBus)),
            Arc::new(FailingScraper(Platform::AbhiBus)),
        ]);

        let Json(response) = search(State(state), None).await.unwrap();
        assert!(response.success);
        assert_eq!(response.summary.total, 0);
        assert!(response.combined.is_empty());
    }
}
