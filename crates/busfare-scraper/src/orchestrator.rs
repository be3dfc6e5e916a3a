//! Fan-out/fan-in dispatch over the registered site scrapers.

use std::sync::Arc;

use futures::future::join_all;

use busfare_core::{AggregateResponse, ScrapeResult, SearchQuery};

use crate::aggregate::aggregate;
use crate::machine::SiteScraper;

/// Runs every registered scraper concurrently for one query and merges
/// the settled results.
///
/// One task is spawned per scraper and all are awaited to completion;
/// there is no short-circuit and no cross-task cancellation. A scraper
/// that panics is caught at the join boundary and recorded as a failed
/// result for its platform, so one misbehaving site can never take down
/// the batch. This function itself never errors.
pub async fn run(scrapers: &[Arc<dyn SiteScraper>], query: &SearchQuery) -> AggregateResponse {
    let handles: Vec<_> = scrapers
        .iter()
        .map(|scraper| {
            let scraper = Arc::clone(scraper);
            let query = query.clone();
            let platform = scraper.platform();
            (
                platform,
                tokio::spawn(async move { scraper.scrape(&query).await }),
            )
        })
        .collect();

    let platforms: Vec<_> = handles.iter().map(|(platform, _)| *platform).collect();
    let joined = join_all(handles.into_iter().map(|(_, handle)| handle)).await;

    let results: Vec<ScrapeResult> = platforms
        .into_iter()
        .zip(joined)
        .map(|(platform, joined)| match joined {
            Ok(result) => result,
            Err(join_error) => {
                tracing::error!(%platform, error = %join_error, "scrape task aborted");
                ScrapeResult::failed(platform)
            }
        })
        .collect();

    let response = aggregate(results);
    tracing::info!(
        total = response.total,
        origin = %query.origin,
        destination = %query.destination,
        date = %query.travel_date,
        "search complete"
    );
    response
}
