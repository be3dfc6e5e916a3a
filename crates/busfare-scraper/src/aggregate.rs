//! Fan-in: merge settled per-platform results into one response.

use busfare_core::{AggregateResponse, ScrapeResult};

/// Merges settled per-site results into the aggregate view.
///
/// Listings within each platform are sorted by ascending price (stable,
/// so equal fares keep extraction order); empty and failed platforms
/// contribute an empty bucket. Merge order does not affect the output
/// beyond per-platform grouping, so results may arrive in any completion
/// order.
#[must_use]
pub fn aggregate(mut results: Vec<ScrapeResult>) -> AggregateResponse {
    for result in &mut results {
        result.listings.sort_by_key(|listing| listing.price);
    }
    AggregateResponse::from_results(results)
}

#[cfg(test)]
mod tests {
    use busfare_core::{BusListing, Platform, ScrapeStatus};

    use super::*;

    fn listing(platform: Platform, operator: &str, price: u32) -> BusListing {
        BusListing {
            source_platform: platform,
            operator: operator.to_owned(),
            bus_type: "AC Sleeper".to_owned(),
            departure_time: "21:00".to_owned(),
            arrival_time: "05:30".to_owned(),
            duration: "8h 30m".to_owned(),
            price,
            seats_available: "10".to_owned(),
            rating: "4.2".to_owned(),
            raw_summary: None,
        }
    }

    fn ok(platform: Platform, listings: Vec<BusListing>) -> ScrapeResult {
        ScrapeResult {
            platform,
            listings,
            status: ScrapeStatus::Ok,
        }
    }

    #[test]
    fn listings_sorted_by_price_within_platform() {
        let response = aggregate(vec![ok(
            Platform::RedBus,
            vec![
                listing(Platform::RedBus, "B", 700),
                listing(Platform::RedBus, "A", 500),
                listing(Platform::RedBus, "C", 650),
            ],
        )]);
        let prices: Vec<u32> = response.categorized[&Platform::RedBus]
            .iter()
            .map(|l| l.price)
            .collect();
        assert_eq!(prices, vec![500, 650, 700]);
    }

    #[test]
    fn equal_prices_keep_extraction_order() {
        let response = aggregate(vec![ok(
            Platform::Ixigo,
            vec![
                listing(Platform::Ixigo, "First", 600),
                listing(Platform::Ixigo, "Second", 600),
            ],
        )]);
        let operators: Vec<&str> = response.categorized[&Platform::Ixigo]
            .iter()
            .map(|l| l.operator.as_str())
            .collect();
        assert_eq!(operators, vec!["First", "Second"]);
    }

    #[test]
    fn merge_is_order_insensitive() {
        let a = ok(Platform::RedBus, vec![listing(Platform::RedBus, "A", 500)]);
        let b = ok(Platform::AbhiBus, vec![listing(Platform::AbhiBus, "B", 450)]);
        let forward = aggregate(vec![a.clone(), b.clone()]);
        let backward = aggregate(vec![b, a]);
        assert_eq!(
            serde_json::to_value(&forward).unwrap(),
            serde_json::to_value(&backward).unwrap()
        );
    }

    #[test]
    fn failed_platforms_contribute_empty_buckets() {
        let response = aggregate(vec![
            ok(Platform::RedBus, vec![listing(Platform::RedBus, "A", 500)]),
            ScrapeResult::failed(Platform::AbhiBus),
        ]);
        assert_eq!(response.total, 1);
        assert!(response.categorized[&Platform::AbhiBus].is_empty());
        assert_eq!(response.platforms[&Platform::RedBus], 1);
        assert_eq!(response.platforms[&Platform::AbhiBus], 0);
    }
}
