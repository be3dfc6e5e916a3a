//! Canonical listing schema and aggregate response types.
//!
//! Every platform's raw output is mapped into [`BusListing`]; the
//! orchestrator merges per-platform results into an [`AggregateResponse`]
//! whose counts always satisfy `total == sum(platforms) == combined.len()`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Known booking platforms, plus a catch-all for unrecognized shapes.
///
/// Serializes to the lowercase keys the response envelope uses
/// (`"redbus"`, `"abhibus"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    RedBus,
    AbhiBus,
    Ixigo,
    TravelYaari,
    Other,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::RedBus => "redbus",
            Platform::AbhiBus => "abhibus",
            Platform::Ixigo => "ixigo",
            Platform::TravelYaari => "travelyaari",
            Platform::Other => "other",
        }
    }

    /// Generic homepage for the per-platform click-through in the client.
    /// Listings never carry deep links to a specific fare.
    #[must_use]
    pub fn homepage_url(self) -> Option<&'static str> {
        match self {
            Platform::RedBus => Some("https://www.redbus.in/"),
            Platform::AbhiBus => Some("https://www.abhibus.com/"),
            Platform::Ixigo => Some("https://bus.ixigo.com/"),
            Platform::TravelYaari => Some("https://www.travelyaari.com/"),
            Platform::Other => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized fare row. Created by normalization, never mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusListing {
    pub source_platform: Platform,
    pub operator: String,
    pub bus_type: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    /// Fare in whole rupees, currency symbols and separators stripped.
    pub price: u32,
    pub seats_available: String,
    pub rating: String,
    /// Site-provided accessible label, kept as a classification fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_summary: Option<String>,
}

/// How a single platform's scrape concluded.
///
/// `Failed` and `Empty` both carry zero listings but are distinct: `Empty`
/// means the site reported no service on the route, `Failed` means the
/// automation broke somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Ok,
    Empty,
    Failed,
}

/// One platform's contribution to a search, alive only for the duration of
/// a single orchestrator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub platform: Platform,
    pub listings: Vec<BusListing>,
    pub status: ScrapeStatus,
}

impl ScrapeResult {
    #[must_use]
    pub fn failed(platform: Platform) -> Self {
        Self {
            platform,
            listings: Vec::new(),
            status: ScrapeStatus::Failed,
        }
    }

    #[must_use]
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            listings: Vec::new(),
            status: ScrapeStatus::Empty,
        }
    }
}

/// Merged view over all platforms for one query.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResponse {
    pub total: usize,
    pub platforms: BTreeMap<Platform, usize>,
    pub categorized: BTreeMap<Platform, Vec<BusListing>>,
    pub combined: Vec<BusListing>,
}

impl AggregateResponse {
    /// Builds the merged response from settled per-platform results.
    ///
    /// Listings are kept in per-platform groups exactly as provided (the
    /// orchestrator sorts each group by price before merging); `combined`
    /// is the concatenation in the order the results are given, so the
    /// merge is commutative over task completion order up to group order.
    #[must_use]
    pub fn from_results(results: Vec<ScrapeResult>) -> Self {
        let mut categorized: BTreeMap<Platform, Vec<BusListing>> = BTreeMap::new();
        for result in results {
            categorized
                .entry(result.platform)
                .or_default()
                .extend(result.listings);
        }

        let platforms: BTreeMap<Platform, usize> = categorized
            .iter()
            .map(|(platform, listings)| (*platform, listings.len()))
            .collect();
        let combined: Vec<BusListing> = categorized.values().flatten().cloned().collect();

        Self {
            total: combined.len(),
            platforms,
            categorized,
            combined,
        }
    }
}
