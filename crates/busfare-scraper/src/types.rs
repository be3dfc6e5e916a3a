//! Raw per-site record shape, before normalization.

use serde::{Deserialize, Serialize};

/// One result row as extracted from a site's DOM, field names preserved
/// per platform: RedBus/AbhiBus/TravelYaari emit `busType` + `seats`,
/// Ixigo emits `type` + `seatsAvailable`, and only some sites tag a
/// `source` string. The normalizer reconciles these into [`BusListing`].
///
/// [`BusListing`]: busfare_core::BusListing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBusRecord {
    pub operator: Option<String>,
    /// `busType` on most platforms.
    pub bus_type: Option<String>,
    /// `type` on Ixigo.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub duration: Option<String>,
    /// Fare as displayed, currency symbol and separators included.
    pub price_text: Option<String>,
    /// `seats` on most platforms.
    pub seats: Option<String>,
    /// `seatsAvailable` on Ixigo.
    pub seats_available: Option<String>,
    pub rating: Option<String>,
    /// Explicit platform tag, when the site scraper sets one.
    pub source: Option<String>,
    /// Accessible label of the whole row, when the site provides one.
    pub summary: Option<String>,
}

/// How one site's state machine run concluded, before normalization.
#[derive(Debug)]
pub enum Outcome {
    /// Results page reached and rows extracted (possibly zero rows).
    Listings(Vec<RawBusRecord>),
    /// Site explicitly reported no service on the route/date.
    Empty,
}
