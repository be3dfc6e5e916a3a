//! Raw record cleanup: price parsing, field reconciliation, and
//! platform classification.

use busfare_core::{BusListing, Platform};

use crate::types::RawBusRecord;

const NOT_AVAILABLE: &str = "N/A";

/// Parses a displayed fare into a numeric price.
///
/// Strips every non-digit character (currency symbols, thousands
/// separators, whitespace) and parses the remainder. Unparseable or
/// absent input yields 0, never an error; 0 doubles as the
/// "price unknown" marker downstream.
#[must_use]
pub fn parse_price(text: Option<&str>) -> u32 {
    let Some(text) = text else { return 0 };
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Attributes a record to a platform from its raw fields.
///
/// Used when a record arrives without a trusted platform tag: the Ixigo
/// field shape (`seatsAvailable`/`type`) wins first, then substring
/// checks on the `source` tag, else [`Platform::Other`].
#[must_use]
pub fn classify(record: &RawBusRecord) -> Platform {
    if record.seats_available.is_some() || record.kind.is_some() {
        return Platform::Ixigo;
    }
    let source = record.source.as_deref().unwrap_or("").to_lowercase();
    if source.contains("abhi") {
        Platform::AbhiBus
    } else if source.contains("red") {
        Platform::RedBus
    } else if source.contains("yaari") || source.contains("travel") {
        Platform::TravelYaari
    } else {
        Platform::Other
    }
}

fn or_na(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE.to_owned(),
    }
}

/// Converts one raw record into a canonical [`BusListing`].
///
/// Reconciles the per-site field variants (`busType` vs `type`, `seats`
/// vs `seatsAvailable`), parses the price, and defaults every missing
/// textual field to `"N/A"`. When `platform` is `None` the record is
/// attributed via [`classify`].
#[must_use]
pub fn normalize_record(record: RawBusRecord, platform: Option<Platform>) -> BusListing {
    let source_platform = platform.unwrap_or_else(|| classify(&record));
    let price = parse_price(record.price_text.as_deref());
    BusListing {
        source_platform,
        operator: or_na(record.operator),
        bus_type: or_na(record.bus_type.or(record.kind)),
        departure_time: or_na(record.departure),
        arrival_time: or_na(record.arrival),
        duration: or_na(record.duration),
        price,
        seats_available: or_na(record.seats.or(record.seats_available)),
        rating: or_na(record.rating),
        raw_summary: record.summary,
    }
}
