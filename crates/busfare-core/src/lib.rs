pub mod app_config;
pub mod config;
pub mod listing;
pub mod query;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use listing::{AggregateResponse, BusListing, Platform, ScrapeResult, ScrapeStatus};
pub use query::{SearchQuery, TravelDate, TravelDateError};
