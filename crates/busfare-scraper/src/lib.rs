//! Scrape orchestration engine.
//!
//! One [`SitePlan`] per target booking platform supplies selectors and
//! site-specific behavior; the shared navigation state machine in
//! [`machine`] drives a headless browser through form fill-in, autocomplete
//! resolution, calendar paging, submission, and extraction. The
//! [`orchestrator`] fans one task out per registered plan, isolates
//! failures, and merges the normalized listings.

pub mod aggregate;
pub mod error;
pub mod machine;
pub mod normalize;
pub mod orchestrator;
pub mod page;
pub mod sites;
pub mod types;

pub use aggregate::aggregate;
pub use error::ScrapeError;
pub use machine::{PlanScraper, SitePlan, SiteScraper, StepTimings};
pub use normalize::{classify, normalize_record, parse_price};
pub use page::{Page, PageError, PageNode, WebDriverPage};
pub use sites::default_plans;
pub use types::{Outcome, RawBusRecord};
