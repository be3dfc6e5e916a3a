//! Per-platform navigation plans.
//!
//! Each module supplies one [`SitePlan`]: the selectors, calendar
//! representation, empty-state markers, and extraction mapping for its
//! booking site. Shared step logic lives in [`crate::machine`].

use std::sync::Arc;

use crate::machine::SitePlan;

pub mod abhibus;
pub mod ixigo;
pub mod redbus;
pub mod travelyaari;

pub use abhibus::AbhiBusPlan;
pub use ixigo::IxigoPlan;
pub use redbus::RedBusPlan;
pub use travelyaari::TravelYaariPlan;

/// All supported platforms, in registration order.
#[must_use]
pub fn default_plans() -> Vec<Arc<dyn SitePlan>> {
    vec![
        Arc::new(RedBusPlan),
        Arc::new(AbhiBusPlan),
        Arc::new(IxigoPlan),
        Arc::new(TravelYaariPlan),
    ]
}
