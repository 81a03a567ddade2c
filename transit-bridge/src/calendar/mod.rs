//! Calendar filtering.
//!
//! Decides which trips of the planning graph run on the simulated day and
//! its neighbours, and provides the simulated day's clock.

mod filter;
mod service_day;

pub use filter::{ActiveServices, CalendarFilter};
pub use service_day::ServiceDay;
