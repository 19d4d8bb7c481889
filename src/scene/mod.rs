//! The holiday scene built on top of the engine.
//!
//! - `groups` is the catalogue of decoration groups
//! - `holiday` is the flow that animates and draws them

pub mod groups;
pub mod holiday;

pub use groups::GroupConfig;
pub use holiday::{HolidayFlow, holiday_flow};
