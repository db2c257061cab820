//! Core domain logic for the meet timer.
//!
//! This crate contains the fundamental types and logic for:
//! - Parsing: converting textual finish times (`"M:SS.ss"` or `"SS.ss"`) to seconds
//! - Estimation: aggregating per-heat slowest times into a total meet duration

mod estimate;
mod parse;
mod types;

pub use estimate::{
    EstimateConfig, EventEstimate, HeatEstimate, HmsBreakdown, MeetEstimate, estimate_total,
};
pub use parse::{ParseTimeError, parse_time};
pub use types::{Event, EventCategory, EventId, EventSchedule, HeatSheet, UnknownCategory, ValidationError};
