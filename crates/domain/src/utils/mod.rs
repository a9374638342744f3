//! Pure text utilities over calendar data

pub mod location;

pub use location::{normalize_location, parse_event_location};
