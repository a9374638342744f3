//! # Slotline Core
//!
//! Pure scheduling logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Marker-based event classification and conflict detection
//! - Slot generation and the per-anchor duration cache
//! - Adjacency and next-available modes behind one orchestrator
//! - Port interfaces (traits) for the calendar and the geocoder
//!
//! ## Architecture Principles
//! - Only depends on `slotline-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits
//! - Time is injected through [`Clock`]

pub mod availability;
pub mod calendar_ports;
pub mod utils;

pub use availability::{
    AdjacencyMode, AdjacencyParams, AnchorAvailabilityCache, AvailabilityRequest,
    AvailabilityService, NextAvailableMode, SchedulingMode,
};
pub use calendar_ports::{CalendarGateway, EventQuery, GeocodingPort};
pub use utils::clock::{Clock, MockClock, SystemClock};
