//! Availability computation
//!
//! Classification, conflict detection and slot generation are pure; the
//! anchor cache and the modes talk to the calendar through
//! [`CalendarGateway`](crate::calendar_ports::CalendarGateway).

pub mod adjacency;
pub mod cache;
pub mod classifier;
pub mod conflict;
pub mod next_available;
pub mod service;
pub mod slots;

pub use adjacency::{AdjacencyMode, AdjacencyParams};
pub use cache::{AnchorAvailabilityCache, AnchorCacheOptions};
pub use classifier::{
    busy_intervals, filter_events_for_general_blocking, filter_events_for_query,
    BlockingClassification, QueryClassification,
};
pub use conflict::{find_conflict, has_conflict, BusySource};
pub use next_available::{
    select_next_upcoming_event, FallbackTarget, NextAvailableMode, NextAvailableOutcome,
};
pub use service::{AvailabilityRequest, AvailabilityService, SchedulingMode};
pub use slots::{generate_slots, ScanDirection, SlotScan};
