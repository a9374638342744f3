//! Common data types used throughout the scheduling engine

pub mod availability;
pub mod event;
pub mod slot;

pub use availability::{AvailabilityResponse, Coordinates, MarkerSet};
pub use event::{CalendarEvent, EventStatus, EventTime, Interval};
pub use slot::{AvailabilitySlot, SlotPosition, TimeListEntry};
