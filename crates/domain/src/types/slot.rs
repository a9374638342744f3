//! Candidate booking slots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{CalendarEvent, Interval};
use crate::impl_domain_status_conversions;

/// Which side of the anchor event a slot sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotPosition {
    Before,
    After,
}

impl_domain_status_conversions!(SlotPosition {
    Before => "before",
    After => "after",
});

/// Candidate fixed-duration interval, flagged against the busy set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_event: Option<CalendarEvent>,
    /// Length in minutes.
    pub duration: u32,
    #[serde(rename = "type")]
    pub position: SlotPosition,
}

impl AvailabilitySlot {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    /// Wire projection used by booking clients.
    pub fn to_time_list_entry(&self) -> TimeListEntry {
        TimeListEntry { start: self.start, end: self.end, location: self.location.clone() }
    }
}

/// `{start, end, location}` entry returned for available slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeListEntry {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
}
