//! Normalized availability responses

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::event::{CalendarEvent, Interval};
use super::slot::TimeListEntry;
use crate::constants::{CONTAINER_SUFFIX, EVENT_MARKER, MEMBER_SUFFIX};

/// Marker strings derived from one booking query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSet {
    pub base: String,
    pub container: String,
    pub member: String,
}

impl MarkerSet {
    /// `Q__EVENT__`, `Q__EVENT__CONTAINER__`, `Q__EVENT__MEMBER__`.
    pub fn for_query(query: &str) -> Self {
        let base = format!("{query}{EVENT_MARKER}");
        Self {
            container: format!("{base}{CONTAINER_SUFFIX}"),
            member: format!("{base}{MEMBER_SUFFIX}"),
            base,
        }
    }
}

/// Latitude/longitude pair from the geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Output shape shared by every scheduling mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub busy: Vec<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<Vec<CalendarEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_duration_slots: Option<BTreeMap<u32, Vec<TimeListEntry>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_durations: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_event: Option<CalendarEvent>,
    pub next_event_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<MarkerSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Set when an upstream failure was absorbed into an empty result.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl AvailabilityResponse {
    /// Bare response over a window; modes fill in the optional parts.
    pub fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            busy: Vec::new(),
            containers: None,
            multi_duration_slots: None,
            available_durations: None,
            current_event: None,
            next_event_found: false,
            target_date: None,
            markers: None,
            coordinates: None,
            degraded: false,
        }
    }
}
