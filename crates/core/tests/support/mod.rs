//! Shared test helpers for `slotline-core` integration tests.
//!
//! In-memory doubles for the calendar and geocoding ports plus event
//! fixtures, so scenario tests can focus on behaviour instead of setup.

#![allow(dead_code)]

pub mod calendar;

use chrono::{DateTime, TimeZone, Utc};
use slotline_domain::{CalendarEvent, EventStatus, EventTime};

/// 2025-03-10 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
}

/// Timed, confirmed event with `summary` as its title.
pub fn timed_event(
    id: &str,
    summary: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some(summary.to_string()),
        description: None,
        start: EventTime::at(start),
        end: EventTime::at(end),
        location: None,
        status: EventStatus::Confirmed,
    }
}
