//! Google Calendar wire types
//!
//! Event payloads are decoded leniently so one malformed entry can be skipped
//! without failing the whole page.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use slotline_domain::{CalendarEvent, EventStatus, EventTime, Interval};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEventsResponse {
    #[serde(default)]
    pub items: Vec<GoogleCalendarEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleCalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub start: Option<GoogleEventDateTime>,
    pub end: Option<GoogleEventDateTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEventDateTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

/// Why an event could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MalformedEvent {
    pub id: String,
    pub reason: String,
}

impl GoogleEventDateTime {
    fn into_domain(self, event_id: &str) -> Result<EventTime, MalformedEvent> {
        let malformed = |reason: String| MalformedEvent { id: event_id.to_string(), reason };

        let date_time = self
            .date_time
            .as_deref()
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .map_err(|e| malformed(format!("invalid dateTime {raw:?}: {e}")))
            })
            .transpose()?;

        let date = self
            .date
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|e| malformed(format!("invalid date {raw:?}: {e}")))
            })
            .transpose()?;

        if date_time.is_none() && date.is_none() {
            return Err(malformed("neither dateTime nor date present".to_string()));
        }

        Ok(EventTime { date_time, date, time_zone: self.time_zone })
    }
}

impl GoogleCalendarEvent {
    pub fn into_domain(self) -> Result<CalendarEvent, MalformedEvent> {
        let id = self.id;
        let missing =
            |field: &str| MalformedEvent { id: id.clone(), reason: format!("missing {field}") };

        let start = self.start.ok_or_else(|| missing("start"))?.into_domain(&id)?;
        let end = self.end.ok_or_else(|| missing("end"))?.into_domain(&id)?;

        Ok(CalendarEvent {
            summary: self.summary,
            description: self.description,
            location: self.location,
            status: EventStatus::from_provider(self.status.as_deref()),
            start,
            end,
            id,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FreeBusyRequest<'a> {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub items: Vec<FreeBusyItem<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FreeBusyItem<'a> {
    pub id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<Interval>,
    #[serde(default)]
    pub errors: Vec<FreeBusyCalendarError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FreeBusyCalendarError {
    pub domain: Option<String>,
    pub reason: Option<String>,
}

/// Sort and coalesce overlapping or touching intervals.
pub(crate) fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort();
    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}
