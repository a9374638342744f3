//! Marker-based event classification
//!
//! Availability windows ("containers") and bookings ("members") are stored as
//! ordinary calendar events tagged with marker substrings. A marker may sit in
//! either the title or the body. Containers never contribute busy time.

use slotline_domain::constants::{CONTAINER_SUFFIX, EVENT_MARKER, MEMBER_SUFFIX};
use slotline_domain::{CalendarEvent, Interval, MarkerSet};
use tracing::debug;

/// Result of classifying events against one booking query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryClassification {
    pub markers: MarkerSet,
    /// Events carrying the query's base marker.
    pub events: Vec<CalendarEvent>,
    pub containers: Vec<CalendarEvent>,
    pub members: Vec<CalendarEvent>,
    /// Members projected to busy intervals.
    pub busy_query: Vec<Interval>,
}

/// Query-agnostic classification used to block time across all scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingClassification {
    pub containers: Vec<CalendarEvent>,
    pub members: Vec<CalendarEvent>,
    /// Events without any marker at all.
    pub regular_events: Vec<CalendarEvent>,
    /// `members ∪ regular_events`.
    pub blocking_events: Vec<CalendarEvent>,
    pub busy_query: Vec<Interval>,
}

/// Partition `events` by the markers derived from `query`.
pub fn filter_events_for_query(events: &[CalendarEvent], query: &str) -> QueryClassification {
    let markers = MarkerSet::for_query(query);

    let scoped: Vec<CalendarEvent> =
        events.iter().filter(|event| event.mentions(&markers.base)).cloned().collect();

    let containers: Vec<CalendarEvent> =
        scoped.iter().filter(|event| event.mentions(&markers.container)).cloned().collect();

    let members: Vec<CalendarEvent> = scoped
        .iter()
        .filter(|event| event.mentions(&markers.member) && !event.mentions(&markers.container))
        .cloned()
        .collect();

    let busy_query = busy_intervals(&members);

    debug!(
        query,
        scoped = scoped.len(),
        containers = containers.len(),
        members = members.len(),
        "classified events for query"
    );

    QueryClassification { markers, events: scoped, containers, members, busy_query }
}

/// Classify events without a query: any member of any scope blocks, plain
/// events block, containers are identified but never block.
pub fn filter_events_for_general_blocking(events: &[CalendarEvent]) -> BlockingClassification {
    let container_fragment = format!("{EVENT_MARKER}{CONTAINER_SUFFIX}");
    let member_fragment = format!("{EVENT_MARKER}{MEMBER_SUFFIX}");

    let mut containers = Vec::new();
    let mut members = Vec::new();
    let mut regular_events = Vec::new();

    for event in events {
        if event.mentions(&container_fragment) {
            containers.push(event.clone());
        } else if event.mentions(&member_fragment) {
            members.push(event.clone());
        } else if !event.mentions(EVENT_MARKER) {
            regular_events.push(event.clone());
        }
    }

    let blocking_events: Vec<CalendarEvent> =
        members.iter().chain(regular_events.iter()).cloned().collect();
    let busy_query = busy_intervals(&blocking_events);

    debug!(
        containers = containers.len(),
        members = members.len(),
        regular = regular_events.len(),
        "classified events for general blocking"
    );

    BlockingClassification { containers, members, regular_events, blocking_events, busy_query }
}

/// Concrete, non-cancelled event spans in input order.
pub fn busy_intervals(events: &[CalendarEvent]) -> Vec<Interval> {
    events.iter().filter(|event| !event.is_cancelled()).filter_map(CalendarEvent::span).collect()
}
