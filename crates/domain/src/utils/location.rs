//! Best-effort location extraction for anchor events.
//!
//! Calendar entries created by hand often leave the location field empty and
//! put the address in the body instead, so the description is consulted as a
//! fallback.

use crate::types::CalendarEvent;

const LOCATION_LABELS: [&str; 3] = ["location:", "address:", "where:"];
const NBSP: char = '\u{00A0}';

/// Resolve a usable location string for an event, if any.
pub fn parse_event_location(event: &CalendarEvent) -> Option<String> {
    event
        .location
        .as_deref()
        .and_then(normalize_location)
        .or_else(|| event.description.as_deref().and_then(location_from_description))
}

/// Collapse whitespace and reject empty values.
pub fn normalize_location(raw: &str) -> Option<String> {
    let collapsed = raw
        .split(|c: char| c.is_whitespace() || c == NBSP)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn location_from_description(description: &str) -> Option<String> {
    description.lines().find_map(|line| {
        let trimmed = line.trim();
        let lower = trimmed.to_ascii_lowercase();
        LOCATION_LABELS.iter().find_map(|label| {
            lower.starts_with(label).then(|| normalize_location(&trimmed[label.len()..])).flatten()
        })
    })
}
