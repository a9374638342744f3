//! Strict-overlap conflict detection

use chrono::{DateTime, Utc};
use slotline_domain::{CalendarEvent, Interval};

/// Anything that may occupy time on the calendar.
pub trait BusySource {
    /// Concrete occupied span, or `None` when the item does not block time
    /// (all-day or cancelled events).
    fn busy_span(&self) -> Option<Interval>;
}

impl BusySource for CalendarEvent {
    fn busy_span(&self) -> Option<Interval> {
        if self.is_cancelled() {
            None
        } else {
            self.span()
        }
    }
}

impl BusySource for Interval {
    fn busy_span(&self) -> Option<Interval> {
        Some(*self)
    }
}

/// First item in input order that strictly overlaps `[slot_start, slot_end)`.
pub fn find_conflict<T: BusySource>(
    slot_start: DateTime<Utc>,
    slot_end: DateTime<Utc>,
    busy: &[T],
) -> Option<&T> {
    let slot = Interval::new(slot_start, slot_end);
    busy.iter().find(|item| item.busy_span().is_some_and(|span| span.overlaps(&slot)))
}

pub fn has_conflict<T: BusySource>(
    slot_start: DateTime<Utc>,
    slot_end: DateTime<Utc>,
    busy: &[T],
) -> bool {
    find_conflict(slot_start, slot_end, busy).is_some()
}
