//! Fixed-duration slot generation on a cadence
//!
//! A scan starts at a boundary and steps away from it by the cadence until the
//! step offset exceeds the maximum span or the slot would leave the window of
//! fetched calendar data. Results are always returned ascending by start.

use chrono::{DateTime, Duration, Utc};
use slotline_domain::{
    AvailabilitySlot, CalendarEvent, Interval, Result, SchedulingError, SlotPosition,
};

use super::conflict::find_conflict;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Slots ending at or before the boundary.
    Backward,
    /// Slots starting at or after the boundary.
    Forward,
}

impl ScanDirection {
    pub fn position(self) -> SlotPosition {
        match self {
            Self::Backward => SlotPosition::Before,
            Self::Forward => SlotPosition::After,
        }
    }
}

/// One directional scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotScan {
    pub duration_minutes: u32,
    pub cadence_minutes: u32,
    pub boundary: DateTime<Utc>,
    pub direction: ScanDirection,
    /// Largest step offset from the boundary, inclusive.
    pub max_span: Duration,
    /// Slots must fit inside this range.
    pub window: Interval,
}

impl SlotScan {
    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes == 0 {
            return Err(SchedulingError::Validation("slot duration must be > 0".into()));
        }
        if self.cadence_minutes == 0 {
            return Err(SchedulingError::Validation("slot cadence must be > 0".into()));
        }
        if self.max_span < Duration::zero() {
            return Err(SchedulingError::Validation("scan span must not be negative".into()));
        }
        Ok(())
    }

    /// Candidate intervals, ascending by start.
    pub fn candidates(&self) -> Result<Vec<Interval>> {
        self.validate()?;

        let duration = Duration::minutes(i64::from(self.duration_minutes));
        let cadence = Duration::minutes(i64::from(self.cadence_minutes));
        let mut intervals = Vec::new();
        let mut offset = Duration::zero();

        while offset <= self.max_span {
            let candidate = match self.direction {
                ScanDirection::Forward => {
                    let start = self.boundary + offset;
                    Interval::new(start, start + duration)
                }
                ScanDirection::Backward => {
                    let end = self.boundary - offset;
                    Interval::new(end - duration, end)
                }
            };

            // Stepping only moves further out of the window from here on.
            let past_far_edge = match self.direction {
                ScanDirection::Forward => candidate.end > self.window.end,
                ScanDirection::Backward => candidate.start < self.window.start,
            };
            if past_far_edge {
                break;
            }

            if self.window.contains(&candidate) {
                intervals.push(candidate);
            }
            offset += cadence;
        }

        intervals.sort();
        Ok(intervals)
    }
}

/// Run a scan and flag each slot against `busy`. Each candidate is tested once.
pub fn generate_slots(
    scan: &SlotScan,
    busy: &[CalendarEvent],
    location: Option<&str>,
) -> Result<Vec<AvailabilitySlot>> {
    let position = scan.direction.position();

    Ok(scan
        .candidates()?
        .into_iter()
        .map(|interval| {
            let conflicting_event = find_conflict(interval.start, interval.end, busy).cloned();
            AvailabilitySlot {
                start: interval.start,
                end: interval.end,
                location: location.map(str::to_string),
                available: conflicting_event.is_none(),
                conflicting_event,
                duration: scan.duration_minutes,
                position,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use slotline_domain::{EventStatus, EventTime};

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn wide_window() -> Interval {
        Interval::new(at(0, 0), at(23, 59))
    }

    fn scan(direction: ScanDirection, boundary: DateTime<Utc>, span_minutes: i64) -> SlotScan {
        SlotScan {
            duration_minutes: 60,
            cadence_minutes: 15,
            boundary,
            direction,
            max_span: Duration::minutes(span_minutes),
            window: wide_window(),
        }
    }

    fn busy_event(start: DateTime<Utc>, minutes: i64) -> CalendarEvent {
        CalendarEvent {
            id: format!("busy-{start}"),
            summary: Some("Booked".into()),
            description: None,
            start: EventTime::at(start),
            end: EventTime::at(start + Duration::minutes(minutes)),
            location: None,
            status: EventStatus::Confirmed,
        }
    }

    #[test]
    fn forward_scan_steps_by_cadence() {
        let slots = scan(ScanDirection::Forward, at(11, 30), 60).candidates().unwrap();
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(11, 30), at(11, 45), at(12, 0), at(12, 15), at(12, 30)]);
        assert!(slots.iter().all(|s| s.duration() == Duration::minutes(60)));
    }

    #[test]
    fn backward_scan_is_returned_ascending() {
        let slots = scan(ScanDirection::Backward, at(9, 30), 30).candidates().unwrap();
        let ends: Vec<_> = slots.iter().map(|s| s.end).collect();
        assert_eq!(ends, vec![at(9, 0), at(9, 15), at(9, 30)]);
        assert_eq!(slots.last().unwrap().start, at(8, 30));
    }

    #[test]
    fn scans_stop_at_window_edges() {
        let mut forward = scan(ScanDirection::Forward, at(22, 0), 24 * 60);
        forward.window = Interval::new(at(0, 0), at(23, 30));
        let slots = forward.candidates().unwrap();
        assert_eq!(slots.last().unwrap().end, at(23, 30));

        let mut backward = scan(ScanDirection::Backward, at(2, 0), 24 * 60);
        backward.window = Interval::new(at(0, 30), at(23, 0));
        let slots = backward.candidates().unwrap();
        assert_eq!(slots.first().unwrap().start, at(0, 30));
    }

    #[test]
    fn zero_span_yields_only_boundary_slot() {
        let slots = scan(ScanDirection::Forward, at(11, 30), 0).candidates().unwrap();
        assert_eq!(slots, vec![Interval::new(at(11, 30), at(12, 30))]);
    }

    #[test]
    fn rejects_zero_cadence_and_duration() {
        let mut bad = scan(ScanDirection::Forward, at(9, 0), 60);
        bad.cadence_minutes = 0;
        assert!(matches!(bad.candidates(), Err(SchedulingError::Validation(_))));

        let mut bad = scan(ScanDirection::Forward, at(9, 0), 60);
        bad.duration_minutes = 0;
        assert!(matches!(bad.candidates(), Err(SchedulingError::Validation(_))));
    }

    #[test]
    fn available_slots_never_overlap_busy_time() {
        let busy = vec![busy_event(at(12, 0), 45), busy_event(at(14, 10), 20)];
        let slots =
            generate_slots(&scan(ScanDirection::Forward, at(11, 0), 6 * 60), &busy, Some("Loft"))
                .unwrap();

        for slot in &slots {
            let overlaps = busy.iter().any(|b| b.span().unwrap().overlaps(&slot.interval()));
            assert_eq!(slot.available, !overlaps, "slot {:?}", slot.start);
            assert_eq!(slot.conflicting_event.is_some(), overlaps);
            assert_eq!(slot.location.as_deref(), Some("Loft"));
            assert_eq!(slot.position, SlotPosition::After);
        }

        let first = &slots[0];
        assert_eq!(first.start, at(11, 0));
        assert!(first.available, "11:00-12:00 touches the 12:00 booking only at its edge");
        let blocked = slots.iter().find(|s| s.start == at(11, 15)).unwrap();
        assert!(!blocked.available);
    }
}
