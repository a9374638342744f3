//! Per-anchor, multi-duration slot cache
//!
//! One calendar fetch covers the whole scan window around an anchor event.
//! Slots for each requested duration are computed on first access and never
//! recomputed afterwards. Container events are never busy; only members and
//! unmarked events block a slot. Validity is advisory: nothing refreshes the cache,
//! callers discard and rebuild it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use slotline_domain::constants::CACHE_VALIDITY_MINUTES;
use slotline_domain::{
    parse_event_location, AvailabilitySlot, CalendarEvent, Interval, Result, SchedulingError,
    TimeListEntry,
};
use tracing::debug;

use super::classifier::{busy_intervals, filter_events_for_general_blocking};
use super::slots::{generate_slots, ScanDirection, SlotScan};
use crate::calendar_ports::{CalendarGateway, EventQuery};
use crate::utils::clock::Clock;

/// How far around the anchor to fetch and scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorCacheOptions {
    pub slot_interval_minutes: u32,
    pub buffer_minutes: u32,
    /// Half-width of the fetch window on each side of the anchor.
    pub lookaround: Duration,
    /// Backward scan span; `None` disables slots before the anchor.
    pub before_span: Option<Duration>,
    pub after_span: Duration,
}

impl AnchorCacheOptions {
    fn buffer(&self) -> Duration {
        Duration::minutes(i64::from(self.buffer_minutes))
    }
}

/// Concrete `[start, end)` of an anchor, or a validation error naming it.
pub fn anchor_span(anchor: &CalendarEvent) -> Result<Interval> {
    anchor.span().ok_or_else(|| {
        SchedulingError::Validation(format!(
            "anchor event {} is missing a concrete start/end",
            anchor.id
        ))
    })
}

/// Availability around one anchor event, memoized per duration.
pub struct AnchorAvailabilityCache {
    anchor_event: CalendarEvent,
    fetched_events: Vec<CalendarEvent>,
    blocking_events: Vec<CalendarEvent>,
    anchor_start: DateTime<Utc>,
    anchor_end: DateTime<Utc>,
    location: Option<String>,
    options: AnchorCacheOptions,
    fetch_window: Interval,
    cached_at: DateTime<Utc>,
    slots_by_duration: BTreeMap<u32, Vec<AvailabilitySlot>>,
    computations: usize,
    clock: Arc<dyn Clock>,
}

impl AnchorAvailabilityCache {
    /// Fetch the anchor's surroundings once and wrap them in a cache.
    pub async fn build(
        gateway: &dyn CalendarGateway,
        anchor: CalendarEvent,
        options: AnchorCacheOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let span = anchor_span(&anchor)?;
        let window = Interval::new(span.start - options.lookaround, span.end + options.lookaround);

        debug!(
            anchor_id = %anchor.id,
            time_min = %window.start,
            time_max = %window.end,
            "fetching events around anchor"
        );
        let events = gateway.search_events(&EventQuery::window(window.start, window.end)).await?;

        Self::from_events(anchor, events, options, clock)
    }

    /// Wrap already-fetched events.
    pub fn from_events(
        anchor: CalendarEvent,
        fetched_events: Vec<CalendarEvent>,
        options: AnchorCacheOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let span = anchor_span(&anchor)?;
        let fetch_window =
            Interval::new(span.start - options.lookaround, span.end + options.lookaround);
        let location = parse_event_location(&anchor);
        let cached_at = clock.now();
        let blocking_events = filter_events_for_general_blocking(&fetched_events).blocking_events;

        Ok(Self {
            anchor_event: anchor,
            fetched_events,
            blocking_events,
            anchor_start: span.start,
            anchor_end: span.end,
            location,
            options,
            fetch_window,
            cached_at,
            slots_by_duration: BTreeMap::new(),
            computations: 0,
            clock,
        })
    }

    /// All slots (available or not) for `duration_minutes`, ascending by start.
    pub fn get_slots_for_duration(&mut self, duration_minutes: u32) -> Result<&[AvailabilitySlot]> {
        if self.slots_by_duration.contains_key(&duration_minutes) {
            debug!(duration_minutes, anchor_id = %self.anchor_event.id, "slot cache hit");
        } else {
            let slots = self.compute_slots(duration_minutes)?;
            debug!(
                duration_minutes,
                anchor_id = %self.anchor_event.id,
                slots = slots.len(),
                "computed slots"
            );
            self.slots_by_duration.insert(duration_minutes, slots);
            self.computations += 1;
        }

        Ok(self.slots_by_duration.get(&duration_minutes).map(Vec::as_slice).unwrap_or_default())
    }

    pub fn get_available_slots_for_duration(
        &mut self,
        duration_minutes: u32,
    ) -> Result<Vec<AvailabilitySlot>> {
        Ok(self
            .get_slots_for_duration(duration_minutes)?
            .iter()
            .filter(|slot| slot.available)
            .cloned()
            .collect())
    }

    /// Available slots in `{start, end, location}` wire format.
    pub fn get_time_list_format_for_duration(
        &mut self,
        duration_minutes: u32,
    ) -> Result<Vec<TimeListEntry>> {
        Ok(self
            .get_slots_for_duration(duration_minutes)?
            .iter()
            .filter(|slot| slot.available)
            .map(AvailabilitySlot::to_time_list_entry)
            .collect())
    }

    /// Durations already requested that have at least one available slot.
    pub fn get_available_durations(&self) -> Vec<u32> {
        self.slots_by_duration
            .iter()
            .filter(|(_, slots)| slots.iter().any(|slot| slot.available))
            .map(|(duration, _)| *duration)
            .collect()
    }

    /// True while younger than the validity window.
    pub fn is_cache_valid(&self) -> bool {
        self.clock.now() - self.cached_at < Duration::minutes(CACHE_VALIDITY_MINUTES)
    }

    pub fn anchor_event(&self) -> &CalendarEvent {
        &self.anchor_event
    }

    pub fn anchor_start(&self) -> DateTime<Utc> {
        self.anchor_start
    }

    pub fn anchor_end(&self) -> DateTime<Utc> {
        self.anchor_end
    }

    pub fn fetched_events(&self) -> &[CalendarEvent] {
        &self.fetched_events
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn slot_interval_minutes(&self) -> u32 {
        self.options.slot_interval_minutes
    }

    pub fn buffer_minutes(&self) -> u32 {
        self.options.buffer_minutes
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    pub fn fetch_window(&self) -> Interval {
        self.fetch_window
    }

    /// Number of slot computations performed (cache misses).
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// Busy intervals of the blocking events that fall inside `window`.
    pub fn busy_within(&self, window: &Interval) -> Vec<Interval> {
        busy_intervals(&self.blocking_events)
            .into_iter()
            .filter(|interval| interval.overlaps(window))
            .collect()
    }

    fn compute_slots(&self, duration_minutes: u32) -> Result<Vec<AvailabilitySlot>> {
        let location = self.location.as_deref();
        let mut slots = Vec::new();

        if let Some(before_span) = self.options.before_span {
            let backward = SlotScan {
                duration_minutes,
                cadence_minutes: self.options.slot_interval_minutes,
                boundary: self.anchor_start - self.options.buffer(),
                direction: ScanDirection::Backward,
                max_span: before_span,
                window: self.fetch_window,
            };
            slots.extend(generate_slots(&backward, &self.blocking_events, location)?);
        }

        let forward = SlotScan {
            duration_minutes,
            cadence_minutes: self.options.slot_interval_minutes,
            boundary: self.anchor_end + self.options.buffer(),
            direction: ScanDirection::Forward,
            max_span: self.options.after_span,
            window: self.fetch_window,
        };
        slots.extend(generate_slots(&forward, &self.blocking_events, location)?);

        slots.sort_by_key(|slot| slot.start);
        Ok(slots)
    }
}
