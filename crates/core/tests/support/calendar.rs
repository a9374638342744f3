use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slotline_core::calendar_ports::{CalendarGateway, EventQuery, GeocodingPort};
use slotline_domain::{
    CalendarEvent, Coordinates, Interval, Result as DomainResult, SchedulingError,
};

/// Recorded `free_busy` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeBusyCall {
    pub calendar_ids: Vec<String>,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

/// In-memory mock for `CalendarGateway`.
///
/// Search filters the seeded events by window overlap and by substring match
/// on summary/description, mirroring the provider's full-text search closely
/// enough for marker tests. Every call is recorded.
#[derive(Default, Clone)]
pub struct MockCalendarGateway {
    events: Arc<Mutex<Vec<CalendarEvent>>>,
    busy: Arc<Mutex<Vec<Interval>>>,
    failure: Arc<Mutex<Option<SchedulingError>>>,
    searches: Arc<Mutex<Vec<EventQuery>>>,
    free_busy_calls: Arc<Mutex<Vec<FreeBusyCall>>>,
}

impl MockCalendarGateway {
    /// Create a new mock seeded with the provided events.
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events: Arc::new(Mutex::new(events)), ..Self::default() }
    }

    pub fn with_event(self, event: CalendarEvent) -> Self {
        self.events.lock().unwrap().push(event);
        self
    }

    /// Busy intervals returned by `free_busy`.
    pub fn with_busy(self, busy: Vec<Interval>) -> Self {
        *self.busy.lock().unwrap() = busy;
        self
    }

    /// Make every call fail with `error`.
    pub fn failing_with(self, error: SchedulingError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    pub fn searches(&self) -> Vec<EventQuery> {
        self.searches.lock().unwrap().clone()
    }

    pub fn free_busy_calls(&self) -> Vec<FreeBusyCall> {
        self.free_busy_calls.lock().unwrap().clone()
    }

    fn check_failure(&self) -> DomainResult<()> {
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CalendarGateway for MockCalendarGateway {
    async fn free_busy(
        &self,
        calendar_ids: &[String],
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> DomainResult<Vec<Interval>> {
        self.free_busy_calls.lock().unwrap().push(FreeBusyCall {
            calendar_ids: calendar_ids.to_vec(),
            time_min,
            time_max,
        });
        self.check_failure()?;

        let window = Interval::new(time_min, time_max);
        Ok(self.busy.lock().unwrap().iter().filter(|b| b.overlaps(&window)).copied().collect())
    }

    async fn search_events(&self, query: &EventQuery) -> DomainResult<Vec<CalendarEvent>> {
        self.searches.lock().unwrap().push(query.clone());
        self.check_failure()?;

        let mut matches: Vec<CalendarEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| query.text.as_deref().map_or(true, |text| event.mentions(text)))
            .filter(|event| match (event.span(), query.time_min, query.time_max) {
                (Some(span), Some(min), Some(max)) => span.overlaps(&Interval::new(min, max)),
                _ => true,
            })
            .cloned()
            .collect();
        matches.sort_by_key(|event| event.start.date_time);
        Ok(matches)
    }

    async fn get_event(&self, event_id: &str) -> DomainResult<CalendarEvent> {
        self.check_failure()?;
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|event| event.id == event_id)
            .cloned()
            .ok_or_else(|| SchedulingError::NotFound(format!("event {event_id} not found")))
    }
}

/// Geocoder returning a fixed answer and counting lookups.
#[derive(Clone)]
pub struct MockGeocoder {
    answer: DomainResult<Option<Coordinates>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockGeocoder {
    pub fn returning(coordinates: Coordinates) -> Self {
        Self { answer: Ok(Some(coordinates)), lookups: Arc::default() }
    }

    pub fn failing() -> Self {
        Self {
            answer: Err(SchedulingError::Upstream("geocoder returned 500".to_string())),
            lookups: Arc::default(),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeocodingPort for MockGeocoder {
    async fn geocode(&self, location: &str) -> DomainResult<Option<Coordinates>> {
        self.lookups.lock().unwrap().push(location.to_string());
        self.answer.clone()
    }
}
