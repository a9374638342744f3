//! Calendar and geocoding port interfaces
//!
//! The calendar is the only persistent store the scheduling engine reads.
//! Adapters live in `slotline-infra`; tests use in-memory doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slotline_domain::{CalendarEvent, Coordinates, Interval, Result};

/// Full-text event search over the configured calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Free-text filter passed to the provider. `None` lists everything.
    pub text: Option<String>,
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
}

impl EventQuery {
    /// All events overlapping `[time_min, time_max]`.
    pub fn window(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self { text: None, time_min: Some(time_min), time_max: Some(time_max) }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Trait for calendar provider operations
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Merged busy intervals across `calendar_ids` for the window.
    async fn free_busy(
        &self,
        calendar_ids: &[String],
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<Interval>>;

    /// Events matching the query, ordered by start time.
    async fn search_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>>;

    /// Explicit lookup by id. Missing events yield `NotFound` naming the id.
    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent>;
}

/// Free-text location to coordinates. Callers treat failures as non-fatal.
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>>;
}
