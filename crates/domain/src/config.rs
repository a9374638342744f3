//! Configuration management
//!
//! Every value the scheduling modes depend on is carried here and passed
//! explicitly into the orchestrator.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    ADJACENCY_SPAN_HOURS, DEFAULT_BUFFER_MINUTES, DEFAULT_DURATION_MINUTES,
    DEFAULT_SLOT_INTERVAL_MINUTES, NEXT_AVAILABLE_GRACE_MINUTES, NEXT_EVENT_LOOKAHEAD_HOURS,
};
use crate::errors::{Result, SchedulingError};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub scheduling: SchedulingConfig,
    pub geocoding: GeocodingConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate all sections.
    pub fn validate(&self) -> Result<()> {
        if self.calendar.calendar_id.trim().is_empty() {
            return Err(SchedulingError::Config("calendar_id must not be empty".into()));
        }
        self.scheduling.validate()
    }
}

/// Calendar API access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub calendar_id: String,
    /// Calendars merged by the area-wide free-busy query. Empty means the
    /// primary `calendar_id` only.
    pub free_busy_calendar_ids: Vec<String>,
    pub api_base_url: String,
    pub token_endpoint: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub request_timeout_seconds: u64,
}

impl CalendarConfig {
    /// Calendars queried for plain free-busy.
    pub fn free_busy_ids(&self) -> Vec<String> {
        if self.free_busy_calendar_ids.is_empty() {
            vec![self.calendar_id.clone()]
        } else {
            self.free_busy_calendar_ids.clone()
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            free_busy_calendar_ids: Vec::new(),
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            client_id: String::new(),
            client_secret: None,
            refresh_token: None,
            request_timeout_seconds: 30,
        }
    }
}

/// Slot generation and business-hour rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    pub allowed_durations: Vec<u32>,
    pub default_duration_minutes: u32,
    pub slot_interval_minutes: u32,
    pub buffer_minutes: u32,
    pub lead_time_minutes: u32,
    pub opening_hour: u32,
    pub closing_hour: u32,
    pub min_session_minutes: u32,
    pub home_timezone: String,
    pub next_event_lookahead_hours: u32,
    pub next_available_grace_minutes: u32,
    pub adjacency_span_hours: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            allowed_durations: vec![30, 60, 90],
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            lead_time_minutes: 60,
            opening_hour: 9,
            closing_hour: 18,
            min_session_minutes: 30,
            home_timezone: "America/New_York".to_string(),
            next_event_lookahead_hours: NEXT_EVENT_LOOKAHEAD_HOURS,
            next_available_grace_minutes: NEXT_AVAILABLE_GRACE_MINUTES,
            adjacency_span_hours: ADJACENCY_SPAN_HOURS,
        }
    }
}

impl SchedulingConfig {
    /// Parse the configured IANA timezone.
    pub fn timezone(&self) -> Result<Tz> {
        self.home_timezone.parse::<Tz>().map_err(|_| {
            SchedulingError::Config(format!("unknown timezone: {}", self.home_timezone))
        })
    }

    /// Reject values the slot engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.slot_interval_minutes == 0 {
            return Err(SchedulingError::Config("slot_interval_minutes must be > 0".into()));
        }
        if self.default_duration_minutes == 0 || self.allowed_durations.contains(&0) {
            return Err(SchedulingError::Config("durations must be > 0".into()));
        }
        if self.opening_hour > 24 || self.closing_hour > 24 {
            return Err(SchedulingError::Config("business hours must be within 0..=24".into()));
        }
        if self.closing_hour <= self.opening_hour {
            return Err(SchedulingError::Config(format!(
                "closing_hour ({}) must be after opening_hour ({})",
                self.closing_hour, self.opening_hour
            )));
        }
        self.timezone().map(|_| ())
    }

    /// Durations offered when a request does not name its own.
    pub fn durations_or_default(&self) -> Vec<u32> {
        if self.allowed_durations.is_empty() {
            vec![self.default_duration_minutes]
        } else {
            let mut durations = self.allowed_durations.clone();
            durations.sort_unstable();
            durations.dedup();
            durations
        }
    }
}

/// Geocoding collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub enabled: bool,
    pub api_base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key: None,
        }
    }
}

/// Log output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
