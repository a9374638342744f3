//! Availability orchestration
//!
//! Routes a caller request to one scheduling mode and normalizes the result
//! into an [`AvailabilityResponse`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use slotline_domain::{
    AvailabilityResponse, Interval, MarkerSet, Result, SchedulingConfig, SchedulingError,
};
use tracing::{instrument, warn};

use super::adjacency::{AdjacencyMode, AdjacencyParams};
use super::cache::AnchorAvailabilityCache;
use super::classifier::{filter_events_for_general_blocking, filter_events_for_query};
use super::next_available::{NextAvailableMode, NextAvailableOutcome};
use crate::calendar_ports::{CalendarGateway, EventQuery, GeocodingPort};
use crate::utils::clock::{Clock, SystemClock};

/// Which scheduling mode to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SchedulingMode {
    /// Containers and member bookings of one query.
    #[serde(rename_all = "camelCase")]
    ContainerByQuery { query: String, time_min: DateTime<Utc>, time_max: DateTime<Utc> },
    /// Containers of every scope; members and plain events block.
    #[serde(rename_all = "camelCase")]
    ContainerGeneral { time_min: DateTime<Utc>, time_max: DateTime<Utc> },
    /// Slots before and after an existing event.
    #[serde(rename_all = "camelCase")]
    Adjacency {
        anchor_event_id: String,
        #[serde(default)]
        params: Option<AdjacencyParams>,
    },
    /// Grace window after the next marked event, else today/tomorrow.
    NextAvailable { query: String },
    /// Plain merged busy time over the configured calendars.
    #[serde(rename_all = "camelCase")]
    FreeBusy { time_min: DateTime<Utc>, time_max: DateTime<Utc> },
}

impl SchedulingMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContainerByQuery { .. } => "container_by_query",
            Self::ContainerGeneral { .. } => "container_general",
            Self::Adjacency { .. } => "adjacency",
            Self::NextAvailable { .. } => "next_available",
            Self::FreeBusy { .. } => "free_busy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    #[serde(flatten)]
    pub mode: SchedulingMode,
    /// Durations for multi-duration results. Falls back to the adjacency
    /// params' duration, then the configured allowed durations.
    #[serde(default)]
    pub durations: Option<Vec<u32>>,
}

impl AvailabilityRequest {
    pub fn new(mode: SchedulingMode) -> Self {
        Self { mode, durations: None }
    }

    pub fn with_durations(mut self, durations: Vec<u32>) -> Self {
        self.durations = Some(durations);
        self
    }
}

/// Scheduling entry point
pub struct AvailabilityService {
    gateway: Arc<dyn CalendarGateway>,
    geocoder: Option<Arc<dyn GeocodingPort>>,
    clock: Arc<dyn Clock>,
    config: SchedulingConfig,
    free_busy_calendar_ids: Vec<String>,
}

impl AvailabilityService {
    pub fn new(
        gateway: Arc<dyn CalendarGateway>,
        config: SchedulingConfig,
        free_busy_calendar_ids: Vec<String>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gateway,
            geocoder: None,
            clock: Arc::new(SystemClock),
            config,
            free_busy_calendar_ids,
        })
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn GeocodingPort>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Run one request end to end.
    #[instrument(skip(self, request), fields(mode = request.mode.name()))]
    pub async fn get_availability(
        &self,
        request: AvailabilityRequest,
    ) -> Result<AvailabilityResponse> {
        // Explicit adjacency params name their own duration unless the request
        // lists durations.
        let durations = match (&request.mode, request.durations.as_deref()) {
            (SchedulingMode::Adjacency { params: Some(params), .. }, None) => {
                self.resolve_durations(Some(&[params.duration_minutes]))?
            }
            (_, requested) => self.resolve_durations(requested)?,
        };

        match request.mode {
            SchedulingMode::ContainerByQuery { query, time_min, time_max } => {
                self.container_by_query(&query, time_min, time_max).await
            }
            SchedulingMode::ContainerGeneral { time_min, time_max } => {
                self.container_general(time_min, time_max).await
            }
            SchedulingMode::Adjacency { anchor_event_id, params } => {
                let params = params.unwrap_or_else(|| AdjacencyParams::from_config(&self.config));
                self.adjacency(&anchor_event_id, &params, &durations).await
            }
            SchedulingMode::NextAvailable { query } => {
                self.next_available(&query, &durations).await
            }
            SchedulingMode::FreeBusy { time_min, time_max } => {
                self.free_busy(time_min, time_max).await
            }
        }
    }

    async fn container_by_query(
        &self,
        query: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<AvailabilityResponse> {
        validate_window(time_min, time_max)?;
        let markers = MarkerSet::for_query(query);
        let search = EventQuery::window(time_min, time_max).with_text(markers.base.clone());

        match self.gateway.search_events(&search).await {
            Ok(events) => {
                let classified = filter_events_for_query(&events, query);
                let mut response = AvailabilityResponse::window(time_min, time_max);
                response.busy = classified.busy_query;
                response.containers = Some(classified.containers);
                response.markers = Some(classified.markers);
                Ok(response)
            }
            Err(err) => degrade(err, markers, time_min, time_max),
        }
    }

    async fn container_general(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<AvailabilityResponse> {
        validate_window(time_min, time_max)?;
        // The empty query yields the bare marker fragments.
        let markers = MarkerSet::for_query("");

        match self.gateway.search_events(&EventQuery::window(time_min, time_max)).await {
            Ok(events) => {
                let classified = filter_events_for_general_blocking(&events);
                let mut response = AvailabilityResponse::window(time_min, time_max);
                response.busy = classified.busy_query;
                response.containers = Some(classified.containers);
                response.markers = Some(markers);
                Ok(response)
            }
            Err(err) => degrade(err, markers, time_min, time_max),
        }
    }

    async fn adjacency(
        &self,
        anchor_event_id: &str,
        params: &AdjacencyParams,
        durations: &[u32],
    ) -> Result<AvailabilityResponse> {
        let anchor = self.gateway.get_event(anchor_event_id).await?;
        let mode = AdjacencyMode::new(self.gateway.clone(), self.clock.clone())
            .with_span(Duration::hours(i64::from(self.config.adjacency_span_hours)));
        let mut cache = mode.availability_cache(anchor, params).await?;

        let window = cache.fetch_window();
        let mut response = AvailabilityResponse::window(window.start, window.end);
        response.busy = cache.busy_within(&window);
        fill_durations(&mut cache, durations, &mut response)?;
        response.current_event = Some(cache.anchor_event().clone());
        Ok(response)
    }

    async fn next_available(&self, query: &str, durations: &[u32]) -> Result<AvailabilityResponse> {
        let mut mode =
            NextAvailableMode::new(self.gateway.clone(), self.clock.clone(), self.config.clone())?;
        if let Some(geocoder) = &self.geocoder {
            mode = mode.with_geocoder(geocoder.clone());
        }

        match mode.resolve(query, &self.free_busy_calendar_ids).await? {
            NextAvailableOutcome::Anchored { mut cache, coordinates } => {
                let longest =
                    durations.iter().copied().max().unwrap_or(self.config.default_duration_minutes);
                let lead = self.config.buffer_minutes.max(self.config.next_available_grace_minutes);
                let reach = lead + longest;
                let start = cache.anchor_end();
                let end = start + Duration::minutes(i64::from(reach));

                let mut response = AvailabilityResponse::window(start, end);
                response.busy = cache.busy_within(&Interval::new(start, end));
                fill_durations(&mut cache, durations, &mut response)?;
                response.current_event = Some(cache.anchor_event().clone());
                response.next_event_found = true;
                response.markers = Some(MarkerSet::for_query(query));
                response.coordinates = coordinates;
                Ok(response)
            }
            NextAvailableOutcome::Fallback { target, busy } => {
                let mut response =
                    AvailabilityResponse::window(target.window.start, target.window.end);
                response.busy = busy;
                response.target_date = Some(target.target_date);
                response.markers = Some(MarkerSet::for_query(query));
                Ok(response)
            }
        }
    }

    async fn free_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<AvailabilityResponse> {
        validate_window(time_min, time_max)?;
        let busy = self.gateway.free_busy(&self.free_busy_calendar_ids, time_min, time_max).await?;

        let mut response = AvailabilityResponse::window(time_min, time_max);
        response.busy = busy;
        Ok(response)
    }

    fn resolve_durations(&self, requested: Option<&[u32]>) -> Result<Vec<u32>> {
        match requested {
            Some(durations) if !durations.is_empty() => {
                if durations.contains(&0) {
                    return Err(SchedulingError::InvalidInput(
                        "durations must be positive".to_string(),
                    ));
                }
                let mut durations = durations.to_vec();
                durations.sort_unstable();
                durations.dedup();
                Ok(durations)
            }
            _ => Ok(self.config.durations_or_default()),
        }
    }
}

fn validate_window(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Result<()> {
    if time_min >= time_max {
        return Err(SchedulingError::InvalidInput(format!(
            "time_min {time_min} must be before time_max {time_max}"
        )));
    }
    Ok(())
}

fn fill_durations(
    cache: &mut AnchorAvailabilityCache,
    durations: &[u32],
    response: &mut AvailabilityResponse,
) -> Result<()> {
    let mut slots = BTreeMap::new();
    for &duration in durations {
        slots.insert(duration, cache.get_time_list_format_for_duration(duration)?);
    }
    response.multi_duration_slots = Some(slots);
    response.available_durations = Some(cache.get_available_durations());
    Ok(())
}

/// Absorb upstream failures into an empty, well-formed response.
fn degrade(
    err: SchedulingError,
    markers: MarkerSet,
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
) -> Result<AvailabilityResponse> {
    if !err.is_upstream() {
        return Err(err);
    }

    warn!(
        error = %err,
        marker = %markers.base,
        "calendar unavailable; returning empty availability"
    );
    let mut response = AvailabilityResponse::window(time_min, time_max);
    response.containers = Some(Vec::new());
    response.markers = Some(markers);
    response.degraded = true;
    Ok(response)
}
