//! Next-available booking: short grace window after the next marked event,
//! or a today/tomorrow fallback when nothing is coming up.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use slotline_domain::constants::{EXCLUDE_MARKER, FALLBACK_FREE_BUSY_DAYS};
use slotline_domain::{
    parse_event_location, CalendarEvent, Coordinates, Interval, MarkerSet, Result,
    SchedulingConfig, SchedulingError,
};
use tracing::{debug, info, instrument, warn};

use super::cache::{AnchorAvailabilityCache, AnchorCacheOptions};
use crate::calendar_ports::{CalendarGateway, EventQuery, GeocodingPort};
use crate::utils::clock::Clock;

/// Earliest marked, non-excluded event starting strictly after `now`.
pub fn select_next_upcoming_event(
    events: &[CalendarEvent],
    markers: &MarkerSet,
    now: DateTime<Utc>,
) -> Option<CalendarEvent> {
    events
        .iter()
        .filter(|event| !event.is_cancelled())
        .filter(|event| event.mentions(&markers.base))
        .filter(|event| !event.mentions(EXCLUDE_MARKER))
        .filter_map(|event| event.start.date_time.map(|start| (start, event)))
        .filter(|(start, _)| *start > now)
        .min_by_key(|(start, _)| *start)
        .map(|(_, event)| event.clone())
}

/// Day picked by the fallback and the bookable window on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackTarget {
    pub target_date: NaiveDate,
    pub window: Interval,
    pub is_today: bool,
}

/// Result of a next-available lookup.
pub enum NextAvailableOutcome {
    Anchored {
        cache: AnchorAvailabilityCache,
        coordinates: Option<Coordinates>,
    },
    Fallback {
        target: FallbackTarget,
        busy: Vec<Interval>,
    },
}

pub struct NextAvailableMode {
    gateway: Arc<dyn CalendarGateway>,
    geocoder: Option<Arc<dyn GeocodingPort>>,
    clock: Arc<dyn Clock>,
    config: SchedulingConfig,
    timezone: Tz,
}

impl NextAvailableMode {
    pub fn new(
        gateway: Arc<dyn CalendarGateway>,
        clock: Arc<dyn Clock>,
        config: SchedulingConfig,
    ) -> Result<Self> {
        let timezone = config.timezone()?;
        Ok(Self { gateway, geocoder: None, clock, config, timezone })
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn GeocodingPort>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Search `[now, now + lookahead]` for the next anchor.
    #[instrument(skip(self))]
    pub async fn get_next_upcoming_event(&self, query: &str) -> Result<Option<CalendarEvent>> {
        let now = self.clock.now();
        let horizon = now + Duration::hours(i64::from(self.config.next_event_lookahead_hours));
        let markers = MarkerSet::for_query(query);

        let events = self
            .gateway
            .search_events(&EventQuery::window(now, horizon).with_text(markers.base.clone()))
            .await?;

        let next = select_next_upcoming_event(&events, &markers, now);
        debug!(
            candidates = events.len(),
            anchor_id = next.as_ref().map(|event| event.id.as_str()),
            "next upcoming event lookup"
        );
        Ok(next)
    }

    /// Forward-only cache covering the grace window after `anchor`.
    pub async fn anchor_cache(&self, anchor: CalendarEvent) -> Result<AnchorAvailabilityCache> {
        let grace = i64::from(self.config.next_available_grace_minutes);
        let buffer = i64::from(self.config.buffer_minutes);
        let options = AnchorCacheOptions {
            slot_interval_minutes: self.config.slot_interval_minutes,
            buffer_minutes: self.config.buffer_minutes,
            lookaround: Duration::hours(i64::from(self.config.adjacency_span_hours)),
            before_span: None,
            after_span: Duration::minutes((grace - buffer).max(0)),
        };

        AnchorAvailabilityCache::build(self.gateway.as_ref(), anchor, options, self.clock.clone())
            .await
    }

    /// Best-effort coordinates for the anchor's location.
    pub async fn coordinates_for(&self, anchor: &CalendarEvent) -> Option<Coordinates> {
        let geocoder = self.geocoder.as_ref()?;
        let location = parse_event_location(anchor)?;

        match geocoder.geocode(&location).await {
            Ok(coordinates) => coordinates,
            Err(err) => {
                warn!(error = %err, location = %location, "geocoding failed; omitting coordinates");
                None
            }
        }
    }

    /// First day, starting today, whose window from `max(now + lead, opening)`
    /// still fits a minimum session before closing.
    pub fn fallback_target(&self, now: DateTime<Utc>) -> Result<FallbackTarget> {
        let cadence = i64::from(self.config.slot_interval_minutes.max(1));
        let lead = Duration::minutes(i64::from(self.config.lead_time_minutes));
        let min_session = Duration::minutes(i64::from(self.config.min_session_minutes));

        let earliest_local = (now + lead).with_timezone(&self.timezone).naive_local();
        let earliest = self.to_utc(round_up_to_cadence(earliest_local, cadence))?;
        let last_candidate = earliest.with_timezone(&self.timezone).date_naive();

        let today = now.with_timezone(&self.timezone).date_naive();
        let mut day = today;
        while day <= last_candidate {
            let opening = self.local_hour(day, self.config.opening_hour)?;
            let closing = self.local_hour(day, self.config.closing_hour)?;
            let start = earliest.max(opening);

            if start + min_session <= closing {
                return Ok(FallbackTarget {
                    target_date: day,
                    window: Interval::new(start, closing),
                    is_today: day == today,
                });
            }
            day = next_day(day)?;
        }

        // Past the lead time entirely; the whole business day is bookable.
        Ok(FallbackTarget {
            target_date: day,
            window: Interval::new(
                self.local_hour(day, self.config.opening_hour)?,
                self.local_hour(day, self.config.closing_hour)?,
            ),
            is_today: false,
        })
    }

    /// Free-busy from local midnight today over at least two days, filtered to
    /// the target window.
    #[instrument(skip(self, calendar_ids))]
    pub async fn fallback_availability(
        &self,
        calendar_ids: &[String],
    ) -> Result<(FallbackTarget, Vec<Interval>)> {
        let now = self.clock.now();
        let target = self.fallback_target(now)?;

        let today = now.with_timezone(&self.timezone).date_naive();
        let time_min = self.local_hour(today, 0)?;
        let time_max =
            (time_min + Duration::days(FALLBACK_FREE_BUSY_DAYS)).max(target.window.end);

        let busy = self
            .gateway
            .free_busy(calendar_ids, time_min, time_max)
            .await?
            .into_iter()
            .filter(|interval| interval.overlaps(&target.window))
            .collect::<Vec<_>>();

        info!(
            target_date = %target.target_date,
            is_today = target.is_today,
            busy = busy.len(),
            "no upcoming anchor; using fallback day"
        );
        Ok((target, busy))
    }

    /// Anchor-driven grace window when an anchor exists, fallback otherwise.
    pub async fn resolve(
        &self,
        query: &str,
        calendar_ids: &[String],
    ) -> Result<NextAvailableOutcome> {
        match self.get_next_upcoming_event(query).await? {
            Some(anchor) => {
                let coordinates = self.coordinates_for(&anchor).await;
                let cache = self.anchor_cache(anchor).await?;
                Ok(NextAvailableOutcome::Anchored { cache, coordinates })
            }
            None => {
                let (target, busy) = self.fallback_availability(calendar_ids).await?;
                Ok(NextAvailableOutcome::Fallback { target, busy })
            }
        }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// `hour` may be 24 to mean the end of `date`.
    fn local_hour(&self, date: NaiveDate, hour: u32) -> Result<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            SchedulingError::Internal(format!("invalid local midnight for {date}"))
        })?;
        self.to_utc(midnight + Duration::hours(i64::from(hour)))
    }

    fn to_utc(&self, local: NaiveDateTime) -> Result<DateTime<Utc>> {
        // Wall-clock times skipped by a DST jump resolve an hour later.
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| self.timezone.from_local_datetime(&(local + Duration::hours(1))).earliest())
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                SchedulingError::Internal(format!(
                    "local time {local} does not exist in {}",
                    self.timezone
                ))
            })
    }
}

fn next_day(day: NaiveDate) -> Result<NaiveDate> {
    day.succ_opt()
        .ok_or_else(|| SchedulingError::Internal(format!("no calendar day after {day}")))
}

fn round_up_to_cadence(local: NaiveDateTime, cadence_minutes: i64) -> NaiveDateTime {
    let minute_of_day = i64::from(local.hour() * 60 + local.minute());
    let has_remainder = local.second() > 0 || local.nanosecond() > 0;
    let truncated = local - Duration::seconds(i64::from(local.second()))
        - Duration::nanoseconds(i64::from(local.nanosecond()));

    let remainder = minute_of_day % cadence_minutes;
    if remainder == 0 && !has_remainder {
        truncated
    } else {
        truncated + Duration::minutes(cadence_minutes - remainder)
    }
}
