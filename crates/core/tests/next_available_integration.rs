//! Next-available scenarios in the default home timezone (America/New_York).
//!
//! 2025-03-10 falls on EDT, so local time is UTC-4 unless a test says otherwise.
//! US daylight saving starts on 2025-03-09.

mod support;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use slotline_core::{AvailabilityRequest, AvailabilityService, MockClock, SchedulingMode};
use slotline_domain::{AvailabilityResponse, Coordinates, Interval, SchedulingConfig, TimeListEntry};
use support::calendar::{MockCalendarGateway, MockGeocoder};
use support::{at, timed_event};

fn next_day(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 11, hour, minute, 0).unwrap()
}

fn entry(start: DateTime<Utc>, end: DateTime<Utc>, location: &str) -> TimeListEntry {
    TimeListEntry { start, end, location: Some(location.to_string()) }
}

fn march(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap()
}

async fn next_available(
    gateway: &MockCalendarGateway,
    now: DateTime<Utc>,
    config: SchedulingConfig,
    geocoder: Option<MockGeocoder>,
) -> AvailabilityResponse {
    let mut service =
        AvailabilityService::new(Arc::new(gateway.clone()), config, vec!["primary".to_string()])
            .unwrap()
            .with_clock(Arc::new(MockClock::at(now)));
    if let Some(geocoder) = geocoder {
        service = service.with_geocoder(Arc::new(geocoder));
    }

    service
        .get_availability(AvailabilityRequest::new(SchedulingMode::NextAvailable {
            query: "Q".to_string(),
        }))
        .await
        .unwrap()
}

fn anchored_gateway() -> MockCalendarGateway {
    let mut anchor = timed_event("anchor", "Q__EVENT__ visit", at(10, 0), at(11, 0));
    anchor.location = Some("1 Elm St".to_string());

    MockCalendarGateway::new(vec![
        anchor,
        timed_event("skip", "Q__EVENT__ next-exclude__EVENT__", at(9, 0), at(9, 30)),
        timed_event("lunch", "Lunch", at(12, 0), at(12, 30)),
    ])
}

#[tokio::test]
async fn anchored_grace_window_offers_only_boundary_slot() {
    let gateway = anchored_gateway();
    let geocoder = MockGeocoder::returning(Coordinates { lat: 40.7, lng: -74.0 });

    let response =
        next_available(&gateway, at(8, 0), SchedulingConfig::default(), Some(geocoder.clone()))
            .await;

    assert!(response.next_event_found);
    assert_eq!(response.current_event.as_ref().map(|e| e.id.as_str()), Some("anchor"));
    assert_eq!(response.target_date, None);

    let slots = response.multi_duration_slots.unwrap();
    assert_eq!(slots[&30], vec![entry(at(11, 30), at(12, 0), "1 Elm St")]);
    assert!(slots[&60].is_empty());
    assert!(slots[&90].is_empty());
    assert_eq!(response.available_durations, Some(vec![30]));

    assert_eq!(response.start, at(11, 0));
    assert_eq!(response.end, at(13, 0));
    assert_eq!(response.busy, vec![Interval::new(at(12, 0), at(12, 30))]);

    assert_eq!(response.coordinates, Some(Coordinates { lat: 40.7, lng: -74.0 }));
    assert_eq!(geocoder.lookups(), vec!["1 Elm St".to_string()]);
}

#[tokio::test]
async fn anchor_lookup_searches_lookahead_then_fetches_surroundings() {
    let gateway = anchored_gateway();

    next_available(&gateway, at(8, 0), SchedulingConfig::default(), None).await;

    let searches = gateway.searches();
    assert_eq!(searches.len(), 2);
    assert_eq!(searches[0].text.as_deref(), Some("Q__EVENT__"));
    assert_eq!(searches[0].time_min, Some(at(8, 0)));
    assert_eq!(searches[0].time_max, Some(next_day(2, 0)));
    assert_eq!(searches[1].text, None);
    assert!(gateway.free_busy_calls().is_empty());
}

#[tokio::test]
async fn wider_grace_steps_by_cadence() {
    let gateway = MockCalendarGateway::new(vec![timed_event(
        "anchor",
        "Q__EVENT__",
        at(10, 0),
        at(11, 0),
    )]);
    let config =
        SchedulingConfig { next_available_grace_minutes: 60, ..SchedulingConfig::default() };

    let response = next_available(&gateway, at(8, 0), config, None).await;

    let starts: Vec<_> =
        response.multi_duration_slots.unwrap()[&60].iter().map(|slot| slot.start).collect();
    assert_eq!(starts, vec![at(11, 30), at(11, 45), at(12, 0)]);
}

#[tokio::test]
async fn geocoding_failure_omits_coordinates() {
    let gateway = anchored_gateway();

    let geocoder = Some(MockGeocoder::failing());
    let response = next_available(&gateway, at(8, 0), SchedulingConfig::default(), geocoder).await;

    assert!(response.next_event_found);
    assert_eq!(response.coordinates, None);
}

#[tokio::test]
async fn anchor_starting_now_or_in_progress_falls_back() {
    let gateway = MockCalendarGateway::new(vec![
        timed_event("starting", "Q__EVENT__", at(14, 0), at(15, 0)),
        timed_event("running", "Q__EVENT__", at(13, 30), at(14, 30)),
    ]);

    let response = next_available(&gateway, at(14, 0), SchedulingConfig::default(), None).await;

    assert!(!response.next_event_found);
    assert_eq!(response.current_event, None);
    assert!(response.target_date.is_some());
    assert_eq!(gateway.free_busy_calls().len(), 1);
}

#[tokio::test]
async fn fallback_targets_today_with_lead_time() {
    let gateway = MockCalendarGateway::default().with_busy(vec![
        Interval::new(at(15, 0), at(16, 0)),
        Interval::new(next_day(14, 0), next_day(15, 0)),
    ]);

    // 09:00 local; one hour lead gives 10:00 local.
    let response = next_available(&gateway, at(13, 0), SchedulingConfig::default(), None).await;

    assert_eq!(response.target_date, NaiveDate::from_ymd_opt(2025, 3, 10));
    assert_eq!((response.start, response.end), (at(14, 0), at(22, 0)));
    assert_eq!(response.busy, vec![Interval::new(at(15, 0), at(16, 0))]);
    assert!(!response.next_event_found);

    let calls = gateway.free_busy_calls();
    assert_eq!(calls[0].time_min, at(4, 0));
    assert_eq!(calls[0].time_max, Utc.with_ymd_and_hms(2025, 3, 12, 4, 0, 0).unwrap());
    assert_eq!(calls[0].calendar_ids, vec!["primary".to_string()]);
}

#[tokio::test]
async fn fallback_clamps_to_opening_hour() {
    let gateway = MockCalendarGateway::default();

    // 05:00 local.
    let response = next_available(&gateway, at(9, 0), SchedulingConfig::default(), None).await;

    assert_eq!(response.target_date, NaiveDate::from_ymd_opt(2025, 3, 10));
    assert_eq!((response.start, response.end), (at(13, 0), at(22, 0)));
}

#[tokio::test]
async fn fallback_rounds_up_to_cadence() {
    let gateway = MockCalendarGateway::default();

    // 16:07 local; 17:07 rounds to 17:15 and a 30 minute session still fits.
    let response = next_available(&gateway, at(20, 7), SchedulingConfig::default(), None).await;

    assert_eq!(response.target_date, NaiveDate::from_ymd_opt(2025, 3, 10));
    assert_eq!((response.start, response.end), (at(21, 15), at(22, 0)));
}

#[tokio::test]
async fn fallback_moves_to_tomorrow_near_closing() {
    let gateway = MockCalendarGateway::default().with_busy(vec![
        Interval::new(at(21, 0), at(21, 30)),
        Interval::new(next_day(14, 0), next_day(15, 0)),
    ]);

    // 16:50 local; 17:50 rounds to 18:00, leaving no room before closing.
    let response = next_available(&gateway, at(20, 50), SchedulingConfig::default(), None).await;

    assert_eq!(response.target_date, NaiveDate::from_ymd_opt(2025, 3, 11));
    assert_eq!((response.start, response.end), (next_day(13, 0), next_day(22, 0)));
    assert_eq!(response.busy, vec![Interval::new(next_day(14, 0), next_day(15, 0))]);
}

#[tokio::test]
async fn anchored_slots_ignore_surrounding_container() {
    let gateway = MockCalendarGateway::new(vec![
        timed_event("window", "Q__EVENT__CONTAINER__", at(6, 0), at(20, 0)),
        timed_event("anchor", "Q__EVENT__MEMBER__ Jane", at(10, 0), at(11, 0)),
    ]);

    let response = next_available(&gateway, at(9, 30), SchedulingConfig::default(), None).await;

    assert!(response.next_event_found);
    assert_eq!(response.current_event.as_ref().map(|e| e.id.as_str()), Some("anchor"));
    let slots = response.multi_duration_slots.unwrap();
    let spans: Vec<_> = slots[&30].iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(spans, vec![(at(11, 30), at(12, 0))]);
    assert!(response.busy.is_empty());
}

#[tokio::test]
async fn long_lead_time_pushes_tomorrow_window_past_opening() {
    let gateway = MockCalendarGateway::default();
    let config = SchedulingConfig { lead_time_minutes: 1200, ..SchedulingConfig::default() };

    // 17:00 local; twenty hours of lead lands on 13:00 local tomorrow.
    let response = next_available(&gateway, at(21, 0), config, None).await;

    assert_eq!(response.target_date, NaiveDate::from_ymd_opt(2025, 3, 11));
    assert_eq!((response.start, response.end), (next_day(17, 0), next_day(22, 0)));
    assert!(response.start >= at(21, 0) + chrono::Duration::minutes(1200));
}

#[tokio::test]
async fn multi_day_lead_time_skips_ahead_and_widens_free_busy() {
    let gateway = MockCalendarGateway::default()
        .with_busy(vec![Interval::new(march(12, 18, 0), march(12, 19, 0))]);
    let config = SchedulingConfig { lead_time_minutes: 3000, ..SchedulingConfig::default() };

    // 09:00 local; fifty hours of lead lands on 11:00 local two days out.
    let response = next_available(&gateway, at(13, 0), config, None).await;

    assert_eq!(response.target_date, NaiveDate::from_ymd_opt(2025, 3, 12));
    assert_eq!((response.start, response.end), (march(12, 15, 0), march(12, 22, 0)));
    assert_eq!(response.busy, vec![Interval::new(march(12, 18, 0), march(12, 19, 0))]);

    let calls = gateway.free_busy_calls();
    assert_eq!(calls[0].time_min, at(4, 0));
    assert_eq!(calls[0].time_max, march(12, 22, 0));
}

#[tokio::test]
async fn fallback_on_spring_forward_day_skips_missing_hour() {
    // 2025-03-09: 02:00 EST jumps to 03:00 EDT.
    let gateway = MockCalendarGateway::default();
    let config = SchedulingConfig { opening_hour: 2, ..SchedulingConfig::default() };

    // 00:30 EST; the 02:00 opening does not exist and resolves to 03:00 EDT.
    let response = next_available(&gateway, march(9, 5, 30), config, None).await;

    assert_eq!(response.target_date, NaiveDate::from_ymd_opt(2025, 3, 9));
    assert_eq!((response.start, response.end), (march(9, 7, 0), march(9, 22, 0)));

    let calls = gateway.free_busy_calls();
    assert_eq!(calls[0].time_min, march(9, 5, 0));
    assert_eq!(calls[0].time_max, march(11, 5, 0));
}

#[tokio::test]
async fn lead_rounding_into_skipped_hour_moves_forward() {
    let gateway = MockCalendarGateway::default();
    let config = SchedulingConfig { opening_hour: 1, ..SchedulingConfig::default() };

    // 00:50 EST plus an hour rounds to 02:00, which is skipped; 03:00 EDT follows.
    let response = next_available(&gateway, march(9, 5, 50), config, None).await;

    assert_eq!(response.target_date, NaiveDate::from_ymd_opt(2025, 3, 9));
    assert_eq!((response.start, response.end), (march(9, 7, 0), march(9, 22, 0)));
}
