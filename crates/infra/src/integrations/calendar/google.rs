//! Google Calendar gateway

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use slotline_core::calendar_ports::{CalendarGateway, EventQuery};
use slotline_domain::{CalendarConfig, CalendarEvent, Interval, Result, SchedulingError};
use tracing::{debug, instrument, warn};

use super::credentials::CredentialSource;
use super::types::{
    merge_intervals, FreeBusyItem, FreeBusyRequest, FreeBusyResponse, GoogleCalendarEvent,
    GoogleEventsResponse,
};
use crate::http::HttpClient;

const PAGE_SIZE: &str = "250";

/// [`CalendarGateway`] over the Google Calendar v3 REST API.
pub struct GoogleCalendarGateway {
    http: HttpClient,
    base_url: String,
    calendar_id: String,
    credentials: Arc<dyn CredentialSource>,
}

impl GoogleCalendarGateway {
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        calendar_id: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            calendar_id: calendar_id.into(),
            credentials,
        }
    }

    pub fn from_config(
        http: HttpClient,
        config: &CalendarConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self::new(http, config.api_base_url.clone(), config.calendar_id.clone(), credentials)
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(&self.calendar_id))
    }

    /// Attach the bearer token and send; a 401 drops the cached credential.
    async fn authorized(&self, builder: RequestBuilder, context: &str) -> Result<Response> {
        let token = self.credentials.get().await?;
        let response = self.http.send(builder.bearer_auth(token)).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(context, "calendar rejected access credential; invalidating");
            self.credentials.invalidate().await;
        }

        HttpClient::check_status(response, context).await
    }

    async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            SchedulingError::Upstream(format!("Failed to parse {context} response: {e}"))
        })
    }
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl CalendarGateway for GoogleCalendarGateway {
    #[instrument(skip(self, calendar_ids), fields(calendars = calendar_ids.len()))]
    async fn free_busy(
        &self,
        calendar_ids: &[String],
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<Interval>> {
        let body = FreeBusyRequest {
            time_min,
            time_max,
            items: calendar_ids.iter().map(|id| FreeBusyItem { id }).collect(),
        };
        let request =
            self.http.request(Method::POST, format!("{}/freeBusy", self.base_url)).json(&body);

        let response = self.authorized(request, "free-busy query").await?;
        let payload: FreeBusyResponse = Self::decode(response, "free-busy").await?;

        let mut busy = Vec::new();
        for (calendar_id, calendar) in payload.calendars {
            for error in &calendar.errors {
                warn!(
                    calendar_id = %calendar_id,
                    domain = error.domain.as_deref().unwrap_or("unknown"),
                    reason = error.reason.as_deref().unwrap_or("unknown"),
                    "free-busy unavailable for calendar"
                );
            }
            busy.extend(calendar.busy);
        }

        let merged = merge_intervals(busy);
        debug!(intervals = merged.len(), "free-busy merged");
        Ok(merged)
    }

    #[instrument(skip(self, query), fields(text = query.text.as_deref()))]
    async fn search_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>> {
        let mut params: Vec<(&str, String)> = vec![
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(text) = &query.text {
            params.push(("q", text.clone()));
        }
        if let Some(time_min) = query.time_min {
            params.push(("timeMin", rfc3339(time_min)));
        }
        if let Some(time_max) = query.time_max {
            params.push(("timeMax", rfc3339(time_max)));
        }

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.http.request(Method::GET, self.events_url()).query(&params);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = self.authorized(request, "events list").await?;
            let page: GoogleEventsResponse = Self::decode(response, "events list").await?;

            for item in page.items {
                match item.into_domain() {
                    Ok(event) => events.push(event),
                    Err(malformed) => warn!(
                        event_id = %malformed.id,
                        reason = %malformed.reason,
                        "skipping malformed calendar event"
                    ),
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(events = events.len(), "events fetched");
        Ok(events)
    }

    #[instrument(skip(self))]
    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent> {
        let url = format!("{}/{}", self.events_url(), urlencoding::encode(event_id));
        let request = self.http.request(Method::GET, url);

        let response = match self.authorized(request, "event lookup").await {
            Err(SchedulingError::NotFound(_)) => {
                return Err(SchedulingError::NotFound(format!("event {event_id} not found")));
            }
            other => other?,
        };

        let raw: GoogleCalendarEvent = Self::decode(response, "event").await?;
        raw.into_domain().map_err(|malformed| {
            SchedulingError::Upstream(format!(
                "event {} is malformed: {}",
                malformed.id, malformed.reason
            ))
        })
    }
}
