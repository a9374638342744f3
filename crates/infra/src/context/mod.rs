//! Scheduling context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use slotline_core::calendar_ports::{CalendarGateway, GeocodingPort};
use slotline_core::AvailabilityService;
use slotline_domain::{Config, Result, SchedulingError};
use tracing::info;

use crate::http::HttpClient;
use crate::integrations::calendar::{
    CredentialProvider, CredentialSource, GoogleCalendarGateway, RefreshTokenExchange,
};
use crate::integrations::geocoding::GoogleGeocoder;
use crate::{config, observability};

const USER_AGENT: &str = concat!("slotline/", env!("CARGO_PKG_VERSION"));

/// Wires configuration to the Google adapters and the orchestrator.
pub struct SchedulingContext {
    pub config: Config,
    pub credentials: Arc<dyn CredentialSource>,
    pub gateway: Arc<dyn CalendarGateway>,
    pub geocoder: Option<Arc<dyn GeocodingPort>>,
    pub availability: Arc<AvailabilityService>,
}

impl SchedulingContext {
    /// Load configuration, install tracing and build the context.
    pub fn load() -> Result<Self> {
        let config = config::load()?;
        observability::init_tracing(&config.logging)?;
        Self::new(config)
    }

    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let calendar = &config.calendar;
        let client_secret = required(calendar.client_secret.as_deref(), "client_secret")?;
        let refresh_token = required(calendar.refresh_token.as_deref(), "refresh_token")?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(calendar.request_timeout_seconds))
            .user_agent(USER_AGENT)
            .build()?;

        let exchange = RefreshTokenExchange::new(
            http.clone(),
            calendar.token_endpoint.clone(),
            calendar.client_id.clone(),
            client_secret,
            refresh_token,
        );
        let credentials: Arc<dyn CredentialSource> = Arc::new(CredentialProvider::new(exchange));

        let gateway: Arc<dyn CalendarGateway> = Arc::new(GoogleCalendarGateway::from_config(
            http.clone(),
            calendar,
            credentials.clone(),
        ));

        let geocoder: Option<Arc<dyn GeocodingPort>> =
            GoogleGeocoder::from_config(http, &config.geocoding)
                .map(|geocoder| Arc::new(geocoder) as Arc<dyn GeocodingPort>);

        let mut availability = AvailabilityService::new(
            gateway.clone(),
            config.scheduling.clone(),
            calendar.free_busy_ids(),
        )?;
        if let Some(geocoder) = &geocoder {
            availability = availability.with_geocoder(geocoder.clone());
        }

        info!(
            calendar_id = %calendar.calendar_id,
            geocoding = geocoder.is_some(),
            timezone = %config.scheduling.home_timezone,
            "scheduling context ready"
        );

        Ok(Self { config, credentials, gateway, geocoder, availability: Arc::new(availability) })
    }
}

fn required(value: Option<&str>, field: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SchedulingError::Config(format!("calendar.{field} is required")))
}
