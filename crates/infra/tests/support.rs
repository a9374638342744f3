//! Shared helpers for adapter tests against `wiremock` servers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use slotline_domain::Result as DomainResult;
use slotline_infra::integrations::calendar::CredentialSource;
use slotline_infra::{GoogleCalendarGateway, HttpClient};

pub const ACCESS_TOKEN: &str = "test-access-token";

/// Fixed bearer token that counts invalidations.
#[derive(Default)]
pub struct StaticCredentials {
    invalidations: AtomicUsize,
}

impl StaticCredentials {
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn get(&self) -> DomainResult<String> {
        Ok(ACCESS_TOKEN.to_string())
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn http() -> HttpClient {
    HttpClient::builder().timeout(std::time::Duration::from_secs(5)).build().unwrap()
}

pub fn gateway(base_url: &str) -> (GoogleCalendarGateway, Arc<StaticCredentials>) {
    let credentials = Arc::new(StaticCredentials::default());
    let gateway = GoogleCalendarGateway::new(http(), base_url, "primary", credentials.clone());
    (gateway, credentials)
}

/// 2025-03-10 at `hour:00` UTC.
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
}
