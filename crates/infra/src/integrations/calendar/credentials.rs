//! Access credentials with expiry-aware caching
//!
//! Credentials are fetched lazily, reused until shortly before they expire,
//! and dropped when the calendar rejects them. A failed exchange is reported
//! as an `Auth` error and is never retried here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use slotline_core::utils::clock::{Clock, SystemClock};
use slotline_domain::constants::{CREDENTIAL_EXPIRY_SKEW_SECONDS, CREDENTIAL_LIFETIME_MINUTES};
use slotline_domain::{Result, SchedulingError};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::http::HttpClient;

/// Cached bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCredential {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessCredential {
    /// True when expired or expiring within `skew_seconds` of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, skew_seconds: i64) -> bool {
        now + Duration::seconds(skew_seconds) >= self.expires_at
    }
}

/// Token issued by an exchange, before the lifetime cap is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedToken {
    pub access_token: String,
    /// Lifetime in seconds as reported by the issuer.
    pub expires_in: Option<i64>,
}

/// Obtains a fresh access token.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self) -> Result<GrantedToken>;
}

/// What the calendar gateway needs from a credential store.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Current bearer token, refreshing when missing or near expiry.
    async fn get(&self) -> Result<String>;

    /// Drop the cached credential so the next `get` exchanges again.
    async fn invalidate(&self);
}

/// Expiry-aware credential cache over a [`TokenExchange`].
pub struct CredentialProvider<E: TokenExchange> {
    exchange: E,
    current: RwLock<Option<AccessCredential>>,
    clock: Arc<dyn Clock>,
    skew_seconds: i64,
    max_lifetime: Duration,
}

impl<E: TokenExchange> CredentialProvider<E> {
    pub fn new(exchange: E) -> Self {
        Self {
            exchange,
            current: RwLock::new(None),
            clock: Arc::new(SystemClock),
            skew_seconds: CREDENTIAL_EXPIRY_SKEW_SECONDS,
            max_lifetime: Duration::minutes(CREDENTIAL_LIFETIME_MINUTES),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Snapshot of the cached credential, without refreshing.
    pub async fn cached(&self) -> Option<AccessCredential> {
        self.current.read().await.clone()
    }

    async fn refresh(&self) -> Result<String> {
        let mut current = self.current.write().await;

        // Another caller may have refreshed while we waited for the lock.
        let now = self.clock.now();
        if let Some(credential) = current.as_ref() {
            if !credential.is_expired(now, self.skew_seconds) {
                return Ok(credential.value.clone());
            }
        }

        let granted = self.exchange.exchange().await?;
        let granted_lifetime =
            granted.expires_in.map_or(self.max_lifetime, Duration::seconds).min(self.max_lifetime);
        let credential = AccessCredential {
            value: granted.access_token,
            expires_at: now + granted_lifetime,
        };

        info!(expires_at = %credential.expires_at, "access credential refreshed");
        let value = credential.value.clone();
        *current = Some(credential);
        Ok(value)
    }
}

#[async_trait]
impl<E: TokenExchange> CredentialSource for CredentialProvider<E> {
    async fn get(&self) -> Result<String> {
        {
            let current = self.current.read().await;
            if let Some(credential) = current.as_ref() {
                if !credential.is_expired(self.clock.now(), self.skew_seconds) {
                    return Ok(credential.value.clone());
                }
            }
        }

        self.refresh().await
    }

    async fn invalidate(&self) {
        debug!("invalidating cached access credential");
        *self.current.write().await = None;
    }
}

/// OAuth refresh-token grant against a token endpoint.
pub struct RefreshTokenExchange {
    http: HttpClient,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl RefreshTokenExchange {
    pub fn new(
        http: HttpClient,
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[async_trait]
impl TokenExchange for RefreshTokenExchange {
    async fn exchange(&self) -> Result<GrantedToken> {
        let request = self.http.request(reqwest::Method::POST, &self.token_endpoint).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ]);

        let response = self
            .http
            .send_checked(request, "token refresh")
            .await
            .map_err(|err| SchedulingError::Auth(format!("Token refresh failed: {err}")))?;

        let body: TokenEndpointResponse = response.json().await.map_err(|e| {
            SchedulingError::Auth(format!("Failed to parse token response: {e}"))
        })?;

        Ok(GrantedToken { access_token: body.access_token, expires_in: body.expires_in })
    }
}
