//! # Slotline Infrastructure
//!
//! Infrastructure implementations of core scheduling ports.
//!
//! This crate contains:
//! - Google Calendar and Geocoding adapters
//! - OAuth refresh-token credential cache
//! - HTTP client wrapper and error conversions
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `slotline-core`
//! - Contains all "impure" code (network, environment, filesystem)

pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;

// Re-export commonly used items
pub use context::SchedulingContext;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::calendar::{
    CredentialProvider, CredentialSource, GoogleCalendarGateway, RefreshTokenExchange,
};
pub use integrations::geocoding::GoogleGeocoder;
pub use observability::init_tracing;
