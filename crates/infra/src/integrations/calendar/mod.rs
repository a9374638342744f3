//! Calendar integration
//!
//! Google Calendar REST gateway plus the credential cache it authenticates
//! with.

pub mod credentials;
pub mod google;
mod types;

pub use credentials::{
    AccessCredential, CredentialProvider, CredentialSource, GrantedToken, RefreshTokenExchange,
    TokenExchange,
};
pub use google::GoogleCalendarGateway;
