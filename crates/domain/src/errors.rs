//! Error types used throughout the scheduling engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Slotline
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SchedulingError {
    /// Input event is missing data the requested mode depends on (e.g. an
    /// anchor without concrete start/end instants).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Calendar or geocoding call failed (network, non-2xx, bad payload).
    #[error("Upstream fetch error: {0}")]
    Upstream(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SchedulingError {
    /// Whether the failure originated outside this process (calendar API,
    /// credential exchange). Container modes degrade on these instead of
    /// propagating them.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::Auth(_))
    }

    /// Stable label for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Upstream(_) => "upstream",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for scheduling operations
pub type Result<T> = std::result::Result<T, SchedulingError>;
