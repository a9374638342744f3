//! Observability infrastructure
//!
//! Structured logging through `tracing`, configured from [`LoggingConfig`].
//!
//! [`LoggingConfig`]: slotline_domain::LoggingConfig

pub mod logging;

pub use logging::{env_filter, init_tracing};
