//! # Slotline Domain
//!
//! Business domain types for the slot-generation engine.
//!
//! This crate contains:
//! - Calendar event, interval, and slot types
//! - The domain error type and Result alias
//! - Configuration structures
//! - Marker constants and location parsing
//!
//! ## Architecture
//! - No dependencies on other Slotline crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::location::parse_event_location;
