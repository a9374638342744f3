//! Geocoding integration

pub mod google;

pub use google::GoogleGeocoder;
