//! Weather lookups for citytemp
//!
//! Resolves the configured city's current temperature through the
//! OpenWeatherMap geocoding and current-weather APIs, and keeps one reading
//! per calendar day in memory.

pub mod cache;
pub mod client;
pub mod geocode;
pub mod types;

pub use cache::{DateKey, TemperatureCache};
pub use client::WeatherClient;
pub use types::*;
