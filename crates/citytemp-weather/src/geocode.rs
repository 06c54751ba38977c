//! Coordinate extraction from OpenWeatherMap geocoding payloads.
//!
//! The direct-geocoding API answers with an array of matches; older or proxied
//! deployments answer with a single object. Both shapes are accepted and the
//! first match wins.

use serde_json::Value;

use crate::types::{Coordinates, WeatherError};

/// Pull the first `lat`/`lon` pair out of a geocoding response.
///
/// Returns `Ok(None)` when the payload has no match or either field is
/// absent/null. Fields that are present but not numeric are a parse error.
pub fn coordinates_from_payload(payload: &Value) -> Result<Option<Coordinates>, WeatherError> {
    let entry = match payload {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return Ok(None),
        },
        other => other,
    };

    let lat = entry.get("lat").filter(|v| !v.is_null());
    let lon = entry.get("lon").filter(|v| !v.is_null());

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(Coordinates {
            lat: coordinate("lat", lat)?,
            lon: coordinate("lon", lon)?,
        })),
        _ => Ok(None),
    }
}

// Numbers and numeric strings are both seen in the wild.
fn coordinate(field: &str, value: &Value) -> Result<f64, WeatherError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| WeatherError::Parse(format!("{} out of range: {}", field, n))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| WeatherError::Parse(format!("{} is not numeric: {:?}", field, s))),
        other => Err(WeatherError::Parse(format!(
            "{} has unexpected type: {}",
            field, other
        ))),
    }
}
