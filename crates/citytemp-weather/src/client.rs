//! OpenWeatherMap client: city name to coordinates to current temperature.

use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::geocode::coordinates_from_payload;
use crate::types::{Coordinates, WeatherError};

pub const GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
pub const CURRENT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches the current temperature for one fixed city.
///
/// Every call performs fresh network I/O; nothing is cached or retried here.
#[derive(Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    city: String,
    api_key: String,
    geocoding_url: String,
    weather_url: String,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("city", &self.city)
            .field("geocoding_url", &self.geocoding_url)
            .field("weather_url", &self.weather_url)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    pub fn new(city: &str, api_key: &str) -> Result<Self, WeatherError> {
        Self::with_timeout(city, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client whose requests each give up after `timeout`.
    pub fn with_timeout(city: &str, api_key: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            city: city.to_string(),
            api_key: api_key.to_string(),
            geocoding_url: GEOCODING_URL.to_string(),
            weather_url: CURRENT_WEATHER_URL.to_string(),
        })
    }

    /// Point the client at different geocoding/current-weather endpoints.
    pub fn with_endpoints(mut self, geocoding_url: &str, weather_url: &str) -> Self {
        self.geocoding_url = geocoding_url.to_string();
        self.weather_url = weather_url.to_string();
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Geocode the configured city.
    ///
    /// `Ok(None)` means the provider answered but had no coordinates.
    #[instrument(skip(self), fields(city = %self.city), level = "debug")]
    pub async fn resolve_coordinates(&self) -> Result<Option<Coordinates>, WeatherError> {
        let response = self
            .client
            .get(&self.geocoding_url)
            .query(&[("q", self.city.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let body = read_json(response).await?;
        let coords = coordinates_from_payload(&body)?;

        match coords {
            Some(c) => tracing::debug!("Geocoded {} to {}, {}", self.city, c.lat, c.lon),
            None => tracing::debug!("Geocoding returned no coordinates for {}", self.city),
        }
        Ok(coords)
    }

    /// Current temperature for the configured city, in provider units (Kelvin).
    ///
    /// `Ok(None)` when geocoding found nothing or the weather payload has no
    /// numeric `main.temp`.
    #[instrument(skip(self), fields(city = %self.city), level = "debug")]
    pub async fn resolve_temperature(&self) -> Result<Option<f64>, WeatherError> {
        let Some(coords) = self.resolve_coordinates().await? else {
            return Ok(None);
        };

        let response = self
            .client
            .get(&self.weather_url)
            .query(&[("lat", coords.lat), ("lon", coords.lon)])
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let body = read_json(response).await?;
        Ok(body
            .get("main")
            .and_then(|main| main.get("temp"))
            .and_then(Value::as_f64))
    }
}

async fn read_json(response: Response) -> Result<Value, WeatherError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(WeatherError::Api {
            status: status.as_u16(),
            message: provider_message(&text),
        });
    }

    Ok(serde_json::from_str(&text)?)
}

// OpenWeatherMap error bodies look like {"cod": 401, "message": "..."}.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
