use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Optional settings file in the working directory (`citytemp.toml`).
const CONFIG_FILE: &str = "citytemp";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Service configuration.
///
/// `city`, `openweathermap_api_key` and `server_path` are required; they come
/// from the `CITY`, `OPENWEATHERMAP_API_KEY` and `SERVER_PATH` environment
/// variables (or the matching lower-case keys in `citytemp.toml`).
#[derive(Clone, Deserialize)]
pub struct Config {
    /// City whose temperature is tracked
    pub city: String,

    /// OpenWeatherMap API key, sent as `appid`
    pub openweathermap_api_key: String,

    /// Path prefix the HTTP routes are mounted under ("" for none)
    pub server_path: String,

    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout for each outbound provider request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Geocoding endpoint override (city name to coordinates)
    #[serde(default)]
    pub geocoding_url: Option<String>,

    /// Current-weather endpoint override (coordinates to conditions)
    #[serde(default)]
    pub weather_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout_secs() -> u64 {
    10
}

// Keeps the API key out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("city", &self.city)
            .field("openweathermap_api_key", &"<redacted>")
            .field("server_path", &self.server_path)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("geocoding_url", &self.geocoding_url)
            .field("weather_url", &self.weather_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from `citytemp.toml` (if present) overlaid with the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name(CONFIG_FILE).required(false))
            .add_source(::config::Environment::default());
        Self::from_builder(builder)
    }

    /// Load configuration from an explicit set of environment-style variables.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let builder = ::config::Config::builder()
            .add_source(::config::Environment::default().source(Some(source)));
        Self::from_builder(builder)
    }

    fn from_builder(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config = builder.build()?.try_deserialize::<Config>()?;
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load().map_err(ConfigError::into_report)?.validated()
    }

    /// Validate an already-loaded configuration, logging any warnings.
    pub fn validated(self) -> Result<(Self, ValidationResult)> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into_report());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.city.trim().is_empty() {
            result.add_error("city", "City must not be empty");
        }

        if self.openweathermap_api_key.trim().is_empty() {
            result.add_error("openweathermap_api_key", "API key must not be empty");
        }

        let prefix = self.server_path.trim_end_matches('/');
        if !prefix.is_empty() && !prefix.starts_with('/') {
            result.add_error(
                "server_path",
                format!("Path prefix must start with '/', got: {}", self.server_path),
            );
        }

        if self.port == 0 {
            result.add_error("port", "Port cannot be 0");
        }

        if self.request_timeout_secs == 0 {
            result.add_error(
                "request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.request_timeout_secs > 120 {
            result.add_warning(
                "request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if let Some(url) = &self.geocoding_url {
            self.validate_url(url, "geocoding_url", &mut result);
        }
        if let Some(url) = &self.weather_url {
            self.validate_url(url, "weather_url", &mut result);
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Route prefix with any trailing slash removed; empty means root.
    pub fn api_prefix(&self) -> &str {
        self.server_path.trim_end_matches('/')
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
