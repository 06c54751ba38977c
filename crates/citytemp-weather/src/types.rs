/// Geographic coordinates as returned by the geocoding API
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

// reqwest renders the request URL, and the URL carries `appid`.
impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Network(err.without_url())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}

/// Errors building a cache key from caller-supplied date parts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("Invalid {field}: {value:?} is not a number")]
    NotANumber { field: &'static str, value: String },
    #[error("Invalid date: {year}-{month}-{day} is not a calendar date")]
    OutOfRange { year: i32, month: u32, day: u32 },
}
