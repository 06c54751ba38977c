use std::sync::Arc;

use citytemp_weather::TemperatureCache;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<TemperatureCache>,
}

impl AppState {
    pub fn new(cache: Arc<TemperatureCache>) -> Self {
        Self { cache }
    }
}
