//! Hourly fetch-and-store loop.
//!
//! Each tick asks the weather client for the current temperature and, when
//! one comes back, records it under today's date. Failed ticks are logged and
//! the loop carries on; missed ticks are dropped, not replayed.

use std::sync::Arc;
use std::time::Duration;

use citytemp_weather::{DateKey, TemperatureCache, WeatherClient};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Recorded { date: DateKey, temp: f64 },
    NoReading,
    Failed(String),
}

/// Fetch once and record the result. Never returns an error.
pub async fn run_tick(client: &WeatherClient, cache: &TemperatureCache) -> TickOutcome {
    match client.resolve_temperature().await {
        Ok(Some(temp)) => {
            let date = cache.record_today(temp);
            tracing::info!(%date, temp, city = client.city(), "Stored temperature");
            TickOutcome::Recorded { date, temp }
        }
        Ok(None) => {
            tracing::debug!(city = client.city(), "No temperature available, skipping tick");
            TickOutcome::NoReading
        }
        Err(e) => {
            tracing::warn!(city = client.city(), "Temperature refresh failed: {}", e);
            TickOutcome::Failed(e.to_string())
        }
    }
}

/// Spawn the refresh loop. The first tick runs immediately, then every
/// `every` until `shutdown` is cancelled.
pub fn spawn_refresh(
    client: Arc<WeatherClient>,
    cache: Arc<TemperatureCache>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(every_secs = every.as_secs(), "Refresh task started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Refresh task stopping");
                    break;
                }
                _ = interval.tick() => {
                    let client = Arc::clone(&client);
                    let cache = Arc::clone(&cache);
                    // Run in its own task so a panic ends the tick, not the loop.
                    let mut tick = tokio::spawn(async move { run_tick(&client, &cache).await });
                    tokio::select! {
                        _ = shutdown.cancelled() => {
                            tick.abort();
                            tracing::info!("Refresh task stopping, in-flight tick aborted");
                            break;
                        }
                        joined = &mut tick => {
                            if let Err(e) = joined {
                                tracing::error!("Refresh tick aborted: {}", e);
                            }
                        }
                    }
                }
            }
        }
    })
}
