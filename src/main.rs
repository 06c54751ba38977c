use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use citytemp_core::Config;
use citytemp_server::{refresh, AppState};
use citytemp_weather::client::{CURRENT_WEATHER_URL, GEOCODING_URL};
use citytemp_weather::{TemperatureCache, WeatherClient};

#[tokio::main]
async fn main() -> Result<()> {
    citytemp_core::init()?;

    let (config, _validation) = Config::load_validated()?;

    tracing::info!(
        city = %config.city,
        prefix = %config.api_prefix(),
        addr = %config.bind_addr(),
        "Starting citytemp"
    );

    let client = WeatherClient::with_timeout(
        &config.city,
        &config.openweathermap_api_key,
        config.request_timeout(),
    )
    .context("Failed to build weather client")?
    .with_endpoints(
        config.geocoding_url.as_deref().unwrap_or(GEOCODING_URL),
        config.weather_url.as_deref().unwrap_or(CURRENT_WEATHER_URL),
    );

    let cache = Arc::new(TemperatureCache::new());
    let shutdown = CancellationToken::new();

    let refresher = refresh::spawn_refresh(
        Arc::new(client),
        Arc::clone(&cache),
        refresh::REFRESH_INTERVAL,
        shutdown.clone(),
    );

    let app = citytemp_server::app(AppState::new(cache), config.api_prefix());

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    citytemp_server::serve(listener, app, shutdown.clone())
        .await
        .context("HTTP server failed")?;

    shutdown.cancel();
    if let Err(e) = refresher.await {
        tracing::error!("Refresh task ended abnormally: {}", e);
    }

    tracing::info!("citytemp stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
