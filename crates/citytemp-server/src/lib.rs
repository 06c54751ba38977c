//! HTTP surface for citytemp.
//!
//! # Endpoints
//!
//! - `GET {prefix}/get-weather` - Cached temperature for a date (token required)
//! - `GET {prefix}/health` - Health check

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod auth;
pub mod error;
pub mod refresh;
pub mod routes;
pub mod state;

pub use auth::{AuthError, AuthToken};
pub use error::ApiError;
pub use state::AppState;

/// Build the router, mounted under `prefix` ("" or "/" for the root).
pub fn app(state: AppState, prefix: &str) -> Router {
    let api = Router::new()
        .route("/get-weather", get(routes::weather::get_weather))
        .route("/health", get(routes::health::check))
        .with_state(state);

    let prefix = prefix.trim_end_matches('/');
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    with_middleware(router)
}

/// Wrap a router with request tracing and the panic-to-400 boundary.
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}
