//! Cached temperature lookup.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthToken;
use crate::error::ApiError;
use crate::state::AppState;

/// Query string for `GET /get-weather`.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub year: String,
    pub month: String,
    pub day: String,
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemperatureResponse {
    pub temp: f64,
}

/// GET /get-weather - Temperature recorded for a date.
///
/// `200 {"temp": ..}` on a hit, `404 {}` when nothing was recorded that day.
pub async fn get_weather(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;

    AuthToken::from_request(query.auth_token.as_deref(), &headers)?;
    tracing::info!("Token verified");

    let reading = state.cache.lookup(&query.year, &query.month, &query.day)?;

    Ok(match reading {
        Some(temp) => (StatusCode::OK, Json(TemperatureResponse { temp })).into_response(),
        None => {
            tracing::debug!(
                "No temperature for {}-{}-{}",
                query.year,
                query.month,
                query.day
            );
            (StatusCode::NOT_FOUND, Json(serde_json::json!({}))).into_response()
        }
    })
}
