// HTTP request handlers
use crate::application::forecast_service::ForecastError;
use crate::application::history_service::InvalidQuery;
use crate::application::upstream::UpstreamResponse;
use crate::domain::feed::FeedSnapshot;
use crate::domain::forecast::{ForecastRequest, KpPrediction, KpTrendPoint};
use crate::domain::imagery::SatelliteImage;
use crate::domain::solar_wind::{SolarWindData, SolarWindParameterPoint};
use crate::domain::storm::StormContext;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<u32>,
}

#[derive(Deserialize)]
pub struct DailyQuery {
    pub days: Option<u32>,
}

#[derive(Deserialize)]
pub struct StormQuery {
    pub kp: Option<f64>,
}

/// Error body returned as `{"error": "..."}`
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<InvalidQuery> for ApiError {
    fn from(e: InvalidQuery) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(e: ForecastError) -> Self {
        let status = match e {
            ForecastError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ForecastError::Upstream(_) | ForecastError::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current live window plus fetch status
pub async fn live_snapshot(State(state): State<Arc<AppState>>) -> Json<FeedSnapshot> {
    Json(state.feed.snapshot())
}

/// Full upstream reading in the `{data?, error?}` envelope, fetched on demand
pub async fn latest_solar_wind(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<UpstreamResponse<SolarWindData>>) {
    match state.fetcher.fetch_latest_data().await {
        Ok(data) => (StatusCode::OK, Json(UpstreamResponse::ok(data))),
        Err(e) => {
            tracing::warn!("Latest solar wind fetch failed: {}", e);
            (StatusCode::BAD_GATEWAY, Json(UpstreamResponse::err(e.to_string())))
        }
    }
}

/// Server-sent events, one snapshot per publish
pub async fn live_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.feed.subscribe()).map(|snapshot| {
        let event = Event::default().event("snapshot");
        Ok(match event.json_data(&snapshot) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Failed to encode feed snapshot: {}", e);
                Event::default().comment("encode error")
            }
        })
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn kp_history(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<KpTrendPoint>>, ApiError> {
    Ok(Json(state.history_service.kp_trend(query.hours)?))
}

pub async fn solar_wind_history(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SolarWindParameterPoint>>, ApiError> {
    Ok(Json(state.history_service.solar_wind_series(query.hours)?))
}

pub async fn kp_daily_history(
    Query(query): Query<DailyQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<KpTrendPoint>>, ApiError> {
    Ok(Json(state.history_service.kp_daily(query.days)?))
}

pub async fn storm_events(
    Query(query): Query<StormQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StormContext>>, ApiError> {
    Ok(Json(state.history_service.storm_context(query.kp)?))
}

pub async fn satellite_imagery(State(state): State<Arc<AppState>>) -> Json<Vec<SatelliteImage>> {
    Json(state.imagery.latest_images())
}

/// Forward a submitted reading to the Kp-index model
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<KpPrediction>, ApiError> {
    match state.forecast_service.predict(request).await {
        Ok(prediction) => Ok(Json(prediction)),
        Err(e) => {
            tracing::warn!("Kp-index prediction failed: {}", e);
            Err(e.into())
        }
    }
}
