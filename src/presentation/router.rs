// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    forecast, health_check, kp_daily_history, kp_history, latest_solar_wind, live_snapshot,
    live_stream, satellite_imagery, solar_wind_history, storm_events,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/live", get(live_snapshot))
        .route("/live/stream", get(live_stream))
        .route("/solar-wind/latest", get(latest_solar_wind))
        .route("/history/kp", get(kp_history))
        .route("/history/kp/daily", get(kp_daily_history))
        .route("/history/solar-wind", get(solar_wind_history))
        .route("/history/events", get(storm_events))
        .route("/imagery", get(satellite_imagery))
        .route("/forecast", post(forecast))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
