// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::application::data_fetcher::DataFetcher;
use crate::application::forecast_service::{ForecastService, KpForecaster};
use crate::application::history_service::HistoryService;
use crate::application::polling_controller::PollingController;
use crate::application::solar_wind_source::SolarWindSource;
use crate::infrastructure::config::{load_feed_config, FeedConfig, SourceKind};
use crate::infrastructure::http_source::{HttpKpForecaster, HttpSolarWindSource, UnconfiguredForecaster};
use crate::infrastructure::simulation::{SimulatedHistory, SimulatedImagery, SimulatedSolarWindSource};
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

fn build_source(cfg: &FeedConfig) -> anyhow::Result<Arc<dyn SolarWindSource>> {
    let timeout = Duration::from_millis(cfg.source.timeout_ms);
    let source: Arc<dyn SolarWindSource> = match (cfg.source.kind, cfg.source.url.clone()) {
        (SourceKind::Http, Some(url)) => {
            tracing::info!("Using HTTP solar wind source at {}", url);
            Arc::new(HttpSolarWindSource::new(url, timeout)?)
        }
        (SourceKind::Http, None) => anyhow::bail!("source.url is required for the http source"),
        (SourceKind::Simulated, _) => {
            tracing::info!("Using simulated solar wind source");
            Arc::new(SimulatedSolarWindSource::new(cfg.source.failure_rate))
        }
    };
    Ok(source)
}

fn build_forecaster(cfg: &FeedConfig) -> anyhow::Result<Arc<dyn KpForecaster>> {
    let forecaster: Arc<dyn KpForecaster> = match cfg.forecast.url.clone() {
        Some(url) => Arc::new(HttpKpForecaster::new(
            url,
            Duration::from_millis(cfg.forecast.timeout_ms),
        )?),
        None => {
            tracing::warn!("forecast.url not set; /forecast will report an error");
            Arc::new(UnconfiguredForecaster)
        }
    };
    Ok(forecaster)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let cfg = load_feed_config()?;

    // Live feed (application layer)
    let fetcher = DataFetcher::new(build_source(&cfg)?);
    let mut controller = PollingController::new(fetcher.clone(), cfg.polling.interval(), cfg.max_data_points()?);

    let state = Arc::new(AppState {
        feed: controller.handle(),
        fetcher,
        forecast_service: ForecastService::new(build_forecaster(&cfg)?),
        history_service: HistoryService::new(Arc::new(SimulatedHistory)),
        imagery: Arc::new(SimulatedImagery),
    });

    controller.start()?;

    let addr: SocketAddr = cfg.server.bind.parse()?;
    tracing::info!("Starting space weather feed service on {}", addr);

    let served = axum::serve(tokio::net::TcpListener::bind(addr).await?, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Stop polling on every exit path before surfacing a server error
    controller.stop().await;
    served?;

    Ok(())
}
