// Application state for HTTP handlers
use crate::application::data_fetcher::DataFetcher;
use crate::application::forecast_service::ForecastService;
use crate::application::history_service::HistoryService;
use crate::application::imagery_catalogue::ImageryCatalogue;
use crate::application::polling_controller::FeedHandle;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub feed: FeedHandle,
    /// On-demand reads that bypass the polling window
    pub fetcher: DataFetcher,
    pub forecast_service: ForecastService,
    pub history_service: HistoryService,
    pub imagery: Arc<dyn ImageryCatalogue>,
}
