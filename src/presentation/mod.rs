// Presentation layer - HTTP surface over the live feed and forecasts
pub mod app_state;
pub mod handlers;
pub mod router;
