// Application layer - Use cases and the seams to external collaborators
pub mod data_fetcher;
pub mod forecast_service;
pub mod history_service;
pub mod imagery_catalogue;
pub mod polling_controller;
pub mod solar_wind_source;
pub mod upstream;
