// Domain layer - Core data types, no I/O
pub mod feed;
pub mod forecast;
pub mod imagery;
pub mod solar_wind;
pub mod storm;
pub mod time_series;
