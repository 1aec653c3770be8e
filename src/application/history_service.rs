// History service - Hourly and daily series for the trend charts, plus storm context
use crate::domain::forecast::KpTrendPoint;
use crate::domain::solar_wind::SolarWindParameterPoint;
use crate::domain::storm::{HistoricalSolarEvent, StormContext};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_HOURS: u32 = 24;
pub const MAX_HOURS: u32 = 168;
pub const DEFAULT_DAYS: u32 = 7;
pub const MAX_DAYS: u32 = 90;
pub const MAX_KP: f64 = 9.0;

pub trait HistoryRepository: Send + Sync {
    /// One point per hour, oldest first, ending at the current hour.
    fn kp_trend(&self, hours: u32) -> Vec<KpTrendPoint>;

    fn solar_wind_series(&self, hours: u32) -> Vec<SolarWindParameterPoint>;

    /// One point per day labelled `M/D`, oldest first, ending today.
    fn kp_daily(&self, days: u32) -> Vec<KpTrendPoint>;

    fn storm_events(&self) -> Vec<HistoricalSolarEvent>;
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidQuery {
    #[error("hours must be between 1 and {}, got {}", MAX_HOURS, .0)]
    Hours(u32),
    #[error("days must be between 1 and {}, got {}", MAX_DAYS, .0)]
    Days(u32),
    #[error("kp must be between 0 and {}, got {}", MAX_KP, .0)]
    Kp(f64),
}

#[derive(Clone)]
pub struct HistoryService {
    repository: Arc<dyn HistoryRepository>,
}

impl HistoryService {
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    pub fn kp_trend(&self, hours: Option<u32>) -> Result<Vec<KpTrendPoint>, InvalidQuery> {
        let hours = check_hours(hours)?;
        Ok(self.repository.kp_trend(hours))
    }

    pub fn solar_wind_series(
        &self,
        hours: Option<u32>,
    ) -> Result<Vec<SolarWindParameterPoint>, InvalidQuery> {
        let hours = check_hours(hours)?;
        Ok(self.repository.solar_wind_series(hours))
    }

    pub fn kp_daily(&self, days: Option<u32>) -> Result<Vec<KpTrendPoint>, InvalidQuery> {
        match days.unwrap_or(DEFAULT_DAYS) {
            d @ 1..=MAX_DAYS => Ok(self.repository.kp_daily(d)),
            d => Err(InvalidQuery::Days(d)),
        }
    }

    /// Past storms, each compared against `kp` when one is given.
    pub fn storm_context(&self, kp: Option<f64>) -> Result<Vec<StormContext>, InvalidQuery> {
        if let Some(kp) = kp {
            if !(0.0..=MAX_KP).contains(&kp) {
                return Err(InvalidQuery::Kp(kp));
            }
        }
        Ok(self
            .repository
            .storm_events()
            .into_iter()
            .map(|event| StormContext::new(event, kp))
            .collect())
    }
}

fn check_hours(hours: Option<u32>) -> Result<u32, InvalidQuery> {
    match hours.unwrap_or(DEFAULT_HOURS) {
        h @ 1..=MAX_HOURS => Ok(h),
        h => Err(InvalidQuery::Hours(h)),
    }
}
